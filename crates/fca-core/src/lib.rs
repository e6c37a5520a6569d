//! Concept lattice, implication base and association rules for formal
//! contexts.

mod closure;
pub mod lattice;
pub mod miner;
mod table;

pub use lattice::{association_basis, build_lattice, covering_relation};
pub use miner::{ConceptMiner, NextClosureMiner};
