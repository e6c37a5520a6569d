//! Formal concepts and the covering relation between them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A closed (extent, intent) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Concept {
    pub extent: BTreeSet<String>,
    pub intent: BTreeSet<String>,
}

impl Concept {
    pub fn new(extent: BTreeSet<String>, intent: BTreeSet<String>) -> Self {
        Self { extent, intent }
    }

    /// True if `self` is below or equal to `other` in the concept order.
    pub fn is_subconcept_of(&self, other: &Concept) -> bool {
        self.extent.is_subset(&other.extent)
    }
}

/// Concepts plus the covering pairs of their order.
///
/// Each cover is stored as `(lower, upper)` indices into [`Lattice::concepts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    concepts: Vec<Concept>,
    covers: Vec<(usize, usize)>,
}

impl Lattice {
    pub fn new(concepts: Vec<Concept>, covers: Vec<(usize, usize)>) -> Self {
        Self { concepts, covers }
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn covers(&self) -> &[(usize, usize)] {
        &self.covers
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Concept with the largest extent.
    pub fn top(&self) -> Option<usize> {
        (0..self.concepts.len()).max_by_key(|&i| self.concepts[i].extent.len())
    }

    /// Concept with the largest intent.
    pub fn bottom(&self) -> Option<usize> {
        (0..self.concepts.len()).max_by_key(|&i| self.concepts[i].intent.len())
    }

    pub fn upper_covers(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.covers
            .iter()
            .filter(move |(lower, _)| *lower == index)
            .map(|(_, upper)| *upper)
    }

    pub fn lower_covers(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.covers
            .iter()
            .filter(move |(_, upper)| *upper == index)
            .map(|(lower, _)| *lower)
    }
}
