//! CLI library components for the FCA workbench.

pub mod io;
pub mod logging;
pub mod render;
pub mod steps;
