//! Calculation accounting for the save gate.
//!
//! Every calculation kind shares one pair of counters: the artifact may be
//! saved only while no started calculation is still missing its stop. The
//! gate does not know which kind is outstanding.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

/// Kind of long-running work reported to the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationStatus {
    LoadingFile,
    SavingFile,
    ComputingAssociations,
    ComputingImplications,
    ComputingConcepts,
    ComputingLattice,
}

impl CalculationStatus {
    pub const ALL: [Self; 6] = [
        Self::LoadingFile,
        Self::SavingFile,
        Self::ComputingAssociations,
        Self::ComputingImplications,
        Self::ComputingConcepts,
        Self::ComputingLattice,
    ];

    /// Status-bar text.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LoadingFile => "Loading the context",
            Self::SavingFile => "Saving the context",
            Self::ComputingAssociations => "Calculating the associations",
            Self::ComputingImplications => "Calculating the implications",
            Self::ComputingConcepts => "Calculating the concepts",
            Self::ComputingLattice => "Calculating the lattice",
        }
    }

    pub const fn key(&self) -> &'static str {
        match self {
            Self::LoadingFile => "loading-file",
            Self::SavingFile => "saving-file",
            Self::ComputingAssociations => "computing-associations",
            Self::ComputingImplications => "computing-implications",
            Self::ComputingConcepts => "computing-concepts",
            Self::ComputingLattice => "computing-lattice",
        }
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction tag of a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Stop,
}

/// Point-in-time reading of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalculationCounters {
    pub starts: u64,
    pub stops: u64,
}

impl CalculationCounters {
    pub fn outstanding(&self) -> u64 {
        self.starts.saturating_sub(self.stops)
    }

    pub fn can_be_saved(&self) -> bool {
        self.starts <= self.stops
    }
}

/// Shared start/stop counter pair.
///
/// Clones share the same counters, so worker threads and the coordinator
/// observe one consistent pair.
#[derive(Debug, Clone, Default)]
pub struct CalculationTracker {
    counters: Arc<Mutex<CalculationCounters>>,
}

impl CalculationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one start or stop and returns the counters after the update.
    ///
    /// A stop without an outstanding start is refused (`None`) so that
    /// `stops <= starts` holds and a stray stop cannot hide a later start.
    pub fn record(&self, status: CalculationStatus, phase: Phase) -> Option<CalculationCounters> {
        let mut counters = self.lock();
        match phase {
            Phase::Start => counters.starts += 1,
            Phase::Stop if counters.stops < counters.starts => counters.stops += 1,
            Phase::Stop => {
                warn!(status = status.key(), "stop without matching start ignored");
                return None;
            }
        }
        Some(*counters)
    }

    pub fn counters(&self) -> CalculationCounters {
        *self.lock()
    }

    pub fn can_be_saved(&self) -> bool {
        self.lock().can_be_saved()
    }

    pub fn outstanding(&self) -> u64 {
        self.lock().outstanding()
    }

    fn lock(&self) -> MutexGuard<'_, CalculationCounters> {
        // The counters stay consistent even if a holder panicked.
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
