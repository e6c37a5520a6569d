//! Session state for the FCA workbench.
//!
//! A [`Session`] coordinates the editable context, its derived results,
//! snapshot-based undo/redo, the calculation save gate and the event bus
//! that keeps views in step.

pub mod affordances;
pub mod artifact;
pub mod calculation;
pub mod edit;
pub mod error;
pub mod events;
pub mod history;
pub mod options;
pub mod session;
pub mod snapshot;
pub mod startup;
pub mod worker;

pub use affordances::{AffordanceState, Affordances, NoAffordances};
pub use artifact::{Artifact, DerivedState};
pub use calculation::{CalculationCounters, CalculationStatus, CalculationTracker, Phase};
pub use edit::Edit;
pub use error::{Result, SessionError};
pub use events::{DirtySink, EventBus, EventKind, Listener, SessionEvent, SubscriberId};
pub use history::{CommitOutcome, Direction, History, Replay, ReplayMode};
pub use options::{RecentFiles, SessionOptions, WindowGeometry};
pub use session::{Element, Session, UNTITLED};
pub use snapshot::{Snapshot, SnapshotArena, SnapshotHandle};
pub use startup::{ContextSource, Startup, StartupOrigin, start_session};
pub use worker::{
    CalculationGuard, CalculationInput, CancelToken, DerivedResult, DerivedValue, WorkerLink,
    WorkerMessage,
};
