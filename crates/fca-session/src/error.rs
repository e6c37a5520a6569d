//! Session error types.
//!
//! Undo/redo on an empty history is reported through
//! [`SessionError::NothingToUndo`] / [`SessionError::NothingToRedo`] but is a
//! no-op: callers should disable the affordance rather than surface it.

use fca_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SessionError {
    /// Snapshot or restore met structurally illegal data.
    #[error("Invalid artifact state: {reason}")]
    InvalidArtifactState {
        /// What was illegal.
        reason: String,
    },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    /// Persistence requested while calculations are outstanding.
    #[error("Cannot save while {outstanding} calculation(s) are running")]
    UnsafeSaveAttempted {
        /// Number of started but unfinished calculations.
        outstanding: u64,
    },

    /// `commit_edit` without a captured "before" state.
    #[error("No edit in progress")]
    NoEditInProgress,

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Session options could not be read or written.
    #[error("Session options: {reason}")]
    Options {
        /// Description of what went wrong.
        reason: String,
    },

    /// A collaborator (file loader, writer) failed.
    #[error("{operation} failed: {reason}")]
    External {
        /// Name of the operation that failed.
        operation: String,
        /// Description of what went wrong.
        reason: String,
    },
}

impl SessionError {
    /// Undo/redo with an empty stack. State is unchanged.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }

    /// Errors the caller can retry once circumstances change.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsafeSaveAttempted { .. } | Self::External { .. } | Self::Options { .. }
        )
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnsafeSaveAttempted { .. } => {
                Some("Wait for running calculations to finish, or cancel them, then save again.")
            }
            Self::Options { .. } => Some("Options will be reset to defaults on next save."),
            Self::External { .. } => Some("Check that the file exists and is a valid context."),
            Self::InvalidArtifactState { .. } | Self::Model(_) => {
                Some("The edit was refused; the table is unchanged.")
            }
            Self::NothingToUndo | Self::NothingToRedo | Self::NoEditInProgress => None,
        }
    }

    pub fn invalid_state(err: impl std::fmt::Display) -> Self {
        Self::InvalidArtifactState {
            reason: err.to_string(),
        }
    }

    pub fn options(err: impl std::fmt::Display) -> Self {
        Self::Options {
            reason: err.to_string(),
        }
    }

    pub fn external(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::External {
            operation: operation.into(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_errors_are_noops() {
        assert!(SessionError::NothingToUndo.is_noop());
        assert!(SessionError::NothingToRedo.is_noop());
        assert!(!SessionError::NoEditInProgress.is_noop());
        assert!(SessionError::NothingToUndo.suggestion().is_none());
    }

    #[test]
    fn unsafe_save_is_recoverable() {
        let err = SessionError::UnsafeSaveAttempted { outstanding: 2 };
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Cannot save while 2 calculation(s) are running"
        );
    }

    #[test]
    fn external_wraps_collaborator_message() {
        let err = SessionError::external("Load context", "file is empty");
        assert_eq!(err.to_string(), "Load context failed: file is empty");
    }
}
