//! Snapshot-based undo/redo.
//!
//! An edit is bracketed by [`History::begin_edit`] (captures "before") and
//! [`History::commit_edit`] (captures "after" and pushes a record). Only the
//! first edit needs an explicit begin: every commit, undo and redo leaves
//! the resulting state behind as the baseline for the next commit.
//!
//! Undo and redo run in two phases. `start_*` pops a record and switches to
//! [`ReplayMode::Replaying`]; the caller installs [`Replay::snapshot`] and
//! reports the outcome to [`History::finish`]. While replaying, begin and
//! commit are no-ops so that installing a snapshot is never itself recorded.

use tracing::debug;

use crate::artifact::Artifact;
use crate::error::{Result, SessionError};
use crate::snapshot::{Snapshot, SnapshotArena, SnapshotHandle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplayMode {
    #[default]
    Idle,
    Replaying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    before: SnapshotHandle,
    after: SnapshotHandle,
    label: String,
}

impl UndoRecord {
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Recorded,
    /// Commit arrived while a snapshot was being installed.
    SkippedDuringReplay,
}

/// An undo or redo waiting for its snapshot to be installed.
#[derive(Debug)]
#[must_use = "a replay must be passed back to History::finish"]
pub struct Replay {
    direction: Direction,
    record: UndoRecord,
    snapshot: Snapshot,
}

impl Replay {
    /// The state to install.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn label(&self) -> &str {
        &self.record.label
    }
}

#[derive(Debug, Default)]
pub struct History {
    arena: SnapshotArena,
    undo: Vec<UndoRecord>,
    redo: Vec<UndoRecord>,
    baseline: Option<SnapshotHandle>,
    mode: ReplayMode,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Label of the edit the next undo reverts.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo.last().map(UndoRecord::label)
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(UndoRecord::label)
    }

    /// Snapshots currently retained.
    pub fn retained(&self) -> usize {
        self.arena.len()
    }

    /// The state the next commit will use as "before".
    pub fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.and_then(|h| self.arena.get(h))
    }

    /// Captures the artifact as the "before" state of the next commit.
    pub fn begin_edit(&mut self, artifact: &Artifact) -> Result<()> {
        if self.mode == ReplayMode::Replaying {
            debug!("begin_edit ignored during replay");
            return Ok(());
        }
        let snapshot = artifact.snapshot()?;
        self.rebase(snapshot);
        Ok(())
    }

    /// Records the change from the baseline to the artifact's current state.
    ///
    /// Any redo records are discarded.
    pub fn commit_edit(
        &mut self,
        artifact: &Artifact,
        label: impl Into<String>,
    ) -> Result<CommitOutcome> {
        if self.mode == ReplayMode::Replaying {
            debug!("commit_edit ignored during replay");
            return Ok(CommitOutcome::SkippedDuringReplay);
        }
        if self.baseline.is_none() {
            return Err(SessionError::NoEditInProgress);
        }
        let after = artifact.snapshot()?;
        let before = self.baseline.take().ok_or(SessionError::NoEditInProgress)?;
        let record = UndoRecord {
            before,
            after: self.arena.insert(after.clone()),
            label: label.into(),
        };
        debug!(label = %record.label, depth = self.undo.len() + 1, "edit recorded");
        self.undo.push(record);
        self.discard_redo();
        self.baseline = Some(self.arena.insert(after));
        Ok(CommitOutcome::Recorded)
    }

    pub fn start_undo(&mut self) -> Result<Replay> {
        self.start(Direction::Undo)
    }

    pub fn start_redo(&mut self) -> Result<Replay> {
        self.start(Direction::Redo)
    }

    fn start(&mut self, direction: Direction) -> Result<Replay> {
        if self.mode == ReplayMode::Replaying {
            return Err(SessionError::invalid_state("replay already in progress"));
        }
        let record = self.stack_mut(direction).pop().ok_or(match direction {
            Direction::Undo => SessionError::NothingToUndo,
            Direction::Redo => SessionError::NothingToRedo,
        })?;
        let handle = match direction {
            Direction::Undo => record.before,
            Direction::Redo => record.after,
        };
        let Some(snapshot) = self.arena.get(handle).cloned() else {
            self.stack_mut(direction).push(record);
            return Err(SessionError::invalid_state("history snapshot was released"));
        };
        self.mode = ReplayMode::Replaying;
        Ok(Replay {
            direction,
            record,
            snapshot,
        })
    }

    /// Ends a replay. On success the record moves to the opposite stack and
    /// the installed state becomes the baseline; otherwise the record goes
    /// back where it came from.
    pub fn finish(&mut self, replay: Replay, installed: bool) {
        self.mode = ReplayMode::Idle;
        let Replay {
            direction,
            record,
            snapshot,
        } = replay;
        if !installed {
            self.stack_mut(direction).push(record);
            return;
        }
        debug!(label = %record.label, ?direction, "replayed");
        match direction {
            Direction::Undo => self.redo.push(record),
            Direction::Redo => self.undo.push(record),
        }
        self.rebase(snapshot);
    }

    /// Pops, installs and finishes an undo in one step.
    pub fn undo<F>(&mut self, install: F) -> Result<()>
    where
        F: FnOnce(&Snapshot) -> Result<()>,
    {
        let replay = self.start_undo()?;
        self.complete(replay, install)
    }

    pub fn redo<F>(&mut self, install: F) -> Result<()>
    where
        F: FnOnce(&Snapshot) -> Result<()>,
    {
        let replay = self.start_redo()?;
        self.complete(replay, install)
    }

    fn complete<F>(&mut self, replay: Replay, install: F) -> Result<()>
    where
        F: FnOnce(&Snapshot) -> Result<()>,
    {
        let result = install(replay.snapshot());
        self.finish(replay, result.is_ok());
        result
    }

    /// Makes `snapshot` the baseline without recording anything.
    pub fn rebase(&mut self, snapshot: Snapshot) {
        if let Some(old) = self.baseline.take() {
            self.arena.release(old);
        }
        self.baseline = Some(self.arena.insert(snapshot));
    }

    /// Forgets every record. The baseline is kept.
    pub fn clear(&mut self) {
        let baseline = self.baseline().cloned();
        self.undo.clear();
        self.redo.clear();
        self.arena.clear();
        self.baseline = baseline.map(|snapshot| self.arena.insert(snapshot));
    }

    fn stack_mut(&mut self, direction: Direction) -> &mut Vec<UndoRecord> {
        match direction {
            Direction::Undo => &mut self.undo,
            Direction::Redo => &mut self.redo,
        }
    }

    fn discard_redo(&mut self) {
        for record in std::mem::take(&mut self.redo) {
            self.arena.release(record.before);
            self.arena.release(record.after);
        }
    }
}

#[cfg(test)]
mod tests {
    use fca_model::{FullObject, example_context};

    use super::*;

    fn artifact() -> Artifact {
        Artifact::new(example_context())
    }

    #[test]
    fn commit_without_baseline_is_refused() {
        let mut history = History::new();
        let err = history.commit_edit(&artifact(), "edit").unwrap_err();
        assert_eq!(err, SessionError::NoEditInProgress);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut artifact = artifact();
        let original = artifact.snapshot().unwrap();
        let mut history = History::new();
        history.begin_edit(&artifact).unwrap();
        artifact
            .context_mut()
            .add_object(FullObject::new("child", ["juvenile"]))
            .unwrap();
        history.commit_edit(&artifact, "add child").unwrap();
        let edited = artifact.snapshot().unwrap();

        let mut installed = None;
        history
            .undo(|s| {
                installed = Some(s.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(installed.as_ref(), Some(&original));
        assert_eq!(history.redo_label(), Some("add child"));

        history
            .redo(|s| {
                installed = Some(s.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(installed.as_ref(), Some(&edited));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn commits_during_replay_are_skipped() {
        let mut artifact = artifact();
        let mut history = History::new();
        history.begin_edit(&artifact).unwrap();
        artifact.context_mut().add_attribute("tall").unwrap();
        history.commit_edit(&artifact, "add tall").unwrap();

        let replay = history.start_undo().unwrap();
        assert_eq!(history.mode(), ReplayMode::Replaying);
        assert_eq!(
            history.commit_edit(&artifact, "sneaky").unwrap(),
            CommitOutcome::SkippedDuringReplay
        );
        history.finish(replay, true);
        assert_eq!(history.mode(), ReplayMode::Idle);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn failed_install_keeps_record() {
        let mut artifact = artifact();
        let mut history = History::new();
        history.begin_edit(&artifact).unwrap();
        artifact.context_mut().add_attribute("tall").unwrap();
        history.commit_edit(&artifact, "add tall").unwrap();

        let err = history
            .undo(|_| Err(SessionError::invalid_state("refused")))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidArtifactState { .. }));
        assert_eq!(history.undo_label(), Some("add tall"));
        assert!(!history.can_redo());
        assert_eq!(history.mode(), ReplayMode::Idle);
    }

    #[test]
    fn new_commit_discards_redo_and_releases_snapshots() {
        let mut artifact = artifact();
        let mut history = History::new();
        history.begin_edit(&artifact).unwrap();
        for name in ["a", "b"] {
            artifact.context_mut().add_attribute(name).unwrap();
            history.commit_edit(&artifact, name).unwrap();
        }
        history.undo(|_| Ok(())).unwrap();
        assert_eq!(history.redo_len(), 1);

        artifact.context_mut().add_attribute("c").unwrap();
        history.commit_edit(&artifact, "c").unwrap();
        assert_eq!(history.redo_len(), 0);
        // Two records of two snapshots each plus the baseline.
        assert_eq!(history.retained(), 5);
    }

    #[test]
    fn empty_stacks_report_noops() {
        let mut history = History::new();
        assert!(history.undo(|_| Ok(())).unwrap_err().is_noop());
        assert!(history.redo(|_| Ok(())).unwrap_err().is_noop());
    }
}
