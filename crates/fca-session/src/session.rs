//! The session coordinator.
//!
//! [`Session`] owns the artifact, the undo history, the event bus and the
//! calculation tracker, and is the only place where they change together.
//! Every operation either completes fully or leaves all of them untouched:
//! validation happens first, events are published last.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use fca_core::{ConceptMiner, NextClosureMiner};
use fca_model::{
    AssociationParams, AssociationRule, Concept, FormalContext, Implication, Lattice, ModelError,
};
use tracing::{debug, info, warn};

use crate::affordances::{Affordances, NoAffordances};
use crate::artifact::Artifact;
use crate::calculation::{CalculationCounters, CalculationStatus, CalculationTracker, Phase};
use crate::edit::Edit;
use crate::error::{Result, SessionError};
use crate::events::{DirtySink, EventBus, Listener, SessionEvent, SubscriberId};
use crate::history::{CommitOutcome, History, Replay};
use crate::options::RecentFiles;
use crate::snapshot::Snapshot;
use crate::worker::{CalculationInput, DerivedResult, DerivedValue, WorkerLink, WorkerMessage};

/// File name given to documents that were never saved.
pub const UNTITLED: &str = "untitled.json";

/// Object or attribute whose considered-marking is being changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'a> {
    Object(&'a str),
    Attribute(&'a str),
}

pub struct Session {
    artifact: Artifact,
    history: History,
    bus: EventBus,
    tracker: CalculationTracker,
    affordances: Box<dyn Affordances>,
    miner: Arc<dyn ConceptMiner>,
    file_path: PathBuf,
    recent: RecentFiles,
    cancel_epoch: Arc<AtomicU64>,
    sender: Sender<WorkerMessage>,
    receiver: Receiver<WorkerMessage>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("artifact", &self.artifact)
            .field("history", &self.history)
            .field("bus", &self.bus)
            .field("counters", &self.tracker.counters())
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks the artifact dirty and enables saving.
struct DirtyMarker<'a> {
    artifact: &'a mut Artifact,
    affordances: &'a mut dyn Affordances,
}

impl DirtySink for DirtyMarker<'_> {
    fn mark_dirty(&mut self) {
        self.artifact.mark_dirty();
        self.affordances.set_save_enabled(true);
    }
}

impl Session {
    /// Session over the empty context.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        let mut history = History::new();
        history.rebase(Snapshot::empty());
        Self {
            artifact: Artifact::default(),
            history,
            bus: EventBus::new(),
            tracker: CalculationTracker::new(),
            affordances: Box::new(NoAffordances),
            miner: Arc::new(NextClosureMiner),
            file_path: PathBuf::from(UNTITLED),
            recent: RecentFiles::default(),
            cancel_epoch: Arc::new(AtomicU64::new(0)),
            sender,
            receiver,
        }
    }

    /// Session over `context`. Nothing is published.
    pub fn with_context(context: FormalContext) -> Result<Self> {
        let snapshot = Snapshot::capture(&context)?;
        let mut session = Self::new();
        session.artifact = Artifact::new(snapshot.restore()?);
        session.history.rebase(snapshot);
        Ok(session)
    }

    #[must_use]
    pub fn with_miner(mut self, miner: impl ConceptMiner + 'static) -> Self {
        self.miner = Arc::new(miner);
        self
    }

    #[must_use]
    pub fn with_affordances(mut self, affordances: impl Affordances + 'static) -> Self {
        self.affordances = Box::new(affordances);
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    #[must_use]
    pub fn with_recent_files(mut self, recent: RecentFiles) -> Self {
        self.recent = recent;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn context(&self) -> &FormalContext {
        self.artifact.context()
    }

    /// In-place access for edits. Clears derived results; follow up with
    /// [`Session::context_changed`] or [`Session::commit_edit`].
    pub fn context_mut(&mut self) -> &mut FormalContext {
        self.artifact.context_mut()
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.artifact.is_dirty()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn recent_files(&self) -> &RecentFiles {
        &self.recent
    }

    pub fn association_params(&self) -> AssociationParams {
        self.artifact.association_params()
    }

    pub fn miner(&self) -> Arc<dyn ConceptMiner> {
        Arc::clone(&self.miner)
    }

    pub fn counters(&self) -> CalculationCounters {
        self.tracker.counters()
    }

    // ========================================================================
    // Event bus
    // ========================================================================

    pub fn subscribe(
        &mut self,
        label: impl Into<String>,
        listener: impl Listener + 'static,
    ) -> SubscriberId {
        self.bus.subscribe(label, listener)
    }

    pub fn subscribe_with<C: Send + 'static>(
        &mut self,
        label: impl Into<String>,
        context: C,
        notify: fn(&mut C, &SessionEvent),
    ) -> SubscriberId {
        self.bus.subscribe_with(label, context, notify)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Publishes `event` to every subscriber, marking the artifact dirty
    /// where the event kind calls for it.
    pub fn publish(&mut self, event: SessionEvent) -> usize {
        let mut marker = DirtyMarker {
            artifact: &mut self.artifact,
            affordances: self.affordances.as_mut(),
        };
        self.bus.publish(event, &mut marker)
    }

    // ========================================================================
    // Artifact lifecycle
    // ========================================================================

    /// Replaces the whole context. Markings are dropped; history is kept and
    /// the new context becomes the baseline of the next commit.
    pub fn new_context(&mut self, context: FormalContext) -> Result<()> {
        let snapshot = Snapshot::capture(&context)?;
        let context = snapshot.restore()?;
        self.install_context(context, snapshot.clone());
        self.history.rebase(snapshot);
        Ok(())
    }

    /// Announces an in-place edit.
    pub fn context_changed(&mut self) -> Result<()> {
        let mut context = self.artifact.context().clone();
        context.clear_considered();
        let snapshot = Snapshot::capture(&context)?;
        self.artifact.replace_context(context);
        self.publish(SessionEvent::ContextChanged { context: snapshot });
        Ok(())
    }

    /// Announces that the live context was read from `path`.
    pub fn loaded_file(&mut self, path: impl Into<PathBuf>) {
        self.cancel_calculations();
        self.switch_path(path.into());
        let path = self.file_path.clone();
        self.publish(SessionEvent::PathChanged { path: path.clone() });
        self.mark_clean();
        info!(path = %path.display(), "file loaded");
        self.publish(SessionEvent::FileLoaded { path });
    }

    pub fn attribute_renamed(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.publish(SessionEvent::AttributeRenamed {
            old: old.into(),
            new: new.into(),
        });
    }

    pub fn labels_changed(&mut self) {
        self.publish(SessionEvent::LabelsChanged);
    }

    pub fn temporary_context_changed(&mut self) {
        self.publish(SessionEvent::TemporaryContextChanged);
    }

    /// Loads a document: history is cleared, `context` installed and the
    /// session marked as reading from `path`.
    pub fn open_document(&mut self, context: FormalContext, path: impl Into<PathBuf>) -> Result<()> {
        self.new_context(context)?;
        self.history.clear();
        self.refresh_history_affordances();
        self.loaded_file(path);
        Ok(())
    }

    /// Starts an empty `rows` × `columns` document next to the current file.
    pub fn new_document(&mut self, rows: usize, columns: usize) -> Result<()> {
        self.new_context(FormalContext::with_size(rows, columns))?;
        self.history.clear();
        self.refresh_history_affordances();
        let untitled = match self.file_path.parent() {
            Some(dir) => dir.join(UNTITLED),
            None => PathBuf::from(UNTITLED),
        };
        self.open_file(untitled);
        Ok(())
    }

    /// Points the session at `path`, maintaining the recent-files list.
    pub fn open_file(&mut self, path: impl Into<PathBuf>) {
        if self.switch_path(path.into()) {
            let path = self.file_path.clone();
            self.publish(SessionEvent::PathChanged { path });
        }
    }

    fn switch_path(&mut self, path: PathBuf) -> bool {
        if path == self.file_path {
            return false;
        }
        let current_exists = self.file_path.is_file();
        self.recent.switch(&self.file_path, current_exists, &path);
        debug!(from = %self.file_path.display(), to = %path.display(), "path switched");
        self.file_path = path;
        true
    }

    /// Changes the considered-marking of one object or attribute.
    pub fn set_considered(&mut self, element: Element<'_>, considered: bool) -> Result<()> {
        let context = self.artifact.context();
        match element {
            Element::Object(name) if !context.has_object(name) => {
                return Err(ModelError::UnknownObject(name.to_string()).into());
            }
            Element::Attribute(name) if !context.has_attribute(name) => {
                return Err(ModelError::UnknownAttribute(name.to_string()).into());
            }
            _ => {}
        }
        let context = self.artifact.context_mut();
        match element {
            Element::Object(name) => context.set_object_considered(name, considered)?,
            Element::Attribute(name) => context.set_attribute_considered(name, considered)?,
        }
        self.temporary_context_changed();
        Ok(())
    }

    fn install_context(&mut self, context: FormalContext, snapshot: Snapshot) {
        self.cancel_calculations();
        self.artifact.replace_context(context);
        info!(
            objects = snapshot.object_count(),
            attributes = snapshot.attribute_count(),
            "context installed"
        );
        self.publish(SessionEvent::NewContext { context: snapshot });
    }

    fn cancel_calculations(&mut self) {
        self.cancel_epoch.fetch_add(1, Ordering::AcqRel);
        self.publish(SessionEvent::CalculationsCancelled);
    }

    fn mark_clean(&mut self) {
        self.artifact.mark_clean();
        self.affordances.set_save_enabled(false);
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    pub fn begin_edit(&mut self) -> Result<()> {
        self.history.begin_edit(&self.artifact)
    }

    /// Records the edit since the last baseline and publishes
    /// context-changed.
    pub fn commit_edit(&mut self, label: impl Into<String>) -> Result<CommitOutcome> {
        let outcome = self.history.commit_edit(&self.artifact, label)?;
        if outcome == CommitOutcome::Recorded {
            if let Some(snapshot) = self.history.baseline().cloned() {
                self.publish(SessionEvent::ContextChanged { context: snapshot });
            }
            self.refresh_history_affordances();
        }
        Ok(outcome)
    }

    /// Applies one structural edit as an undoable step.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<CommitOutcome> {
        let mut next = self.artifact.context().clone();
        edit.apply(&mut next)?;
        self.begin_edit()?;
        let previous = self.artifact.replace_context(next);
        let outcome = match self.commit_edit(edit.label()) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.artifact.replace_context(previous);
                return Err(err);
            }
        };
        if let Edit::RenameAttribute { old, new } = edit
            && old != new
        {
            self.attribute_renamed(old.as_str(), new.as_str());
        }
        Ok(outcome)
    }

    pub fn undo(&mut self) -> Result<()> {
        let replay = self.history.start_undo()?;
        self.replay(replay)
    }

    pub fn redo(&mut self) -> Result<()> {
        let replay = self.history.start_redo()?;
        self.replay(replay)
    }

    fn replay(&mut self, replay: Replay) -> Result<()> {
        let snapshot = replay.snapshot().clone();
        let restored = snapshot.restore();
        self.history.finish(replay, restored.is_ok());
        let context = restored?;
        self.install_context(context, snapshot);
        self.refresh_history_affordances();
        Ok(())
    }

    fn refresh_history_affordances(&mut self) {
        self.affordances.set_undo_enabled(self.history.can_undo());
        self.affordances.set_redo_enabled(self.history.can_redo());
    }

    // ========================================================================
    // Calculations and the save gate
    // ========================================================================

    pub fn start_calculation(&mut self, status: CalculationStatus) {
        self.record_status(status, Phase::Start);
    }

    pub fn stop_calculation(&mut self, status: CalculationStatus) {
        self.record_status(status, Phase::Stop);
    }

    fn record_status(&mut self, status: CalculationStatus, phase: Phase) {
        if self.tracker.record(status, phase).is_some() {
            self.publish(SessionEvent::StatusChanged { status, phase });
        }
    }

    pub fn can_be_saved(&self) -> bool {
        self.tracker.can_be_saved()
    }

    pub fn ensure_can_save(&self) -> Result<()> {
        let counters = self.tracker.counters();
        if counters.can_be_saved() {
            Ok(())
        } else {
            Err(SessionError::UnsafeSaveAttempted {
                outstanding: counters.outstanding(),
            })
        }
    }

    /// Writes the context through `write` once no calculation is running.
    ///
    /// The write is bracketed as [`CalculationStatus::SavingFile`]; the
    /// artifact is marked clean only if it succeeds. A failed write leaves
    /// the dirty flag as it was.
    pub fn persist<T, F>(&mut self, write: F) -> Result<T>
    where
        F: FnOnce(&FormalContext, &Path) -> Result<T>,
    {
        self.ensure_can_save()?;
        let was_dirty = self.artifact.is_dirty();
        self.start_calculation(CalculationStatus::SavingFile);
        let result = write(self.artifact.context(), &self.file_path);
        self.stop_calculation(CalculationStatus::SavingFile);
        match &result {
            Ok(_) => {
                self.mark_clean();
                info!(path = %self.file_path.display(), "context saved");
            }
            Err(err) => {
                if !was_dirty {
                    self.mark_clean();
                }
                warn!(path = %self.file_path.display(), %err, "save failed");
            }
        }
        result
    }

    // ========================================================================
    // Derived results
    // ========================================================================

    pub fn concepts(&mut self) -> Arc<Vec<Concept>> {
        if let Some(concepts) = &self.artifact.derived().concepts {
            return Arc::clone(concepts);
        }
        let concepts = Arc::new(self.compute(CalculationStatus::ComputingConcepts, |miner, context| {
            miner.concepts(context)
        }));
        self.artifact.derived_mut().concepts = Some(Arc::clone(&concepts));
        concepts
    }

    pub fn concept_count(&mut self) -> usize {
        self.concepts().len()
    }

    pub fn lattice(&mut self) -> Arc<Lattice> {
        if let Some(lattice) = &self.artifact.derived().lattice {
            return Arc::clone(lattice);
        }
        let concepts = self.concepts();
        let lattice = Arc::new(self.compute(CalculationStatus::ComputingLattice, |miner, _| {
            miner.lattice(&concepts)
        }));
        self.artifact.derived_mut().lattice = Some(Arc::clone(&lattice));
        lattice
    }

    pub fn implications(&mut self) -> Arc<Vec<Implication>> {
        if let Some(implications) = &self.artifact.derived().implications {
            return Arc::clone(implications);
        }
        let implications = Arc::new(self.compute(
            CalculationStatus::ComputingImplications,
            |miner, context| miner.implications(context),
        ));
        self.artifact.derived_mut().implications = Some(Arc::clone(&implications));
        implications
    }

    pub fn associations(&mut self) -> Arc<Vec<AssociationRule>> {
        if let Some(rules) = &self.artifact.derived().associations {
            return Arc::clone(rules);
        }
        let lattice = self.lattice();
        let params = self.artifact.association_params();
        let rules = Arc::new(self.compute(
            CalculationStatus::ComputingAssociations,
            |miner, context| miner.associations(context, &lattice, params),
        ));
        self.artifact.derived_mut().associations = Some(Arc::clone(&rules));
        rules
    }

    /// Validates both thresholds in `[0, 1]`; only cached rules are dropped.
    pub fn set_association_thresholds(
        &mut self,
        min_support: f64,
        min_confidence: f64,
    ) -> Result<()> {
        let params = AssociationParams::new(min_support, min_confidence)?;
        if self.artifact.set_association_params(params) {
            debug!(min_support, min_confidence, "association thresholds changed");
        }
        Ok(())
    }

    fn compute<T>(
        &mut self,
        status: CalculationStatus,
        derive: impl FnOnce(&dyn ConceptMiner, &FormalContext) -> T,
    ) -> T {
        self.start_calculation(status);
        let value = derive(self.miner.as_ref(), self.artifact.context());
        self.stop_calculation(status);
        value
    }

    // ========================================================================
    // Background workers
    // ========================================================================

    pub fn worker_link(&self) -> WorkerLink {
        WorkerLink::new(
            self.tracker.clone(),
            self.sender.clone(),
            Arc::clone(&self.cancel_epoch),
        )
    }

    /// Copy of what a worker needs to derive results off-thread.
    pub fn calculation_input(&self) -> CalculationInput {
        CalculationInput {
            revision: self.artifact.revision(),
            context: Arc::new(self.artifact.context().clone()),
            params: self.artifact.association_params(),
        }
    }

    /// Publishes queued worker messages in arrival order. Returns how many
    /// were handled.
    pub fn drain_worker_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                WorkerMessage::Status { status, phase } => {
                    self.publish(SessionEvent::StatusChanged { status, phase });
                }
                WorkerMessage::Event(event) => {
                    self.publish(event);
                }
                WorkerMessage::Computed(result) => self.accept_result(result),
            }
            handled += 1;
        }
        handled
    }

    fn accept_result(&mut self, result: DerivedResult) {
        if result.revision != self.artifact.revision() {
            debug!(
                revision = result.revision,
                current = self.artifact.revision(),
                "stale worker result dropped"
            );
            return;
        }
        let current_params = self.artifact.association_params();
        let derived = self.artifact.derived_mut();
        match result.value {
            DerivedValue::Concepts(concepts) => derived.concepts = Some(Arc::new(concepts)),
            DerivedValue::Lattice(lattice) => {
                if derived.concepts.is_none() {
                    derived.concepts = Some(Arc::new(lattice.concepts().to_vec()));
                }
                derived.lattice = Some(Arc::new(lattice));
            }
            DerivedValue::Implications(implications) => {
                derived.implications = Some(Arc::new(implications));
            }
            DerivedValue::Associations { params, rules } if params == current_params => {
                derived.associations = Some(Arc::new(rules));
            }
            DerivedValue::Associations { .. } => {
                debug!("association rules for old thresholds dropped");
            }
        }
    }
}
