//! Hand-off between background calculations and the coordinator.
//!
//! A [`WorkerLink`] updates the shared calculation counters immediately (so
//! the save gate is never late) and queues the matching status events. The
//! coordinator publishes queued messages, in order, when it drains them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Sender;
use fca_model::{AssociationParams, AssociationRule, Concept, FormalContext, Implication, Lattice};
use tracing::debug;

use crate::calculation::{CalculationStatus, CalculationTracker, Phase};
use crate::events::SessionEvent;

/// Everything a background calculation needs, tagged with the artifact
/// revision it was taken from.
#[derive(Debug, Clone)]
pub struct CalculationInput {
    pub revision: u64,
    pub context: Arc<FormalContext>,
    pub params: AssociationParams,
}

#[derive(Debug, Clone)]
pub enum DerivedValue {
    Concepts(Vec<Concept>),
    Lattice(Lattice),
    Implications(Vec<Implication>),
    Associations {
        params: AssociationParams,
        rules: Vec<AssociationRule>,
    },
}

/// A finished background result. Installed only if `revision` is still the
/// artifact's current one.
#[derive(Debug, Clone)]
pub struct DerivedResult {
    pub revision: u64,
    pub value: DerivedValue,
}

#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Status {
        status: CalculationStatus,
        phase: Phase,
    },
    Event(SessionEvent),
    Computed(DerivedResult),
}

/// Observes cancellation of the calculations running when it was issued.
#[derive(Debug, Clone)]
pub struct CancelToken {
    epoch: Arc<AtomicU64>,
    issued: u64,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.epoch.load(Ordering::Acquire) != self.issued
    }
}

#[derive(Debug, Clone)]
pub struct WorkerLink {
    tracker: CalculationTracker,
    sender: Sender<WorkerMessage>,
    epoch: Arc<AtomicU64>,
}

impl WorkerLink {
    pub(crate) fn new(
        tracker: CalculationTracker,
        sender: Sender<WorkerMessage>,
        epoch: Arc<AtomicU64>,
    ) -> Self {
        Self {
            tracker,
            sender,
            epoch,
        }
    }

    pub fn start(&self, status: CalculationStatus) {
        self.status(status, Phase::Start);
    }

    pub fn stop(&self, status: CalculationStatus) {
        self.status(status, Phase::Stop);
    }

    /// Starts `status` and returns a guard that stops it when dropped.
    pub fn begin(&self, status: CalculationStatus) -> CalculationGuard {
        self.start(status);
        CalculationGuard {
            link: self.clone(),
            status,
        }
    }

    pub fn send_event(&self, event: SessionEvent) {
        self.send(WorkerMessage::Event(event));
    }

    pub fn deliver(&self, result: DerivedResult) {
        self.send(WorkerMessage::Computed(result));
    }

    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            epoch: Arc::clone(&self.epoch),
            issued: self.epoch.load(Ordering::Acquire),
        }
    }

    fn status(&self, status: CalculationStatus, phase: Phase) {
        if self.tracker.record(status, phase).is_some() {
            self.send(WorkerMessage::Status { status, phase });
        }
    }

    fn send(&self, message: WorkerMessage) {
        if self.sender.send(message).is_err() {
            debug!("session gone, worker message dropped");
        }
    }
}

/// Stops its calculation on drop, whether the work succeeded or not.
#[derive(Debug)]
#[must_use = "dropping the guard stops the calculation immediately"]
pub struct CalculationGuard {
    link: WorkerLink,
    status: CalculationStatus,
}

impl CalculationGuard {
    pub fn status(&self) -> CalculationStatus {
        self.status
    }
}

impl Drop for CalculationGuard {
    fn drop(&mut self) {
        self.link.stop(self.status);
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::unbounded;

    use super::*;

    fn link() -> (WorkerLink, crossbeam_channel::Receiver<WorkerMessage>) {
        let (sender, receiver) = unbounded();
        let link = WorkerLink::new(
            CalculationTracker::new(),
            sender,
            Arc::new(AtomicU64::new(0)),
        );
        (link, receiver)
    }

    #[test]
    fn guard_stops_on_drop() {
        let (link, receiver) = link();
        {
            let _guard = link.begin(CalculationStatus::ComputingLattice);
            assert!(!link.tracker.can_be_saved());
        }
        assert!(link.tracker.can_be_saved());
        let phases: Vec<_> = receiver
            .try_iter()
            .map(|m| match m {
                WorkerMessage::Status { phase, .. } => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases, [Some(Phase::Start), Some(Phase::Stop)]);
    }

    #[test]
    fn token_sees_epoch_bump() {
        let (link, _receiver) = link();
        let token = link.cancel_token();
        assert!(!token.is_cancelled());
        link.epoch.fetch_add(1, Ordering::AcqRel);
        assert!(token.is_cancelled());
        assert!(!link.cancel_token().is_cancelled());
    }

    #[test]
    fn closed_queue_still_counts() {
        let (link, receiver) = link();
        drop(receiver);
        link.start(CalculationStatus::ComputingConcepts);
        assert_eq!(link.tracker.outstanding(), 1);
    }
}
