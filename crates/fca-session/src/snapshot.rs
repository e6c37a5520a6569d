//! Immutable context snapshots and the arena that owns them.
//!
//! A [`Snapshot`] is a structural copy of a context's incidence relation
//! (markings are not part of it). Capture and restore both re-insert every
//! attribute and object through the validated model API, so a snapshot
//! can only ever hold a well-formed context.
//!
//! History records refer to snapshots through [`SnapshotHandle`]s into a
//! [`SnapshotArena`]. Handles carry a generation, so a handle to a released
//! slot never resolves to whatever snapshot reused it.

use std::sync::Arc;

use fca_model::FormalContext;

use crate::error::{Result, SessionError};

#[derive(Debug, Clone)]
pub struct Snapshot {
    context: Arc<FormalContext>,
}

impl Snapshot {
    /// Snapshot of the empty context.
    pub fn empty() -> Self {
        Self {
            context: Arc::new(FormalContext::new()),
        }
    }

    pub fn capture(context: &FormalContext) -> Result<Self> {
        Ok(Self {
            context: Arc::new(rebuild(context)?),
        })
    }

    /// Fresh live context equal to the captured one, without markings.
    pub fn restore(&self) -> Result<FormalContext> {
        rebuild(&self.context)
    }

    /// Read access for views and event payloads.
    pub fn context(&self) -> &FormalContext {
        &self.context
    }

    pub fn object_count(&self) -> usize {
        self.context.object_count()
    }

    pub fn attribute_count(&self) -> usize {
        self.context.attribute_count()
    }

    /// Both handles point at the same captured data.
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.context, &other.context)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.context.same_incidence(&other.context)
    }
}

fn rebuild(source: &FormalContext) -> Result<FormalContext> {
    let mut copy = FormalContext::new();
    copy.add_attributes(source.attributes().iter().cloned())
        .map_err(SessionError::invalid_state)?;
    copy.add_objects(source.objects().iter().cloned())
        .map_err(SessionError::invalid_state)?;
    Ok(copy)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotHandle {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    snapshot: Option<Snapshot>,
}

/// Generation-checked storage for history snapshots.
#[derive(Debug, Default)]
pub struct SnapshotArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl SnapshotArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: Snapshot) -> SnapshotHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.snapshot = Some(snapshot);
            return SnapshotHandle {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            snapshot: Some(snapshot),
        });
        SnapshotHandle {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    pub fn get(&self, handle: SnapshotHandle) -> Option<&Snapshot> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.snapshot.as_ref())
    }

    /// Frees the slot; stale handles stop resolving.
    pub fn release(&mut self, handle: SnapshotHandle) -> Option<Snapshot> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let snapshot = slot.snapshot.take()?;
        slot.generation += 1;
        self.free.push(handle.index);
        self.live -= 1;
        Some(snapshot)
    }

    /// Number of live snapshots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}
