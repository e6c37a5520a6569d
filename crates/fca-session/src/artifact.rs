//! The live artifact: editable context plus cached derived results.

use std::sync::Arc;

use fca_model::{AssociationParams, AssociationRule, Concept, FormalContext, Implication, Lattice};

use crate::error::Result;
use crate::events::DirtySink;
use crate::snapshot::Snapshot;

/// Results derived from the considered part of the context.
///
/// Every entry is `None` until first requested. Structural changes to the
/// context clear all of them.
#[derive(Debug, Clone, Default)]
pub struct DerivedState {
    pub concepts: Option<Arc<Vec<Concept>>>,
    pub lattice: Option<Arc<Lattice>>,
    pub implications: Option<Arc<Vec<Implication>>>,
    pub associations: Option<Arc<Vec<AssociationRule>>>,
}

impl DerivedState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_none()
            && self.lattice.is_none()
            && self.implications.is_none()
            && self.associations.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    context: FormalContext,
    derived: DerivedState,
    params: AssociationParams,
    revision: u64,
    dirty: bool,
}

impl Default for Artifact {
    fn default() -> Self {
        Self::new(FormalContext::new())
    }
}

impl Artifact {
    pub fn new(context: FormalContext) -> Self {
        Self {
            context,
            derived: DerivedState::default(),
            params: AssociationParams::default(),
            revision: 0,
            dirty: false,
        }
    }

    pub fn context(&self) -> &FormalContext {
        &self.context
    }

    /// Mutable access to the context. Drops every derived result.
    pub fn context_mut(&mut self) -> &mut FormalContext {
        self.invalidate();
        &mut self.context
    }

    /// Installs a new context and returns the previous one.
    pub fn replace_context(&mut self, context: FormalContext) -> FormalContext {
        self.invalidate();
        std::mem::replace(&mut self.context, context)
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Snapshot::capture(&self.context)
    }

    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    pub(crate) fn derived_mut(&mut self) -> &mut DerivedState {
        &mut self.derived
    }

    /// Bumped on every invalidation. Results computed for an older revision
    /// are never installed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn invalidate(&mut self) {
        self.revision += 1;
        self.derived.clear();
    }

    pub fn association_params(&self) -> AssociationParams {
        self.params
    }

    /// Returns true if the thresholds changed (and cached rules were dropped).
    pub fn set_association_params(&mut self, params: AssociationParams) -> bool {
        if self.params == params {
            return false;
        }
        self.params = params;
        self.derived.associations = None;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl DirtySink for Artifact {
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
