//! Enable/disable hooks for the host's save, undo and redo controls.

/// Receives affordance updates from the session.
pub trait Affordances: Send {
    fn set_save_enabled(&mut self, enabled: bool);

    fn set_undo_enabled(&mut self, _enabled: bool) {}

    fn set_redo_enabled(&mut self, _enabled: bool) {}
}

/// Host without controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAffordances;

impl Affordances for NoAffordances {
    fn set_save_enabled(&mut self, _enabled: bool) {}
}

/// Last reported state of each control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AffordanceState {
    pub save: bool,
    pub undo: bool,
    pub redo: bool,
}

impl Affordances for AffordanceState {
    fn set_save_enabled(&mut self, enabled: bool) {
        self.save = enabled;
    }

    fn set_undo_enabled(&mut self, enabled: bool) {
        self.undo = enabled;
    }

    fn set_redo_enabled(&mut self, enabled: bool) {
        self.redo = enabled;
    }
}

impl<A: Affordances> Affordances for std::sync::Arc<std::sync::Mutex<A>> {
    fn set_save_enabled(&mut self, enabled: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.set_save_enabled(enabled);
        }
    }

    fn set_undo_enabled(&mut self, enabled: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.set_undo_enabled(enabled);
        }
    }

    fn set_redo_enabled(&mut self, enabled: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.set_redo_enabled(enabled);
        }
    }
}
