//! Typed session events and the synchronous bus that delivers them.
//!
//! Subscribers are notified in registration order, on the publishing thread,
//! before [`EventBus::publish`] returns. Publishing with at least one
//! subscriber marks the artifact dirty unless the event is
//! [`EventKind::FileLoaded`] or [`EventKind::PathChanged`]; with no
//! subscribers the event is dropped and nothing is marked.

use std::fmt;
use std::path::PathBuf;

use tracing::trace;

use crate::calculation::{CalculationStatus, Phase};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewContext,
    ContextChanged,
    AttributeRenamed,
    LabelsChanged,
    TemporaryContextChanged,
    CalculationsCancelled,
    FileLoaded,
    PathChanged,
    StatusChanged,
}

impl EventKind {
    pub const fn marks_dirty(self) -> bool {
        !matches!(self, Self::FileLoaded | Self::PathChanged)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NewContext => "new-context",
            Self::ContextChanged => "context-changed",
            Self::AttributeRenamed => "attribute-renamed",
            Self::LabelsChanged => "labels-changed",
            Self::TemporaryContextChanged => "temporary-context-changed",
            Self::CalculationsCancelled => "calculations-cancelled",
            Self::FileLoaded => "file-loaded",
            Self::PathChanged => "path-changed",
            Self::StatusChanged => "status-changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The whole context was replaced.
    NewContext { context: Snapshot },
    /// The context was edited in place.
    ContextChanged { context: Snapshot },
    AttributeRenamed { old: String, new: String },
    LabelsChanged,
    /// Considered-markings changed.
    TemporaryContextChanged,
    /// In-flight derivations are obsolete.
    CalculationsCancelled,
    FileLoaded { path: PathBuf },
    PathChanged { path: PathBuf },
    StatusChanged {
        status: CalculationStatus,
        phase: Phase,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NewContext { .. } => EventKind::NewContext,
            Self::ContextChanged { .. } => EventKind::ContextChanged,
            Self::AttributeRenamed { .. } => EventKind::AttributeRenamed,
            Self::LabelsChanged => EventKind::LabelsChanged,
            Self::TemporaryContextChanged => EventKind::TemporaryContextChanged,
            Self::CalculationsCancelled => EventKind::CalculationsCancelled,
            Self::FileLoaded { .. } => EventKind::FileLoaded,
            Self::PathChanged { .. } => EventKind::PathChanged,
            Self::StatusChanged { .. } => EventKind::StatusChanged,
        }
    }
}

/// Receives events from the bus.
///
/// Implemented for every `FnMut(&SessionEvent) + Send` closure.
pub trait Listener: Send {
    fn notify(&mut self, event: &SessionEvent);
}

impl<F> Listener for F
where
    F: FnMut(&SessionEvent) + Send,
{
    fn notify(&mut self, event: &SessionEvent) {
        self(event);
    }
}

/// A plain notification function with its captured context passed in
/// explicitly.
struct ContextListener<C> {
    context: C,
    notify: fn(&mut C, &SessionEvent),
}

impl<C: Send> Listener for ContextListener<C> {
    fn notify(&mut self, event: &SessionEvent) {
        (self.notify)(&mut self.context, event);
    }
}

/// Whatever the bus marks dirty on publish.
pub trait DirtySink {
    fn mark_dirty(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

struct Subscriber {
    id: SubscriberId,
    label: String,
    listener: Box<dyn Listener>,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.labels().collect::<Vec<_>>())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        label: impl Into<String>,
        listener: impl Listener + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            label: label.into(),
            listener: Box::new(listener),
        });
        id
    }

    /// Registers `notify` together with the state it operates on.
    pub fn subscribe_with<C: Send + 'static>(
        &mut self,
        label: impl Into<String>,
        context: C,
        notify: fn(&mut C, &SessionEvent),
    ) -> SubscriberId {
        self.subscribe(label, ContextListener { context, notify })
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Subscriber labels in notification order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.subscribers.iter().map(|s| s.label.as_str())
    }

    /// Delivers `event` to every subscriber and returns how many received it.
    pub fn publish(&mut self, event: SessionEvent, sink: &mut dyn DirtySink) -> usize {
        let kind = event.kind();
        if self.subscribers.is_empty() {
            trace!(event = kind.name(), "no subscribers, event dropped");
            return 0;
        }
        if kind.marks_dirty() {
            sink.mark_dirty();
        }
        for subscriber in &mut self.subscribers {
            subscriber.listener.notify(&event);
        }
        trace!(
            event = kind.name(),
            subscribers = self.subscribers.len(),
            "event delivered"
        );
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct Flag(bool);

    impl DirtySink for Flag {
        fn mark_dirty(&mut self) {
            self.0 = true;
        }
    }

    #[test]
    fn delivery_follows_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for name in ["A", "B", "C"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(name, move |_: &SessionEvent| seen.lock().unwrap().push(name));
        }
        let mut flag = Flag::default();
        assert_eq!(bus.publish(SessionEvent::LabelsChanged, &mut flag), 3);
        assert_eq!(*seen.lock().unwrap(), ["A", "B", "C"]);
        assert!(flag.0);
    }

    #[test]
    fn no_subscribers_no_dirty() {
        let mut bus = EventBus::new();
        let mut flag = Flag::default();
        assert_eq!(bus.publish(SessionEvent::LabelsChanged, &mut flag), 0);
        assert!(!flag.0);
    }

    #[test]
    fn file_events_do_not_mark_dirty() {
        let mut bus = EventBus::new();
        bus.subscribe("noop", |_: &SessionEvent| {});
        let mut flag = Flag::default();
        bus.publish(
            SessionEvent::FileLoaded {
                path: PathBuf::from("a.json"),
            },
            &mut flag,
        );
        bus.publish(
            SessionEvent::PathChanged {
                path: PathBuf::from("a.json"),
            },
            &mut flag,
        );
        assert!(!flag.0);
    }

    #[test]
    fn context_listener_receives_its_state() {
        fn count(counter: &mut Arc<Mutex<usize>>, _: &SessionEvent) {
            *counter.lock().unwrap() += 1;
        }
        let counter = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let id = bus.subscribe_with("counter", Arc::clone(&counter), count);
        let mut flag = Flag::default();
        bus.publish(SessionEvent::CalculationsCancelled, &mut flag);
        assert!(bus.unsubscribe(id));
        bus.publish(SessionEvent::CalculationsCancelled, &mut flag);
        assert_eq!(*counter.lock().unwrap(), 1);
    }
}
