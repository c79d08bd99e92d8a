//! Document events and per-node listener tables.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::document::NodeId;
use crate::signal::{ConnectionId, Signal};

/// The kinds of events the document dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A pointer click on an element.
    Click,
    /// A form control's value or selection changed.
    Change,
    /// A text input received input.
    Input,
}

/// An event travelling through the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    /// What happened.
    pub kind: EventKind,
    /// The node the event was dispatched at.
    pub target: NodeId,
    /// The node whose listeners are currently being invoked.
    pub current_target: NodeId,
    /// Whether the event propagates to ancestors after the target.
    pub bubbles: bool,
}

impl DomEvent {
    /// Create a bubbling event of the given kind.
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            bubbles: true,
        }
    }

    /// A bubbling click.
    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    /// A bubbling change, as raised after programmatic mutation of a control.
    pub fn change(target: NodeId) -> Self {
        Self::new(EventKind::Change, target)
    }

    /// A bubbling input.
    pub fn input(target: NodeId) -> Self {
        Self::new(EventKind::Input, target)
    }

    /// Set whether the event bubbles.
    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// The same event as seen by listeners on `node`.
    pub fn at(mut self, node: NodeId) -> Self {
        self.current_target = node;
        self
    }
}

/// Handle to a registered listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId {
    /// The node the listener is attached to.
    pub node: NodeId,
    /// The event kind it listens for.
    pub kind: EventKind,
    /// The underlying signal connection.
    pub connection: ConnectionId,
}

/// Listener table: one signal per `(node, kind)` pair.
#[derive(Default)]
pub struct EventListeners {
    signals: Mutex<HashMap<(NodeId, EventKind), Arc<Signal<DomEvent>>>>,
}

impl EventListeners {
    /// Create an empty listener table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add<F>(&self, node: NodeId, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        let signal = self
            .signals
            .lock()
            .entry((node, kind))
            .or_insert_with(|| Arc::new(Signal::new()))
            .clone();
        let connection = signal.connect(listener);
        tracing::trace!(target: "dual_multi_select_core::event", ?node, ?kind, "listener added");
        ListenerId {
            node,
            kind,
            connection,
        }
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove(&self, listener: ListenerId) -> bool {
        let mut signals = self.signals.lock();
        let key = (listener.node, listener.kind);
        let Some(signal) = signals.get(&key) else {
            return false;
        };
        let removed = signal.disconnect(listener.connection);
        if signal.connection_count() == 0 {
            signals.remove(&key);
        }
        removed
    }

    /// The signal for a `(node, kind)` pair, if anything listens there.
    pub fn signal(&self, node: NodeId, kind: EventKind) -> Option<Arc<Signal<DomEvent>>> {
        self.signals.lock().get(&(node, kind)).cloned()
    }

    /// Drop every listener attached to a node.
    pub fn remove_node(&self, node: NodeId) {
        self.signals.lock().retain(|(n, _), _| *n != node);
    }

    /// Total number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.signals
            .lock()
            .values()
            .map(|signal| signal.connection_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_add_and_remove() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        let listeners = EventListeners::new();

        let id = listeners.add(node, EventKind::Click, |_| {});
        assert_eq!(listeners.listener_count(), 1);
        assert!(listeners.signal(node, EventKind::Click).is_some());
        assert!(listeners.signal(node, EventKind::Change).is_none());

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert_eq!(listeners.listener_count(), 0);
        assert!(listeners.signal(node, EventKind::Click).is_none());
    }

    #[test]
    fn test_event_constructors() {
        let mut doc = Document::new();
        let node = doc.create_element("select");
        let other = doc.create_element("div");

        let event = DomEvent::change(node);
        assert!(event.bubbles);
        assert_eq!(event.current_target, node);

        let event = event.with_bubbles(false).at(other);
        assert!(!event.bubbles);
        assert_eq!(event.target, node);
        assert_eq!(event.current_target, other);
    }
}
