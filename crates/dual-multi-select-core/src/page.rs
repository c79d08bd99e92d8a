//! The page: shared host context for documents, listeners and timers.
//!
//! A [`Page`] plays the role of the browser's UI thread. It owns the
//! [`Document`], the listener tables and the timer queue, and it is the only
//! place that invokes listener and timer callbacks.
//!
//! # Locking
//!
//! The document sits behind a mutex. Event dispatch and timer processing
//! never hold that lock while running callbacks, so a callback is free to
//! lock the document, mutate it and dispatch further events. Callers must
//! likewise release their document guard before dispatching.
//!
//! # Example
//!
//! ```
//! use dual_multi_select_core::{DomEvent, EventKind, Page};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let page = Page::new();
//! let button = {
//!     let mut doc = page.document();
//!     let button = doc.create_element("button");
//!     let root = doc.root();
//!     doc.append_child(root, button).unwrap();
//!     button
//! };
//!
//! let clicks = Arc::new(AtomicUsize::new(0));
//! let clicks_clone = clicks.clone();
//! page.add_event_listener(button, EventKind::Click, move |_| {
//!     clicks_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! page.dispatch_event(DomEvent::click(button)).unwrap();
//! assert_eq!(clicks.load(Ordering::SeqCst), 1);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

use crate::document::{Document, NodeId};
use crate::error::{DomResult, Result, SignalError};
use crate::event::{DomEvent, EventKind, EventListeners, ListenerId};
use crate::timer::{TimerCallback, TimerId, TimerManager};

/// Shared host context. Create with [`Page::new`] and share the `Arc`.
pub struct Page {
    document: Mutex<Document>,
    listeners: EventListeners,
    timers: Mutex<TimerManager>,
}

static_assertions::assert_impl_all!(Page: Send, Sync);

impl Page {
    /// Create a page with an empty document.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Arc<Self> {
        Self::with_document(Document::new())
    }

    /// Create a page around an existing document.
    pub fn with_document(document: Document) -> Arc<Self> {
        Arc::new(Self {
            document: Mutex::new(document),
            listeners: EventListeners::new(),
            timers: Mutex::new(TimerManager::new()),
        })
    }

    /// Lock the document.
    ///
    /// Drop the guard before calling [`dispatch_event`](Self::dispatch_event)
    /// or processing timers.
    pub fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Listen for events of `kind` at `node` (including ones bubbling up from
    /// its descendants).
    pub fn add_event_listener<F>(&self, node: NodeId, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        self.listeners.add(node, kind, listener)
    }

    /// Remove a listener.
    pub fn remove_event_listener(&self, listener: ListenerId) -> Result<()> {
        if self.listeners.remove(listener) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection.into())
        }
    }

    /// Number of listeners registered on the page.
    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }

    /// Dispatch an event at its target, then at each ancestor if it bubbles.
    ///
    /// The propagation path is fixed before any listener runs, as in the DOM.
    #[tracing::instrument(skip(self), target = "dual_multi_select_core::event", level = "trace")]
    pub fn dispatch_event(&self, event: DomEvent) -> DomResult<()> {
        let path = {
            let document = self.document.lock();
            if event.bubbles {
                document.ancestors_inclusive(event.target)?
            } else {
                document.tag(event.target)?;
                vec![event.target]
            }
        };

        for node in path {
            if let Some(signal) = self.listeners.signal(node, event.kind) {
                signal.emit(event.at(node));
            }
        }
        Ok(())
    }

    /// Dispatch a bubbling click at `target`.
    pub fn click(&self, target: NodeId) -> DomResult<()> {
        self.dispatch_event(DomEvent::click(target))
    }

    /// Remove a node from the document along with every listener attached to
    /// it or its descendants.
    pub fn remove_node(&self, node: NodeId) -> DomResult<()> {
        let removed = {
            let mut document = self.document.lock();
            let mut removed = document.descendants(node)?;
            removed.push(node);
            document.remove(node)?;
            removed
        };
        for id in removed {
            self.listeners.remove_node(id);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Timers
    // -------------------------------------------------------------------------

    /// Run `callback` once, `delay` from now.
    pub fn start_timer<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: TimerCallback = Arc::new(callback);
        self.timers
            .lock()
            .start_one_shot(Instant::now(), delay, callback)
    }

    /// Stop a timer. Its callback will not run afterwards.
    pub fn stop_timer(&self, id: TimerId) -> Result<()> {
        Ok(self.timers.lock().stop(id)?)
    }

    /// Whether a timer is still pending.
    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.timers.lock().is_active(id)
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.lock().active_count()
    }

    /// Run every timer that is due now. Returns how many fired.
    pub fn process_timers(&self) -> usize {
        self.process_timers_at(Instant::now())
    }

    /// Run every timer due at `now`. Returns how many fired.
    ///
    /// Passing an instant in the future lets tests step over debounce
    /// windows without sleeping.
    pub fn process_timers_at(&self, now: Instant) -> usize {
        let due = self.timers.lock().process_expired(now);
        let fired = due.len();
        for (_, callback) in due {
            callback();
        }
        fired
    }
}
