//! Keeping the rendered panes in step with the native control.
//!
//! A [`SyncController`] runs one pass when it starts and then one pass per
//! change event on the select. A pass always re-projects the whole control;
//! there is no incremental path.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dual_multi_select_core::logging::span_names;
use dual_multi_select_core::{DocumentTreeDebug, EventKind, ListenerId, NodeId, Page, PerfSpan, Signal};
use parking_lot::Mutex;

use crate::error::{DualListError, Result};
use crate::projection::DataProjection;
use crate::render::{self, RenderedLists};

/// Lifecycle of a [`SyncController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Listening for change events.
    Idle { listener: ListenerId },
    /// Unsubscribed for good.
    Disposed,
}

/// Runs synchronization passes in response to change events.
pub struct SyncController {
    state: Mutex<SyncState>,
    passes: Arc<AtomicU64>,
}

static_assertions::assert_impl_all!(SyncController: Send, Sync);

impl SyncController {
    /// Run the initial pass, then subscribe to change events on `select`.
    ///
    /// Passes triggered by events cannot return their errors to anyone, so
    /// they are logged and published on `errors`.
    pub fn start(
        page: &Arc<Page>,
        select: NodeId,
        container: NodeId,
        projection: Arc<DataProjection>,
        errors: Arc<Signal<DualListError>>,
    ) -> Result<Self> {
        let passes = Arc::new(AtomicU64::new(0));
        synchronize(page, select, container, &projection, &passes)?;

        let weak_page = Arc::downgrade(page);
        let listener_passes = passes.clone();
        let listener = page.add_event_listener(select, EventKind::Change, move |_| {
            let Some(page) = weak_page.upgrade() else {
                return;
            };
            if let Err(err) = synchronize(&page, select, container, &projection, &listener_passes) {
                tracing::error!(target: "dual_multi_select::sync", error = %err, "synchronization pass failed");
                trace_markup(&page, container);
                errors.emit(err);
            }
        });

        tracing::debug!(target: "dual_multi_select::sync", ?select, "synchronization started");
        Ok(Self {
            state: Mutex::new(SyncState::Idle { listener }),
            passes,
        })
    }

    /// The current state.
    pub fn state(&self) -> SyncState {
        *self.state.lock()
    }

    /// Number of passes run so far, the initial one included.
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::SeqCst)
    }

    /// Unsubscribe from change events. Further calls do nothing.
    pub fn dispose(&self, page: &Page) -> Result<()> {
        let previous = std::mem::replace(&mut *self.state.lock(), SyncState::Disposed);
        if let SyncState::Idle { listener } = previous {
            if page.remove_event_listener(listener).is_err() {
                // The select was removed from the page together with its listeners.
                tracing::debug!(target: "dual_multi_select::sync", "change listener already gone");
            }
            tracing::debug!(target: "dual_multi_select::sync", "synchronization disposed");
        }
        Ok(())
    }
}

/// One full pass: project the native control and render both panes.
fn synchronize(
    page: &Page,
    select: NodeId,
    container: NodeId,
    projection: &DataProjection,
    passes: &AtomicU64,
) -> Result<RenderedLists> {
    let _span = PerfSpan::new(span_names::SYNC_PASS);
    let mut document = page.document();
    let entries = projection.project(&mut document, select)?;
    let lists = render::render(&mut document, container, &entries)?;
    let pass = passes.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::trace!(target: "dual_multi_select::sync", pass, entries = entries.len(), "synchronization pass complete");
    Ok(lists)
}

/// Dump the widget markup left behind by a failed pass.
fn trace_markup(page: &Page, container: NodeId) {
    if !tracing::enabled!(target: "dual_multi_select::sync", tracing::Level::TRACE) {
        return;
    }
    let document = page.document();
    match DocumentTreeDebug::new().format_subtree(&document, container) {
        Ok(tree) => tracing::trace!(target: "dual_multi_select::sync", "markup after failed pass:\n{tree}"),
        Err(err) => tracing::trace!(target: "dual_multi_select::sync", error = %err, "markup unavailable"),
    }
}
