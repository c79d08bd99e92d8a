//! Turning clicks on rendered items into native selection changes.

use std::collections::HashMap;
use std::sync::Arc;

use dual_multi_select_core::logging::span_names;
use dual_multi_select_core::{Document, DomEvent, EventKind, ListenerId, NodeId, Page, PerfSpan, Signal};
use parking_lot::Mutex;

use crate::classes;
use crate::error::{DualListError, Result};
use crate::identity::{Identity, IdentityRegistry};
use crate::render::Pane;

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click hit no item, or hit a group while group clicks are off.
    Ignored,
    /// An item was hit but no option changed, e.g. because it is disabled.
    Unchanged,
    /// This many options changed selectedness. One change event was raised.
    Changed(usize),
}

/// Static facts a click handler needs about its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickContext {
    pub select: NodeId,
    pub container: NodeId,
    pub selectable_option_groups: bool,
}

/// Owns the delegated click listener on the container.
pub struct InteractionController {
    listener: Mutex<Option<ListenerId>>,
}

static_assertions::assert_impl_all!(InteractionController: Send, Sync);

impl InteractionController {
    /// Listen for clicks anywhere inside the container.
    pub fn start(page: &Arc<Page>, context: ClickContext, errors: Arc<Signal<DualListError>>) -> Self {
        let weak_page = Arc::downgrade(page);
        let listener = page.add_event_listener(context.container, EventKind::Click, move |event| {
            let Some(page) = weak_page.upgrade() else {
                return;
            };
            if let Err(err) = handle_click(&page, context, event.target) {
                tracing::error!(target: "dual_multi_select::interaction", error = %err, "click handling failed");
                errors.emit(err);
            }
        });

        Self {
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Remove the click listener. Further calls do nothing.
    pub fn dispose(&self, page: &Page) {
        if let Some(listener) = self.listener.lock().take() {
            if page.remove_event_listener(listener).is_err() {
                tracing::debug!(target: "dual_multi_select::interaction", "click listener already gone");
            }
        }
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.listener.lock().is_some()
    }
}

/// Handle a click at `target`.
///
/// Focus moves to the enclosing list whether or not anything changes. If any
/// option changes, a single bubbling change event is raised on the select
/// after the document has been released.
pub fn handle_click(page: &Page, context: ClickContext, target: NodeId) -> Result<ClickOutcome> {
    let _span = PerfSpan::new(span_names::CLICK);
    let changed = {
        let mut document = page.document();
        match toggle_clicked(&mut document, context, target)? {
            Some(changed) => changed,
            None => return Ok(ClickOutcome::Ignored),
        }
    };

    tracing::debug!(target: "dual_multi_select::interaction", ?target, changed, "click handled");
    if changed == 0 {
        return Ok(ClickOutcome::Unchanged);
    }
    page.dispatch_event(DomEvent::change(context.select))?;
    Ok(ClickOutcome::Changed(changed))
}

/// Apply a click to the native options. `None` means the click is ignored,
/// otherwise the number of options that changed.
fn toggle_clicked(document: &mut Document, context: ClickContext, target: NodeId) -> Result<Option<usize>> {
    let inside = document.closest(target, |_, node| node == context.container)?;
    if inside.is_none() {
        return Ok(None);
    }
    let within = Some(context.container);

    if let Some(list) = document.closest_within(target, within, |doc, node| doc.has_class(node, classes::LIST))? {
        document.focus(list)?;
    }

    let pane = document.closest_within(target, within, |doc, node| {
        doc.has_any_class(node, &[classes::SELECTABLE, classes::SELECTED])
    })?;
    let item = document.closest_within(target, within, |doc, node| {
        doc.has_any_class(node, &[classes::OPTION, classes::OPT_GROUP])
    })?;
    let (Some(pane), Some(item)) = (pane, item) else {
        return Ok(None);
    };

    let pane = if document.has_class(pane, classes::SELECTED) {
        Pane::Selected
    } else {
        Pane::Selectable
    };
    // Clicking in the selectable pane selects, in the selected pane deselects.
    let select_it = pane == Pane::Selectable;
    let index = IdentityRegistry::index(document, context.select)?;

    if document.has_class(item, classes::OPTION) {
        let changed = toggle_leaf(document, &index, item, select_it)?;
        return Ok(Some(usize::from(changed)));
    }

    if !context.selectable_option_groups {
        return Ok(None);
    }

    let mut changed = 0;
    for leaf in group_items(document, item)? {
        if document.has_layout_box(leaf) && toggle_leaf(document, &index, leaf, select_it)? {
            changed += 1;
        }
    }
    Ok(Some(changed))
}

/// The leaf items directly inside a rendered group.
fn group_items(document: &Document, group: NodeId) -> Result<Vec<NodeId>> {
    let mut items = Vec::new();
    for &child in document.children(group)? {
        if !document.is_element(child, "ul") {
            continue;
        }
        for &leaf in document.children(child)? {
            if document.has_class(leaf, classes::OPTION) {
                items.push(leaf);
            }
        }
    }
    Ok(items)
}

/// Set the option behind a rendered leaf. Returns whether it changed.
fn toggle_leaf(
    document: &mut Document,
    index: &HashMap<Identity, NodeId>,
    item: NodeId,
    select_it: bool,
) -> Result<bool> {
    let id = IdentityRegistry::read(document, item)?;
    let option = index
        .get(&id)
        .copied()
        .filter(|&node| document.is_element(node, "option"))
        .ok_or(DualListError::OrphanedReference(id))?;

    if document.is_disabled(option) || document.is_selected(option)? == select_it {
        return Ok(false);
    }
    document.set_selected(option, select_it)?;
    Ok(true)
}
