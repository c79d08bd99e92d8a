//! Rendering the model into the two pane lists.
//!
//! Each pass builds a fresh list per pane off-tree, starting from a shallow
//! clone of the live list, and then swaps it in with a single
//! [`Document::replace_with`]. The live tree therefore sees exactly two
//! replacements per pass no matter how many entries there are. The scroll
//! offset of the old list carries over, and so does keyboard focus.

use dual_multi_select_core::{Document, DomError, NodeId};

use crate::classes;
use crate::error::Result;
use crate::identity::{INTERNAL_ID_ATTRIBUTE, Identity};
use crate::model::{Entry, LeafEntry};

/// One of the two visual lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Lists options that are not selected.
    Selectable,
    /// Lists options that are selected.
    Selected,
}

impl Pane {
    /// Both panes, in layout order.
    pub const ALL: [Pane; 2] = [Pane::Selectable, Pane::Selected];

    /// The marker class of the pane element.
    pub fn class(self) -> &'static str {
        match self {
            Pane::Selectable => classes::SELECTABLE,
            Pane::Selected => classes::SELECTED,
        }
    }

    /// The pane a leaf is routed to.
    pub fn of(leaf: &LeafEntry) -> Self {
        if leaf.selected { Pane::Selected } else { Pane::Selectable }
    }
}

/// The live list of each pane after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedLists {
    pub selectable: NodeId,
    pub selected: NodeId,
}

impl RenderedLists {
    /// The list of the given pane.
    pub fn get(&self, pane: Pane) -> NodeId {
        match pane {
            Pane::Selectable => self.selectable,
            Pane::Selected => self.selected,
        }
    }
}

/// Find the pane element of the given kind inside `container`.
pub fn pane_element(document: &Document, container: NodeId, pane: Pane) -> Result<NodeId> {
    document
        .find_descendant(container, |doc, node| doc.has_class(node, pane.class()))?
        .ok_or_else(|| DomError::InvalidNode.into())
}

/// Find the live list of the given pane inside `container`.
pub fn live_list(document: &Document, container: NodeId, pane: Pane) -> Result<NodeId> {
    let pane = pane_element(document, container, pane)?;
    document
        .find_descendant(pane, |doc, node| doc.has_class(node, classes::LIST))?
        .ok_or_else(|| DomError::InvalidNode.into())
}

/// Render `entries` into the panes of `container`.
#[tracing::instrument(skip(document, entries), target = "dual_multi_select::render", level = "trace")]
pub fn render(document: &mut Document, container: NodeId, entries: &[Entry]) -> Result<RenderedLists> {
    let selectable = render_pane(document, container, entries, Pane::Selectable)?;
    let selected = render_pane(document, container, entries, Pane::Selected)?;
    Ok(RenderedLists {
        selectable,
        selected,
    })
}

fn render_pane(document: &mut Document, container: NodeId, entries: &[Entry], pane: Pane) -> Result<NodeId> {
    let live = live_list(document, container, pane)?;
    let fresh = document.clone_shallow(live)?;

    for entry in entries {
        match entry {
            Entry::Leaf(leaf) => {
                if !leaf.hidden && Pane::of(leaf) == pane {
                    let item = leaf_item(document, leaf)?;
                    document.append_child(fresh, item)?;
                }
            }
            Entry::Group(group) => {
                let mut routed = group
                    .children
                    .iter()
                    .filter(|leaf| !leaf.hidden && Pane::of(leaf) == pane)
                    .peekable();
                if routed.peek().is_none() {
                    continue;
                }

                let item = marked_item(document, classes::OPT_GROUP, group.id)?;
                let label = document.create_element("div");
                document.add_class(label, classes::OPT_GROUP_LABEL)?;
                document.set_text(label, group.label.as_str())?;
                let children = document.create_element("ul");
                for leaf in routed {
                    let child = leaf_item(document, leaf)?;
                    document.append_child(children, child)?;
                }
                document.append_child(item, label)?;
                document.append_child(item, children)?;
                document.append_child(fresh, item)?;
            }
        }
    }

    swap(document, live, fresh)?;
    Ok(fresh)
}

fn marked_item(document: &mut Document, class: &str, id: Identity) -> Result<NodeId> {
    let item = document.create_element("li");
    document.add_class(item, class)?;
    document.set_attribute(item, INTERNAL_ID_ATTRIBUTE, id.to_string())?;
    Ok(item)
}

fn leaf_item(document: &mut Document, leaf: &LeafEntry) -> Result<NodeId> {
    let item = marked_item(document, classes::OPTION, leaf.id)?;
    if leaf.disabled {
        document.add_class(item, classes::DISABLED)?;
    }
    document.set_text(item, leaf.text.as_str())?;
    Ok(item)
}

/// Put `fresh` in place of `live`, carrying over scroll offset and focus,
/// then destroy `live`.
fn swap(document: &mut Document, live: NodeId, fresh: NodeId) -> Result<()> {
    let scroll_top = document.scroll_top(live)?;
    let had_focus = document.focused() == Some(live);

    document.replace_with(live, fresh)?;
    document.set_scroll_top(fresh, scroll_top)?;
    if had_focus {
        document.focus(fresh)?;
    }
    document.remove(live)?;
    Ok(())
}
