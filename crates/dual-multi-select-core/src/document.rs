//! Document tree.
//!
//! An arena of element nodes standing in for the browser DOM:
//! - Unique node identifiers via arena-based storage
//! - Parent-child relationships with cascade removal
//! - Attributes, class lists, inline style and own text per node
//! - Form state (`selected`, `value`) and scroll offsets
//! - Focus tracking and "has a layout box" checks
//!
//! # Key Types
//!
//! - [`Document`] - The node arena with its root element
//! - [`NodeId`] - Versioned handle to a node; stale after removal
//!
//! Nodes are created detached. A node is *connected* once its ancestor chain
//! reaches the document root.

use std::fmt::Write as _;

use slotmap::{new_key_type, SlotMap};

use crate::error::{DomError, DomResult};

new_key_type! {
    /// A unique identifier for a node in a [`Document`].
    ///
    /// `NodeId`s stay valid while the node exists, no matter how often it is
    /// moved around the tree. Once the node is removed the ID is stale and
    /// every lookup through it reports [`DomError::InvalidNode`].
    pub struct NodeId;
}

/// Internal data stored in the arena for each node.
#[derive(Debug, Clone, Default)]
struct NodeData {
    /// Lowercase tag name.
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Attributes in insertion order. `class` and `style` are kept separately.
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    /// Inline style properties in insertion order.
    style: Vec<(String, String)>,
    /// Own text, rendered before the children.
    text: String,
    /// Current form value. For options, absent means "use the text".
    value: Option<String>,
    /// Option selectedness.
    selected: bool,
    scroll_top: f64,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }
}

/// The document: an arena of nodes rooted at a `body` element.
#[derive(Debug)]
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    focused: Option<NodeId>,
}

impl Document {
    /// Create a document containing only its root element.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new("body"));
        Self {
            nodes,
            root,
            focused: None,
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a new detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.nodes.insert(NodeData::new(tag));
        tracing::trace!(target: "dual_multi_select_core::document", ?id, tag, "created element");
        id
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn node(&self, id: NodeId) -> DomResult<&NodeData> {
        self.nodes.get(id).ok_or(DomError::InvalidNode)
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(DomError::InvalidNode)
    }

    // -------------------------------------------------------------------------
    // Node data
    // -------------------------------------------------------------------------

    /// The node's lowercase tag name.
    pub fn tag(&self, id: NodeId) -> DomResult<&str> {
        self.node(id).map(|n| n.tag.as_str())
    }

    /// Check whether the node exists and has the given tag.
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.tag.eq_ignore_ascii_case(tag))
    }

    /// The node's parent, if attached.
    pub fn parent(&self, id: NodeId) -> DomResult<Option<NodeId>> {
        self.node(id).map(|n| n.parent)
    }

    /// The node's children in order.
    pub fn children(&self, id: NodeId) -> DomResult<&[NodeId]> {
        self.node(id).map(|n| n.children.as_slice())
    }

    /// The node's own text.
    pub fn text(&self, id: NodeId) -> DomResult<&str> {
        self.node(id).map(|n| n.text.as_str())
    }

    /// Replace the node's own text.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> DomResult<()> {
        self.node_mut(id)?.text = text.into();
        Ok(())
    }

    /// Read an attribute.
    pub fn attribute(&self, id: NodeId, name: &str) -> DomResult<Option<&str>> {
        Ok(self
            .node(id)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str()))
    }

    /// Check whether the node exists and carries an attribute.
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.attributes.iter().any(|(key, _)| key == name))
    }

    /// Set an attribute, replacing any previous value in place.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let value = value.into();
        let node = self.node_mut(id)?;
        match node.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => node.attributes.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let node = self.node_mut(id)?;
        let before = node.attributes.len();
        node.attributes.retain(|(key, _)| key != name);
        Ok(node.attributes.len() != before)
    }

    /// Add or remove a boolean attribute such as `disabled` or `hidden`.
    pub fn toggle_attribute(&mut self, id: NodeId, name: &str, on: bool) -> DomResult<()> {
        if on {
            if !self.has_attribute(id, name) {
                self.set_attribute(id, name, "")?;
            }
        } else {
            self.remove_attribute(id, name)?;
        }
        Ok(())
    }

    /// The node's classes in order.
    pub fn classes(&self, id: NodeId) -> DomResult<&[String]> {
        self.node(id).map(|n| n.classes.as_slice())
    }

    /// Check whether the node exists and carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Check whether the node carries any of the given classes.
    pub fn has_any_class(&self, id: NodeId, classes: &[&str]) -> bool {
        classes.iter().any(|class| self.has_class(id, class))
    }

    /// Add a class if it is not already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<()> {
        let node = self.node_mut(id)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Read an inline style property. Unset properties read as `""`.
    pub fn style(&self, id: NodeId, property: &str) -> DomResult<&str> {
        Ok(self
            .node(id)?
            .style
            .iter()
            .find(|(key, _)| key == property)
            .map_or("", |(_, value)| value.as_str()))
    }

    /// Set an inline style property. An empty value removes it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> DomResult<()> {
        let node = self.node_mut(id)?;
        if value.is_empty() {
            node.style.retain(|(key, _)| key != property);
            return Ok(());
        }
        match node.style.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node.style.push((property.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// The raw form value, if one was set.
    pub fn value(&self, id: NodeId) -> DomResult<Option<&str>> {
        self.node(id).map(|n| n.value.as_deref())
    }

    /// Set or clear the form value.
    pub fn set_value(&mut self, id: NodeId, value: Option<String>) -> DomResult<()> {
        self.node_mut(id)?.value = value;
        Ok(())
    }

    /// An option's effective value: its value, falling back to its text.
    pub fn option_value(&self, id: NodeId) -> DomResult<String> {
        let node = self.node(id)?;
        Ok(node.value.clone().unwrap_or_else(|| node.text.clone()))
    }

    /// Option selectedness.
    pub fn is_selected(&self, id: NodeId) -> DomResult<bool> {
        self.node(id).map(|n| n.selected)
    }

    /// Set option selectedness.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> DomResult<()> {
        self.node_mut(id)?.selected = selected;
        Ok(())
    }

    /// Whether the node carries the `disabled` attribute.
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attribute(id, "disabled")
    }

    /// Whether the node carries the `hidden` attribute.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.has_attribute(id, "hidden")
    }

    /// Vertical scroll offset.
    pub fn scroll_top(&self, id: NodeId) -> DomResult<f64> {
        self.node(id).map(|n| n.scroll_top)
    }

    /// Set the vertical scroll offset. Negative offsets clamp to zero.
    pub fn set_scroll_top(&mut self, id: NodeId, offset: f64) -> DomResult<()> {
        self.node_mut(id)?.scroll_top = offset.max(0.0);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tree mutation
    // -------------------------------------------------------------------------

    /// Check that `node` may be inserted under `parent`.
    fn check_insertion(&self, parent: NodeId, node: NodeId) -> DomResult<()> {
        self.node(parent)?;
        self.node(node)?;
        if node == self.root || self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::HierarchyRequest);
        }
        Ok(())
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|n| n.parent);
        }
        false
    }

    /// Remove a node from its parent's child list, keeping it alive.
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent_id) = parent {
            if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, node: NodeId) -> DomResult<()> {
        self.check_insertion(parent, node)?;
        self.detach(node)?;
        let parent_data = self.node_mut(parent)?;
        let index = index.min(parent_data.children.len());
        parent_data.children.insert(index, node);
        self.node_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let len = self.node(parent)?.children.len();
        self.insert_at(parent, len, child)
    }

    /// Insert `child` as the first child of `parent`, moving it if attached.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_at(parent, 0, child)
    }

    /// Insert `node` immediately after `reference` under the same parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> DomResult<()> {
        let parent = self.node(reference)?.parent.ok_or(DomError::Detached)?;
        self.check_insertion(parent, node)?;
        self.detach(node)?;
        let index = self
            .children(parent)?
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::InvalidNode)?;
        self.insert_at(parent, index + 1, node)
    }

    /// Put `replacement` where `old` is and detach `old`.
    ///
    /// This is a single tree operation from the observer's point of view: no
    /// state exists in which both or neither node is attached.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) -> DomResult<()> {
        if old == replacement {
            return Ok(());
        }
        let parent = self.node(old)?.parent.ok_or(DomError::Detached)?;
        self.check_insertion(parent, replacement)?;
        self.detach(replacement)?;

        let parent_data = self.node_mut(parent)?;
        let index = parent_data
            .children
            .iter()
            .position(|&c| c == old)
            .ok_or(DomError::InvalidNode)?;
        parent_data.children[index] = replacement;

        self.node_mut(old)?.parent = None;
        self.node_mut(replacement)?.parent = Some(parent);
        Ok(())
    }

    /// Detach a node and destroy it together with all of its descendants.
    #[tracing::instrument(skip(self), target = "dual_multi_select_core::document", level = "trace")]
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        if id == self.root {
            return Err(DomError::HierarchyRequest);
        }
        let doomed = self.descendants(id)?;
        self.detach(id)?;

        if self
            .focused
            .is_some_and(|f| f == id || doomed.contains(&f))
        {
            self.focused = None;
        }

        for descendant in doomed {
            self.nodes.remove(descendant);
        }
        self.nodes.remove(id);
        Ok(())
    }

    /// Remove and destroy every child of a node.
    pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Create a detached copy of a node without its children or text.
    ///
    /// Tag, attributes, classes and inline style are copied; form state and
    /// scroll offset are not.
    pub fn clone_shallow(&mut self, id: NodeId) -> DomResult<NodeId> {
        let source = self.node(id)?;
        let copy = NodeData {
            tag: source.tag.clone(),
            attributes: source.attributes.clone(),
            classes: source.classes.clone(),
            style: source.style.clone(),
            ..Default::default()
        };
        Ok(self.nodes.insert(copy))
    }

    // -------------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------------

    /// All descendants in document (pre-)order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id)?.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.node(current)?.children.iter().rev().copied());
        }
        Ok(result)
    }

    /// The first descendant, in document order, matching a predicate.
    pub fn find_descendant<P>(&self, id: NodeId, pred: P) -> DomResult<Option<NodeId>>
    where
        P: Fn(&Self, NodeId) -> bool,
    {
        Ok(self.descendants(id)?.into_iter().find(|&d| pred(self, d)))
    }

    /// The node itself or its nearest ancestor matching a predicate.
    pub fn closest<P>(&self, id: NodeId, pred: P) -> DomResult<Option<NodeId>>
    where
        P: Fn(&Self, NodeId) -> bool,
    {
        self.closest_within(id, None, pred)
    }

    /// Like [`closest`](Self::closest), but the search does not climb past
    /// `boundary` (which is itself still tested).
    pub fn closest_within<P>(
        &self,
        id: NodeId,
        boundary: Option<NodeId>,
        pred: P,
    ) -> DomResult<Option<NodeId>>
    where
        P: Fn(&Self, NodeId) -> bool,
    {
        let mut current = Some(id);
        while let Some(current_id) = current {
            let node = self.node(current_id)?;
            if pred(self, current_id) {
                return Ok(Some(current_id));
            }
            if Some(current_id) == boundary {
                break;
            }
            current = node.parent;
        }
        Ok(None)
    }

    /// The path from a node up to the top of its tree, node first.
    pub fn ancestors_inclusive(&self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(current_id) = current {
            path.push(current_id);
            current = self.node(current_id)?.parent;
        }
        Ok(path)
    }

    /// Every `option` below a node, in document order.
    pub fn options(&self, select: NodeId) -> DomResult<Vec<NodeId>> {
        Ok(self
            .descendants(select)?
            .into_iter()
            .filter(|&d| self.is_element(d, "option"))
            .collect())
    }

    // -------------------------------------------------------------------------
    // Connectivity, layout and focus
    // -------------------------------------------------------------------------

    /// Whether the node's ancestor chain reaches the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_inclusive_ancestor(self.root, id)
    }

    /// Whether the node would get a layout box: it is connected and neither
    /// it nor any ancestor is `hidden` or `display: none`.
    pub fn has_layout_box(&self, id: NodeId) -> bool {
        if !self.is_connected(id) {
            return false;
        }
        let mut current = Some(id);
        while let Some(current_id) = current {
            let Some(node) = self.nodes.get(current_id) else {
                return false;
            };
            let display_none = node
                .style
                .iter()
                .any(|(key, value)| key == "display" && value == "none");
            if display_none || self.is_hidden(current_id) {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Move keyboard focus to a node.
    ///
    /// Only connected nodes with a `tabindex` can take focus. Returns whether
    /// focus moved.
    pub fn focus(&mut self, id: NodeId) -> DomResult<bool> {
        self.node(id)?;
        if !self.has_attribute(id, "tabindex") || !self.is_connected(id) {
            return Ok(false);
        }
        self.focused = Some(id);
        Ok(true)
    }

    /// The node that currently holds keyboard focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Serialize a node and its subtree as markup.
    ///
    /// Node IDs are not part of the output, so two structurally equal trees
    /// serialize identically.
    pub fn outer_html(&self, id: NodeId) -> DomResult<String> {
        let mut out = String::new();
        self.write_html(id, &mut out)?;
        Ok(out)
    }

    fn write_html(&self, id: NodeId, out: &mut String) -> DomResult<()> {
        let node = self.node(id)?;
        out.push('<');
        out.push_str(&node.tag);
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&node.classes.join(" ")));
        }
        for (key, value) in &node.attributes {
            if value.is_empty() {
                let _ = write!(out, " {key}");
            } else {
                let _ = write!(out, " {key}=\"{}\"", escape(value));
            }
        }
        if !node.style.is_empty() {
            let style: Vec<String> = node
                .style
                .iter()
                .map(|(key, value)| format!("{key}: {value};"))
                .collect();
            let _ = write!(out, " style=\"{}\"", escape(&style.join(" ")));
        }
        if node.selected {
            out.push_str(" selected");
        }
        out.push('>');
        out.push_str(&escape(&node.text));
        for &child in &node.children {
            self.write_html(child, out)?;
        }
        let _ = write!(out, "</{}>", node.tag);
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
