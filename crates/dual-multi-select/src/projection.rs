//! Projection between the native control and the normalized model.

use std::collections::HashMap;

use dual_multi_select_core::{Document, DomEvent, NodeId, Page};

use crate::error::Result;
use crate::identity::IdentityRegistry;
use crate::model::{Entry, ExternalEntry, GroupEntry, LeafData, LeafEntry, to_external};

/// Reads the native control into the model and writes the model back.
///
/// Owns the instance's [`IdentityRegistry`], so identities assigned by one
/// widget never leak into another.
#[derive(Debug, Default)]
pub struct DataProjection {
    identities: IdentityRegistry,
}

impl DataProjection {
    /// Create a projection with a fresh identity counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry handing out identities for this instance.
    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    /// Derive the model from the options below `select`, in document order.
    ///
    /// An option inside an `optgroup` goes under that group's entry, which
    /// sits where the group's first option was seen. Identities are assigned
    /// to nodes seen for the first time.
    #[tracing::instrument(skip(self, document), target = "dual_multi_select::projection", level = "trace")]
    pub fn project(&self, document: &mut Document, select: NodeId) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = Vec::new();
        let mut group_positions: HashMap<NodeId, usize> = HashMap::new();

        for option in document.options(select)? {
            let leaf = LeafEntry {
                id: self.identities.id_of(document, option, true)?,
                text: document.text(option)?.to_string(),
                value: document.option_value(option)?,
                selected: document.is_selected(option)?,
                disabled: document.is_disabled(option),
                hidden: document.is_hidden(option),
            };

            let group = document
                .parent(option)?
                .filter(|&parent| document.is_element(parent, "optgroup"));
            let Some(group) = group else {
                entries.push(Entry::Leaf(leaf));
                continue;
            };

            let position = match group_positions.get(&group) {
                Some(&position) => position,
                None => {
                    let entry = GroupEntry {
                        id: self.identities.id_of(document, group, true)?,
                        label: document.attribute(group, "label")?.unwrap_or_default().to_string(),
                        children: Vec::new(),
                    };
                    entries.push(Entry::Group(entry));
                    group_positions.insert(group, entries.len() - 1);
                    entries.len() - 1
                }
            };
            if let Entry::Group(entry) = &mut entries[position] {
                entry.children.push(leaf);
            }
        }

        tracing::trace!(target: "dual_multi_select::projection", entries = entries.len(), "projected native control");
        Ok(entries)
    }

    /// The current model in the public shape.
    pub fn external(&self, document: &mut Document, select: NodeId) -> Result<Vec<ExternalEntry>> {
        Ok(to_external(&self.project(document, select)?))
    }

    /// Replace the native control's content, then raise a bubbling change on
    /// it so listeners pick up the new state.
    #[tracing::instrument(skip(self, page, entries), target = "dual_multi_select::projection", level = "debug")]
    pub fn apply(&self, page: &Page, select: NodeId, entries: &[ExternalEntry]) -> Result<()> {
        {
            let mut document = page.document();
            document.clear_children(select)?;
            for entry in entries {
                match entry {
                    ExternalEntry::Leaf(leaf) => {
                        let option = create_option(&mut document, leaf)?;
                        document.append_child(select, option)?;
                    }
                    ExternalEntry::Group(group) => {
                        let optgroup = document.create_element("optgroup");
                        document.set_attribute(optgroup, "label", group.label.as_str())?;
                        for leaf in &group.children {
                            let option = create_option(&mut document, leaf)?;
                            document.append_child(optgroup, option)?;
                        }
                        document.append_child(select, optgroup)?;
                    }
                }
            }
        }

        tracing::debug!(target: "dual_multi_select::projection", entries = entries.len(), "applied data to native control");
        page.dispatch_event(DomEvent::change(select))?;
        Ok(())
    }
}

fn create_option(document: &mut Document, leaf: &LeafData) -> Result<NodeId> {
    let option = document.create_element("option");
    document.set_text(option, leaf.text.as_str())?;
    if let Some(value) = &leaf.value {
        document.set_attribute(option, "value", value.as_str())?;
        document.set_value(option, Some(value.clone()))?;
    }
    document.set_selected(option, leaf.selected)?;
    document.toggle_attribute(option, "disabled", leaf.disabled)?;
    document.toggle_attribute(option, "hidden", leaf.hidden)?;
    Ok(option)
}
