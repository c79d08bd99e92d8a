//! The normalized data model and its public, unkeyed counterpart.
//!
//! [`Entry`] is what the widget works with internally: every leaf and group
//! carries the [`Identity`] of the native node it was projected from.
//! [`ExternalEntry`] is the shape exchanged with callers. It has no
//! identities and serializes to the JSON objects `{label, children}` and
//! `{text, value?, selected?, disabled?, hidden?}`.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// A single option as seen by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafEntry {
    pub id: Identity,
    pub text: String,
    pub value: String,
    pub selected: bool,
    pub disabled: bool,
    /// Set by filtering. Hidden leaves are not rendered.
    pub hidden: bool,
}

/// An option group with its (non-nested) options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub id: Identity,
    pub label: String,
    pub children: Vec<LeafEntry>,
}

/// An entry of the normalized model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Leaf(LeafEntry),
    Group(GroupEntry),
}

impl Entry {
    /// The leaves of this entry: itself, or a group's children.
    pub fn leaves(&self) -> &[LeafEntry] {
        match self {
            Entry::Leaf(leaf) => std::slice::from_ref(leaf),
            Entry::Group(group) => &group.children,
        }
    }

    /// Convert to the public shape, dropping identities.
    pub fn to_external(&self) -> ExternalEntry {
        match self {
            Entry::Leaf(leaf) => ExternalEntry::Leaf(LeafData::from(leaf)),
            Entry::Group(group) => ExternalEntry::Group(GroupData {
                label: group.label.clone(),
                children: group.children.iter().map(LeafData::from).collect(),
            }),
        }
    }
}

/// Convert a whole model to the public shape.
pub fn to_external(entries: &[Entry]) -> Vec<ExternalEntry> {
    entries.iter().map(Entry::to_external).collect()
}

/// Every identity in a model, groups expanded, in document order.
pub fn flattened_ids(entries: &[Entry]) -> Vec<Identity> {
    let mut ids = Vec::new();
    for entry in entries {
        if let Entry::Group(group) = entry {
            ids.push(group.id);
        }
        ids.extend(entry.leaves().iter().map(|leaf| leaf.id));
    }
    ids
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A leaf in the public shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeafData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

impl LeafData {
    /// A plain, unselected, enabled leaf.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set an explicit value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Mark as selected.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Mark as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Mark as hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

impl From<&LeafEntry> for LeafData {
    fn from(leaf: &LeafEntry) -> Self {
        Self {
            text: leaf.text.clone(),
            value: Some(leaf.value.clone()),
            selected: leaf.selected,
            disabled: leaf.disabled,
            hidden: leaf.hidden,
        }
    }
}

/// A group in the public shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupData {
    pub label: String,
    #[serde(default)]
    pub children: Vec<LeafData>,
}

impl GroupData {
    /// Create a group.
    pub fn new(label: impl Into<String>, children: Vec<LeafData>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

/// An entry in the public shape.
///
/// Groups are told apart from leaves by their `label` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalEntry {
    Group(GroupData),
    Leaf(LeafData),
}

impl ExternalEntry {
    /// Shorthand for a plain leaf.
    pub fn leaf(text: impl Into<String>) -> Self {
        ExternalEntry::Leaf(LeafData::new(text))
    }

    /// The leaves of this entry: itself, or a group's children.
    pub fn leaves(&self) -> &[LeafData] {
        match self {
            ExternalEntry::Leaf(leaf) => std::slice::from_ref(leaf),
            ExternalEntry::Group(group) => &group.children,
        }
    }

    /// Mutable access to the leaves of this entry.
    pub fn leaves_mut(&mut self) -> &mut [LeafData] {
        match self {
            ExternalEntry::Leaf(leaf) => std::slice::from_mut(leaf),
            ExternalEntry::Group(group) => &mut group.children,
        }
    }
}

impl From<LeafData> for ExternalEntry {
    fn from(leaf: LeafData) -> Self {
        ExternalEntry::Leaf(leaf)
    }
}

impl From<GroupData> for ExternalEntry {
    fn from(group: GroupData) -> Self {
        ExternalEntry::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: u64, text: &str) -> LeafEntry {
        LeafEntry {
            id: text_id(id),
            text: text.to_string(),
            value: text.to_lowercase(),
            selected: false,
            disabled: false,
            hidden: false,
        }
    }

    fn text_id(raw: u64) -> Identity {
        raw.to_string().parse().unwrap()
    }

    #[test]
    fn test_external_conversion_drops_identity() {
        let mut banana = leaf(2, "Banana");
        banana.selected = true;
        let entries = vec![
            Entry::Leaf(leaf(0, "Apple")),
            Entry::Group(GroupEntry {
                id: text_id(1),
                label: "Yellow".to_string(),
                children: vec![banana],
            }),
        ];

        let external = to_external(&entries);

        assert_eq!(
            external,
            vec![
                ExternalEntry::Leaf(LeafData::new("Apple").with_value("apple")),
                ExternalEntry::Group(GroupData::new(
                    "Yellow",
                    vec![LeafData::new("Banana").with_value("banana").selected()],
                )),
            ]
        );
    }

    #[test]
    fn test_flattened_ids_expand_groups() {
        let entries = vec![
            Entry::Group(GroupEntry {
                id: text_id(1),
                label: "G".to_string(),
                children: vec![leaf(0, "A"), leaf(3, "B")],
            }),
            Entry::Leaf(leaf(2, "C")),
        ];

        let ids: Vec<u64> = flattened_ids(&entries).into_iter().map(Identity::as_raw).collect();
        assert_eq!(ids, vec![1, 0, 3, 2]);
    }

    #[test]
    fn test_json_shape_omits_defaults() {
        let entries = vec![
            ExternalEntry::leaf("Apple"),
            ExternalEntry::Group(GroupData::new(
                "Fruit",
                vec![LeafData::new("Kiwi").disabled()],
            )),
        ];

        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(
            json,
            r#"[{"text":"Apple"},{"label":"Fruit","children":[{"text":"Kiwi","disabled":true}]}]"#
        );
    }

    #[test]
    fn test_json_discriminates_by_label() {
        let parsed: Vec<ExternalEntry> = serde_json::from_str(
            r#"[{"label":"Empty"},{"text":"A","value":"a","selected":true}]"#,
        )
        .unwrap();

        assert_eq!(parsed[0], ExternalEntry::Group(GroupData::new("Empty", vec![])));
        assert_eq!(parsed[1], ExternalEntry::from(LeafData::new("A").with_value("a").selected()));
    }

    #[test]
    fn test_leaves_mut_reaches_group_children() {
        let mut entry: ExternalEntry =
            GroupData::new("G", vec![LeafData::new("A"), LeafData::new("B")]).into();

        for leaf in entry.leaves_mut() {
            leaf.hidden = true;
        }

        assert!(entry.leaves().iter().all(|leaf| leaf.hidden));
    }
}
