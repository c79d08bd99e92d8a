//! Stable identities for native option and optgroup nodes.
//!
//! Every native node the widget observes gets a marker attribute holding a
//! per-instance sequence number. Rendered list items carry the same marker,
//! which is how a click on a rendered item finds its way back to the native
//! option.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use dual_multi_select_core::{Document, NodeId};

use crate::error::{DualListError, Result};

/// Attribute linking rendered items to native nodes.
pub const INTERNAL_ID_ATTRIBUTE: &str = "data-dms-internal-id";

/// Opaque identifier correlating a rendered item with its native node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(u64);

impl Identity {
    /// The raw sequence number.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identity {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Hands out identities for one widget instance.
///
/// The counter only moves forward: an identity is never reused, not even
/// after its node has been removed.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    next: AtomicU64,
}

impl IdentityRegistry {
    /// Create a registry whose first identity is `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity of `node`, assigning the next one if it has none and
    /// `auto_create` is set.
    pub fn id_of(&self, document: &mut Document, node: NodeId, auto_create: bool) -> Result<Identity> {
        if let Some(identity) = Self::marker(document, node)? {
            return Ok(identity);
        }
        if !auto_create {
            return Err(DualListError::MissingIdentity { node });
        }

        let identity = Identity(self.next.fetch_add(1, Ordering::SeqCst));
        document.set_attribute(node, INTERNAL_ID_ATTRIBUTE, identity.to_string())?;
        tracing::trace!(target: "dual_multi_select::identity", ?node, %identity, "assigned identity");
        Ok(identity)
    }

    /// The identity a node already carries.
    pub fn read(document: &Document, node: NodeId) -> Result<Identity> {
        Self::marker(document, node)?.ok_or(DualListError::MissingIdentity { node })
    }

    /// How many identities have been handed out.
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Parse the marker. A marker that does not parse counts as missing.
    fn marker(document: &Document, node: NodeId) -> Result<Option<Identity>> {
        Ok(document
            .attribute(node, INTERNAL_ID_ATTRIBUTE)?
            .and_then(|raw| raw.parse().ok()))
    }

    /// Map every marked option and optgroup below `select` to its node.
    pub fn index(document: &Document, select: NodeId) -> Result<HashMap<Identity, NodeId>> {
        let mut index = HashMap::new();
        for node in document.descendants(select)? {
            if !(document.is_element(node, "option") || document.is_element(node, "optgroup")) {
                continue;
            }
            if let Some(identity) = Self::marker(document, node)? {
                index.insert(identity, node);
            }
        }
        Ok(index)
    }
}
