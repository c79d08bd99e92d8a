//! Prelude module for Dual Multi Select.
//!
//! ```ignore
//! use dual_multi_select::prelude::*;
//! ```
//!
//! This provides access to:
//! - The widget and its options (`DualMultiSelect`, `DualListOptions`)
//! - The public data shape (`ExternalEntry`, `LeafData`, `GroupData`)
//! - The host page and events (`Page`, `DomEvent`, `EventKind`)

// ============================================================================
// Widget
// ============================================================================

pub use crate::{DualListError, DualListOptions, DualMultiSelect, HeaderContent};

// ============================================================================
// Data
// ============================================================================

pub use crate::{ExternalEntry, GroupData, LeafData};

// ============================================================================
// Host page
// ============================================================================

pub use dual_multi_select_core::{Document, DomEvent, EventKind, NodeId, Page, Signal};
