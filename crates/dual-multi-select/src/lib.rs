//! Dual Multi Select - a two-pane picker for `select[multiple]` elements.
//!
//! One pane lists the options that can be picked, the other the options
//! that are picked, and clicking an item moves it across. The native select
//! remains the single source of truth, so form submission and existing
//! change listeners keep working.
//!
//! The widget runs a closed loop:
//!
//! 1. [`projection`] reads the select into a model of [`Entry`] values
//! 2. [`render`] draws both panes from that model
//! 3. [`interaction`] turns clicks into selection changes on the select
//! 4. [`sync`] re-runs steps 1 and 2 on every change event
//!
//! [`DualMultiSelect`] wires these together.
//!
//! # Example
//!
//! ```
//! use dual_multi_select::{DualListOptions, DualMultiSelect};
//! use dual_multi_select_core::Page;
//!
//! let page = Page::new();
//! let select = {
//!     let mut doc = page.document();
//!     let select = doc.create_element("select");
//!     doc.toggle_attribute(select, "multiple", true).unwrap();
//!     for text in ["Apple", "Banana"] {
//!         let option = doc.create_element("option");
//!         doc.set_text(option, text).unwrap();
//!         doc.append_child(select, option).unwrap();
//!     }
//!     let root = doc.root();
//!     doc.append_child(root, select).unwrap();
//!     select
//! };
//!
//! let widget = DualMultiSelect::new(&page, select, DualListOptions::new()).unwrap();
//! widget.errors().connect(|err| eprintln!("dual multi select: {err}"));
//! ```

pub mod classes;
mod config;
mod error;
pub mod headers;
pub mod identity;
pub mod interaction;
pub mod model;
pub mod prelude;
pub mod projection;
pub mod render;
pub mod skeleton;
pub mod sync;
mod widget;

pub use config::{DEFAULT_SEARCH_DEBOUNCE, DualListOptions, HeaderContent};
pub use error::{DualListError, Result};
pub use identity::{INTERNAL_ID_ATTRIBUTE, Identity, IdentityRegistry};
pub use interaction::{ClickContext, ClickOutcome, handle_click};
pub use model::{Entry, ExternalEntry, GroupData, GroupEntry, LeafData, LeafEntry};
pub use projection::DataProjection;
pub use render::{Pane, RenderedLists};
pub use sync::{SyncController, SyncState};
pub use widget::{DualMultiSelect, validate_target};
