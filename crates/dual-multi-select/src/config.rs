//! Widget configuration.
//!
//! Options are built in code with the `with_*` methods or loaded from the
//! JSON object used by page scripts:
//!
//! ```
//! use dual_multi_select::DualListOptions;
//!
//! let options = DualListOptions::from_json(
//!     r#"{"searchBar": true, "selectedHeader": "Chosen", "searchDebounceMs": 150}"#,
//! )
//! .unwrap();
//! assert!(options.search_bar);
//! assert_eq!(options.search_debounce.as_millis(), 150);
//! ```

use std::time::Duration;

use dual_multi_select_core::{Document, NodeId};
use serde::Deserialize;

use crate::error::{DualListError, Result};
use crate::model::ExternalEntry;

/// Default delay between the last keystroke in the search bar and filtering.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(1);

/// Static content for a pane header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderContent {
    /// Plain text, rendered in a `div.dms-header`.
    Text(String),
    /// A caller-owned element, inserted as-is and handed back on destroy.
    Element(NodeId),
}

impl From<&str> for HeaderContent {
    fn from(text: &str) -> Self {
        HeaderContent::Text(text.to_string())
    }
}

impl From<String> for HeaderContent {
    fn from(text: String) -> Self {
        HeaderContent::Text(text)
    }
}

impl From<NodeId> for HeaderContent {
    fn from(node: NodeId) -> Self {
        HeaderContent::Element(node)
    }
}

/// Configuration for [`DualMultiSelect`](crate::DualMultiSelect).
#[derive(Debug, Clone, PartialEq)]
pub struct DualListOptions {
    /// Initial content, replacing whatever the select holds.
    pub data: Option<Vec<ExternalEntry>>,
    /// Stack the panes vertically instead of side by side.
    pub stack_lists: bool,
    /// Pin headers while the lists scroll.
    pub sticky_headers: bool,
    /// Whether clicking a group label moves all its visible options.
    pub selectable_option_groups: bool,
    /// Show a search input in the selectable pane.
    pub search_bar: bool,
    pub selectable_header: Option<HeaderContent>,
    pub selected_header: Option<HeaderContent>,
    /// Debounce window of the search input.
    pub search_debounce: Duration,
}

impl Default for DualListOptions {
    fn default() -> Self {
        Self {
            data: None,
            stack_lists: false,
            sticky_headers: false,
            selectable_option_groups: true,
            search_bar: false,
            selectable_header: None,
            selected_header: None,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl DualListOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial content.
    pub fn with_data(mut self, data: Vec<ExternalEntry>) -> Self {
        self.data = Some(data);
        self
    }

    /// Set whether the panes are stacked.
    pub fn with_stack_lists(mut self, stack_lists: bool) -> Self {
        self.stack_lists = stack_lists;
        self
    }

    /// Set whether headers are sticky.
    pub fn with_sticky_headers(mut self, sticky_headers: bool) -> Self {
        self.sticky_headers = sticky_headers;
        self
    }

    /// Set whether group labels are clickable.
    pub fn with_selectable_option_groups(mut self, enabled: bool) -> Self {
        self.selectable_option_groups = enabled;
        self
    }

    /// Set whether the search bar is shown.
    pub fn with_search_bar(mut self, search_bar: bool) -> Self {
        self.search_bar = search_bar;
        self
    }

    /// Set the selectable pane's header.
    pub fn with_selectable_header(mut self, header: impl Into<HeaderContent>) -> Self {
        self.selectable_header = Some(header.into());
        self
    }

    /// Set the selected pane's header.
    pub fn with_selected_header(mut self, header: impl Into<HeaderContent>) -> Self {
        self.selected_header = Some(header.into());
        self
    }

    /// Set the search debounce window.
    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    /// Whether the headers decorator has anything to do.
    pub fn wants_headers(&self) -> bool {
        self.search_bar || self.selectable_header.is_some() || self.selected_header.is_some()
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Convert options from a JSON value.
    ///
    /// Headers must be strings or `null`. Unknown keys are ignored.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawOptions = serde_json::from_value(value)?;
        let defaults = Self::default();
        Ok(Self {
            data: raw.data,
            stack_lists: raw.stack_lists.unwrap_or(defaults.stack_lists),
            sticky_headers: raw.sticky_headers.unwrap_or(defaults.sticky_headers),
            selectable_option_groups: raw
                .selectable_option_groups
                .unwrap_or(defaults.selectable_option_groups),
            search_bar: raw.search_bar.unwrap_or(defaults.search_bar),
            selectable_header: header_from_json(raw.selectable_header)?,
            selected_header: header_from_json(raw.selected_header)?,
            search_debounce: raw
                .search_debounce_ms
                .map_or(defaults.search_debounce, Duration::from_millis),
        })
    }

    /// Check the options against each other and against `document`.
    ///
    /// Runs before anything is attached, so a rejected configuration leaves
    /// no trace in the document.
    pub fn validate(&self, document: &Document) -> Result<()> {
        if self.search_bar && self.selectable_header.is_some() {
            return Err(DualListError::ConflictingConfiguration(
                "the selectable pane cannot have both a header and a search bar".to_string(),
            ));
        }
        for header in [&self.selectable_header, &self.selected_header].into_iter().flatten() {
            if let HeaderContent::Element(node) = header {
                if !document.contains(*node) {
                    return Err(DualListError::invalid_header(format!("{node:?} is not a live element")));
                }
            }
        }
        Ok(())
    }
}

/// Options as they appear in JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    data: Option<Vec<ExternalEntry>>,
    stack_lists: Option<bool>,
    sticky_headers: Option<bool>,
    selectable_option_groups: Option<bool>,
    search_bar: Option<bool>,
    selectable_header: Option<serde_json::Value>,
    selected_header: Option<serde_json::Value>,
    search_debounce_ms: Option<u64>,
}

fn header_from_json(value: Option<serde_json::Value>) -> Result<Option<HeaderContent>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) => Ok(Some(HeaderContent::Text(text))),
        Some(other) => Err(DualListError::invalid_header(other.to_string())),
    }
}
