//! Error types for the dual multi select widget.

use dual_multi_select_core::{DomError, NodeId};

use crate::identity::Identity;

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, DualListError>;

/// Errors raised by the widget.
///
/// Every error is reported synchronously where it is detected. Errors that
/// surface inside an event listener are logged and published on
/// [`DualMultiSelect::errors`](crate::DualMultiSelect::errors) instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DualListError {
    /// The bound node is missing or is not a `select` element.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The bound `select` lacks the `multiple` attribute.
    #[error("The select element does not support multiple selections")]
    NotMultiple,

    /// A node was expected to carry an internal id but does not.
    #[error("Node {node:?} does not carry an internal id")]
    MissingIdentity { node: NodeId },

    /// A rendered item's id no longer resolves to a native option.
    #[error("Rendered item {0} does not resolve to an option of the select element")]
    OrphanedReference(Identity),

    /// A header value is neither text nor an element.
    #[error("Header content is neither text nor an element: {0}")]
    InvalidHeaderContent(String),

    /// Options that cannot be combined were requested together.
    #[error("Conflicting configuration: {0}")]
    ConflictingConfiguration(String),

    /// Options could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The document rejected an operation.
    #[error("Document error: {0}")]
    Document(#[from] DomError),
}

impl DualListError {
    /// Create an invalid target error.
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget(reason.into())
    }

    /// Create an invalid header content error.
    pub fn invalid_header(description: impl Into<String>) -> Self {
        Self::InvalidHeaderContent(description.into())
    }
}

impl From<serde_json::Error> for DualListError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}
