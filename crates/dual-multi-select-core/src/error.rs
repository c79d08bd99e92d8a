//! Error types for the Dual Multi Select core.

use std::fmt;

/// The umbrella error type for core operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Document-related error.
    Document(DomError),
    /// Timer-related error.
    Timer(TimerError),
    /// Signal-related error.
    Signal(SignalError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(err) => write!(f, "Document error: {err}"),
            Self::Timer(err) => write!(f, "Timer error: {err}"),
            Self::Signal(err) => write!(f, "Signal error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Document(err) => Some(err),
            Self::Timer(err) => Some(err),
            Self::Signal(err) => Some(err),
        }
    }
}

/// Errors that can occur while reading or mutating the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node ID is invalid or the node has been removed.
    InvalidNode,
    /// The requested insertion would make a node its own ancestor, or would
    /// move the document root.
    HierarchyRequest,
    /// The operation needs a parent but the node is detached.
    Detached,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNode => write!(f, "Invalid or removed node ID"),
            Self::HierarchyRequest => {
                write!(f, "Cannot insert a node into itself or one of its descendants")
            }
            Self::Detached => write!(f, "Node is not attached to a parent"),
        }
    }
}

impl std::error::Error for DomError {}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The timer ID is invalid, has fired (one-shot) or has been stopped.
    InvalidTimerId,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimerId => write!(f, "Invalid or expired timer ID"),
        }
    }
}

impl std::error::Error for TimerError {}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    InvalidConnection,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConnection => write!(f, "Invalid or disconnected connection ID"),
        }
    }
}

impl std::error::Error for SignalError {}

impl From<DomError> for CoreError {
    fn from(err: DomError) -> Self {
        Self::Document(err)
    }
}

impl From<TimerError> for CoreError {
    fn from(err: TimerError) -> Self {
        Self::Timer(err)
    }
}

impl From<SignalError> for CoreError {
    fn from(err: SignalError) -> Self {
        Self::Signal(err)
    }
}

/// Result type for document operations.
pub type DomResult<T> = std::result::Result<T, DomError>;

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
