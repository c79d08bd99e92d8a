//! Logging and debugging facilities.
//!
//! This module provides:
//! - Target and span names used with the `tracing` crate
//! - Debug visualization for document trees
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! The library only emits events; install a subscriber in your application to
//! see them:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("dual_multi_select=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use dual_multi_select_core::{Document, DocumentTreeDebug};
//!
//! let mut doc = Document::new();
//! let list = doc.create_element("ul");
//! let root = doc.root();
//! doc.append_child(root, list).unwrap();
//!
//! let output = DocumentTreeDebug::new().format_subtree(&doc, root).unwrap();
//! assert!(output.contains("ul"));
//! ```

use crate::document::{Document, NodeId};
use crate::error::DomResult;

/// Span names used for tracing.
pub mod span_names {
    /// Synchronization pass span.
    pub const SYNC_PASS: &str = "dual_multi_select::sync_pass";
    /// Click handling span.
    pub const CLICK: &str = "dual_multi_select::click";
    /// Search filter span.
    pub const FILTER: &str = "dual_multi_select::filter";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "dual_multi_select_core";
    /// Document tree target.
    pub const DOCUMENT: &str = "dual_multi_select_core::document";
    /// Event dispatch target.
    pub const EVENT: &str = "dual_multi_select_core::event";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "dual_multi_select_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "dual_multi_select_core::timer";
}

/// Debug utility for visualizing document trees.
///
/// Each line shows a node's tag, its classes, its ID and its own text, with
/// box-drawing branches for the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    /// Maximum depth to traverse (None for unlimited).
    max_depth: Option<usize>,
}

impl DocumentTreeDebug {
    /// Create a debug visualizer that prints the whole subtree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop descending below `depth`.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Format a subtree starting from a specific node.
    pub fn format_subtree(&self, document: &Document, root: NodeId) -> DomResult<String> {
        let mut output = String::new();
        self.format_subtree_into(document, root, 0, "", None, &mut output)?;
        Ok(output)
    }

    /// `is_last` is `None` for the subtree root, which gets no branch.
    fn format_subtree_into(
        &self,
        document: &Document,
        id: NodeId,
        depth: usize,
        indent: &str,
        is_last: Option<bool>,
        output: &mut String,
    ) -> DomResult<()> {
        if self.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let child_indent = match is_last {
            None => String::new(),
            Some(last) => {
                output.push_str(indent);
                output.push_str(if last { "\u{2514}\u{2500} " } else { "\u{251c}\u{2500} " });
                format!("{indent}{}", if last { "   " } else { "\u{2502}  " })
            }
        };

        let mut line = document.tag(id)?.to_string();
        for class in document.classes(id)? {
            line.push('.');
            line.push_str(class);
        }
        line.push_str(&format!(" [{id:?}]"));
        let text = document.text(id)?;
        if !text.is_empty() {
            line.push_str(&format!(" {text:?}"));
        }
        output.push_str(&line);
        output.push('\n');

        let children = document.children(id)?;
        for (i, &child) in children.iter().enumerate() {
            let is_last = Some(i + 1 == children.len());
            self.format_subtree_into(document, child, depth + 1, &child_indent, is_last, output)?;
        }
        Ok(())
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "dual_multi_select::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new();
        let list = doc.create_element("ul");
        doc.add_class(list, "dms-list").unwrap();
        let item = doc.create_element("li");
        doc.set_text(item, "Apple").unwrap();
        let root = doc.root();
        doc.append_child(root, list).unwrap();
        doc.append_child(list, item).unwrap();
        (doc, root)
    }

    #[test]
    fn test_tree_format_hierarchy() {
        let (doc, root) = sample();
        let output = DocumentTreeDebug::new().format_subtree(&doc, root).unwrap();

        assert!(output.starts_with("body"));
        assert!(output.contains("ul.dms-list"));
        assert!(output.contains("\"Apple\""));
        assert!(output.contains('\u{2514}'));
    }

    #[test]
    fn test_tree_format_max_depth() {
        let (doc, root) = sample();
        let output = DocumentTreeDebug::new().with_max_depth(1).format_subtree(&doc, root).unwrap();

        assert!(output.contains("\u{2514}\u{2500} ul.dms-list"));
        assert_eq!(output.lines().count(), 2);
        assert!(!output.contains("Apple"));
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
