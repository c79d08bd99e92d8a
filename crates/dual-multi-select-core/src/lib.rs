//! Core systems for Dual Multi Select.
//!
//! This crate provides the host-side building blocks the widget runs on:
//!
//! - **Document**: An arena-backed element tree with attributes, classes,
//!   inline style, form state, focus and scroll offsets
//! - **Events**: Click/change/input events with per-node listeners and bubbling
//! - **Signal/Slot System**: Type-safe notification between components
//! - **Timers**: One-shot timers driven by the page
//! - **Page**: The shared context tying the above together
//!
//! # Signal/Slot Example
//!
//! ```
//! use dual_multi_select_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Document Example
//!
//! ```
//! use dual_multi_select_core::{DomEvent, Page};
//!
//! let page = Page::new();
//! let select = {
//!     let mut doc = page.document();
//!     let select = doc.create_element("select");
//!     doc.toggle_attribute(select, "multiple", true).unwrap();
//!     let option = doc.create_element("option");
//!     doc.set_text(option, "Apple").unwrap();
//!     doc.append_child(select, option).unwrap();
//!     let root = doc.root();
//!     doc.append_child(root, select).unwrap();
//!     select
//! };
//!
//! // Programmatic changes are announced with a bubbling change event.
//! page.dispatch_event(DomEvent::change(select)).unwrap();
//! ```

mod error;
pub mod document;
pub mod event;
pub mod logging;
pub mod page;
pub mod signal;
pub mod timer;

pub use document::{Document, NodeId};
pub use error::{CoreError, DomError, DomResult, Result, SignalError, TimerError};
pub use event::{DomEvent, EventKind, EventListeners, ListenerId};
pub use logging::{DocumentTreeDebug, PerfSpan};
pub use page::Page;
pub use signal::{ConnectionId, Signal};
pub use timer::{TimerCallback, TimerId, TimerManager};
