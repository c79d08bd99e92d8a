//! Pane headers and the search bar.
//!
//! The decorator never touches the rendered lists. Filtering goes through
//! [`DataAccessors`]: read the data, flag leaves as hidden, write it back.
//! Writing raises a change event on the select, and the regular
//! synchronization pass renders the result.

use std::sync::Arc;
use std::time::Duration;

use dual_multi_select_core::logging::span_names;
use dual_multi_select_core::{Document, EventKind, ListenerId, NodeId, Page, PerfSpan, Signal, TimerId};
use parking_lot::Mutex;

use crate::classes;
use crate::config::HeaderContent;
use crate::error::{DualListError, Result};
use crate::model::ExternalEntry;
use crate::render::{Pane, pane_element};

/// Placeholder text of the search input.
pub const SEARCH_PLACEHOLDER: &str = "Search";

/// Reads the current data in the public shape.
pub type DataGetter = Arc<dyn Fn() -> Result<Vec<ExternalEntry>> + Send + Sync>;
/// Replaces the data and triggers synchronization.
pub type DataSetter = Arc<dyn Fn(&[ExternalEntry]) -> Result<()> + Send + Sync>;

/// The decorator's only access to widget data.
#[derive(Clone)]
pub struct DataAccessors {
    pub get: DataGetter,
    pub set: DataSetter,
}

/// What the decorator should put up.
#[derive(Debug, Clone, Default)]
pub struct HeaderSettings {
    pub selectable_header: Option<HeaderContent>,
    pub selected_header: Option<HeaderContent>,
    pub search_bar: bool,
    pub search_debounce: Duration,
}

struct SearchBar {
    input: NodeId,
    listener: ListenerId,
    pending: Arc<Mutex<Option<TimerId>>>,
}

/// Static headers and the debounced search filter.
pub struct CustomHeaders {
    search: Option<SearchBar>,
    /// Caller-owned header elements, detached again on destroy.
    borrowed: Vec<NodeId>,
}

static_assertions::assert_impl_all!(CustomHeaders: Send, Sync);

impl CustomHeaders {
    /// Insert the configured headers and search bar into the panes of
    /// `container`.
    pub fn start(
        page: &Arc<Page>,
        container: NodeId,
        settings: HeaderSettings,
        accessors: DataAccessors,
        errors: Arc<Signal<DualListError>>,
    ) -> Result<Self> {
        let mut borrowed = Vec::new();
        let input = {
            let mut document = page.document();
            match insert_all(&mut document, container, &settings, &mut borrowed) {
                Ok(input) => input,
                Err(err) => {
                    // Caller-owned elements must survive removal of the container.
                    if let Err(cleanup) = detach_borrowed(&mut document, &borrowed) {
                        tracing::warn!(target: "dual_multi_select::headers", error = %cleanup, "failed to release header elements");
                    }
                    return Err(err);
                }
            }
        };

        let search = input.map(|input| {
            let pending = Arc::new(Mutex::new(None));
            let listener = listen_for_input(page, input, settings.search_debounce, pending.clone(), accessors, errors);
            SearchBar {
                input,
                listener,
                pending,
            }
        });

        tracing::debug!(target: "dual_multi_select::headers", search_bar = search.is_some(), "headers started");
        Ok(Self { search, borrowed })
    }

    /// The search input, if one was requested.
    pub fn search_input(&self) -> Option<NodeId> {
        self.search.as_ref().map(|search| search.input)
    }

    /// Stop listening, cancel any pending filter and hand caller-owned
    /// header elements back by detaching them.
    pub fn destroy(self, page: &Page) -> Result<()> {
        if let Some(search) = self.search {
            if page.remove_event_listener(search.listener).is_err() {
                tracing::debug!(target: "dual_multi_select::headers", "input listener already gone");
            }
            if let Some(timer) = search.pending.lock().take() {
                if page.stop_timer(timer).is_ok() {
                    tracing::debug!(target: "dual_multi_select::headers", "cancelled pending search filter");
                }
            }
        }

        detach_borrowed(&mut page.document(), &self.borrowed)
    }
}

/// Insert the headers and, if requested, the search input. Caller-owned
/// elements are recorded in `borrowed` as soon as they are inserted.
fn insert_all(
    document: &mut Document,
    container: NodeId,
    settings: &HeaderSettings,
    borrowed: &mut Vec<NodeId>,
) -> Result<Option<NodeId>> {
    for (pane, header) in [
        (Pane::Selectable, &settings.selectable_header),
        (Pane::Selected, &settings.selected_header),
    ] {
        if let Some(header) = header {
            let node = insert_header(document, container, pane, header)?;
            if matches!(header, HeaderContent::Element(_)) {
                borrowed.push(node);
            }
        }
    }

    if !settings.search_bar {
        return Ok(None);
    }
    let input = document.create_element("input");
    document.add_class(input, classes::SEARCH)?;
    document.set_attribute(input, "type", "search")?;
    document.set_attribute(input, "placeholder", SEARCH_PLACEHOLDER)?;
    let pane = pane_element(document, container, Pane::Selectable)?;
    document.prepend_child(pane, input)?;
    Ok(Some(input))
}

fn detach_borrowed(document: &mut Document, borrowed: &[NodeId]) -> Result<()> {
    for &node in borrowed {
        if document.contains(node) {
            document.detach(node)?;
        }
    }
    Ok(())
}

fn insert_header(document: &mut Document, container: NodeId, pane: Pane, header: &HeaderContent) -> Result<NodeId> {
    let node = match header {
        HeaderContent::Text(text) => {
            let node = document.create_element("div");
            document.add_class(node, classes::HEADER)?;
            document.set_text(node, text.as_str())?;
            node
        }
        HeaderContent::Element(node) => {
            if !document.contains(*node) {
                return Err(DualListError::invalid_header(format!("{node:?} is not a live element")));
            }
            *node
        }
    };
    let pane = pane_element(document, container, pane)?;
    document.prepend_child(pane, node)?;
    Ok(node)
}

/// Each input cancels the pending filter and schedules a new one, so only
/// the latest query is ever applied.
fn listen_for_input(
    page: &Arc<Page>,
    input: NodeId,
    debounce: Duration,
    pending: Arc<Mutex<Option<TimerId>>>,
    accessors: DataAccessors,
    errors: Arc<Signal<DualListError>>,
) -> ListenerId {
    let weak_page = Arc::downgrade(page);
    page.add_event_listener(input, EventKind::Input, move |_| {
        let Some(page) = weak_page.upgrade() else {
            return;
        };

        let mut pending = pending.lock();
        if let Some(timer) = pending.take() {
            if page.stop_timer(timer).is_ok() {
                tracing::trace!(target: "dual_multi_select::headers", "rescheduled search filter");
            }
        }

        let timer_page = Arc::downgrade(&page);
        let accessors = accessors.clone();
        let errors = errors.clone();
        *pending = Some(page.start_timer(debounce, move || {
            let Some(page) = timer_page.upgrade() else {
                return;
            };
            let query = page.document().value(input).ok().flatten().unwrap_or_default().to_string();
            if let Err(err) = apply_filter(&accessors, &query) {
                tracing::error!(target: "dual_multi_select::headers", error = %err, "search filter failed");
                errors.emit(err);
            }
        }));
    })
}

/// Flag every leaf that does not match `query` as hidden and write the data
/// back.
fn apply_filter(accessors: &DataAccessors, query: &str) -> Result<()> {
    let _span = PerfSpan::new(span_names::FILTER);
    let mut data = (accessors.get)()?;
    let query = query.to_lowercase();

    for entry in &mut data {
        let label_matches = match entry {
            ExternalEntry::Group(group) => matches_query(&query, &group.label),
            ExternalEntry::Leaf(_) => false,
        };
        for leaf in entry.leaves_mut() {
            leaf.hidden = !(label_matches || matches_query(&query, &leaf.text));
        }
    }

    tracing::debug!(target: "dual_multi_select::headers", query, "applying search filter");
    (accessors.set)(&data)
}

/// Case-insensitive substring match. `query` must already be lowercase.
fn matches_query(query: &str, text: &str) -> bool {
    query.is_empty() || text.to_lowercase().contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupData, LeafData};
    use crate::render::live_list;
    use crate::skeleton::Skeleton;
    use dual_multi_select_core::DomEvent;
    use std::time::Instant;

    struct Fixture {
        page: Arc<Page>,
        container: NodeId,
        data: Arc<Mutex<Vec<ExternalEntry>>>,
        writes: Arc<Mutex<usize>>,
    }

    fn fixture(data: Vec<ExternalEntry>) -> (Fixture, DataAccessors) {
        let page = Page::new();
        let container = {
            let mut doc = page.document();
            let select = doc.create_element("select");
            let root = doc.root();
            doc.append_child(root, select).unwrap();
            Skeleton::build(&mut doc, select, false, false).unwrap().container()
        };
        let data = Arc::new(Mutex::new(data));
        let writes = Arc::new(Mutex::new(0));

        let read = data.clone();
        let write = data.clone();
        let count = writes.clone();
        let accessors = DataAccessors {
            get: Arc::new(move || -> Result<Vec<ExternalEntry>> { Ok(read.lock().clone()) }),
            set: Arc::new(move |entries: &[ExternalEntry]| -> Result<()> {
                *write.lock() = entries.to_vec();
                *count.lock() += 1;
                Ok(())
            }),
        };
        (
            Fixture {
                page,
                container,
                data,
                writes,
            },
            accessors,
        )
    }

    fn search_settings() -> HeaderSettings {
        HeaderSettings {
            search_bar: true,
            search_debounce: Duration::from_millis(200),
            ..Default::default()
        }
    }

    fn type_query(page: &Page, input: NodeId, query: &str) {
        page.document().set_value(input, Some(query.to_string())).unwrap();
        page.dispatch_event(DomEvent::input(input)).unwrap();
    }

    fn hidden_flags(data: &[ExternalEntry]) -> Vec<(String, bool)> {
        data.iter()
            .flat_map(|entry| entry.leaves())
            .map(|leaf| (leaf.text.clone(), leaf.hidden))
            .collect()
    }

    #[test]
    fn test_text_headers_inserted_first() {
        let (f, accessors) = fixture(Vec::new());
        let settings = HeaderSettings {
            selectable_header: Some("Available".into()),
            selected_header: Some("Chosen".into()),
            ..Default::default()
        };

        let headers = CustomHeaders::start(&f.page, f.container, settings, accessors, Arc::new(Signal::new())).unwrap();

        let doc = f.page.document();
        for (pane, text) in [(Pane::Selectable, "Available"), (Pane::Selected, "Chosen")] {
            let element = pane_element(&doc, f.container, pane).unwrap();
            let first = doc.children(element).unwrap()[0];
            assert!(doc.has_class(first, classes::HEADER));
            assert_eq!(doc.text(first).unwrap(), text);
            assert!(live_list(&doc, f.container, pane).is_ok());
        }
        assert!(headers.search_input().is_none());
    }

    #[test]
    fn test_element_header_detached_on_destroy() {
        let (f, accessors) = fixture(Vec::new());
        let header = f.page.document().create_element("h3");
        let settings = HeaderSettings {
            selected_header: Some(header.into()),
            ..Default::default()
        };

        let headers = CustomHeaders::start(&f.page, f.container, settings, accessors, Arc::new(Signal::new())).unwrap();
        assert!(f.page.document().is_connected(header));

        headers.destroy(&f.page).unwrap();

        let doc = f.page.document();
        assert!(doc.contains(header));
        assert_eq!(doc.parent(header).unwrap(), None);
    }

    #[test]
    fn test_failed_start_releases_element_headers() {
        let (f, accessors) = fixture(Vec::new());
        let (header, root) = {
            let mut doc = f.page.document();
            (doc.create_element("h3"), doc.root())
        };
        let settings = HeaderSettings {
            selectable_header: Some(header.into()),
            selected_header: Some(root.into()),
            ..Default::default()
        };

        let err = CustomHeaders::start(&f.page, f.container, settings, accessors, Arc::new(Signal::new()))
            .err()
            .unwrap();
        assert!(matches!(err, DualListError::Document(_)));

        f.page.remove_node(f.container).unwrap();
        let doc = f.page.document();
        assert!(doc.contains(header));
        assert_eq!(doc.parent(header).unwrap(), None);
    }

    #[test]
    fn test_search_filters_after_debounce() {
        let (f, accessors) = fixture(vec![ExternalEntry::leaf("Apple"), ExternalEntry::leaf("Banana")]);
        let headers = CustomHeaders::start(&f.page, f.container, search_settings(), accessors, Arc::new(Signal::new())).unwrap();
        let input = headers.search_input().unwrap();
        {
            let doc = f.page.document();
            assert_eq!(doc.attribute(input, "type").unwrap(), Some("search"));
            assert_eq!(doc.attribute(input, "placeholder").unwrap(), Some(SEARCH_PLACEHOLDER));
        }

        type_query(&f.page, input, "AN");
        assert_eq!(f.page.process_timers(), 0);
        assert_eq!(*f.writes.lock(), 0);

        let fired = f.page.process_timers_at(Instant::now() + Duration::from_secs(1));

        assert_eq!(fired, 1);
        assert_eq!(
            hidden_flags(&f.data.lock()),
            vec![("Apple".to_string(), true), ("Banana".to_string(), false)]
        );
    }

    #[test]
    fn test_only_latest_query_applied() {
        let (f, accessors) = fixture(vec![ExternalEntry::leaf("Apple"), ExternalEntry::leaf("Banana")]);
        let headers = CustomHeaders::start(&f.page, f.container, search_settings(), accessors, Arc::new(Signal::new())).unwrap();
        let input = headers.search_input().unwrap();

        type_query(&f.page, input, "app");
        type_query(&f.page, input, "ban");
        assert_eq!(f.page.pending_timers(), 1);

        f.page.process_timers_at(Instant::now() + Duration::from_secs(1));

        assert_eq!(*f.writes.lock(), 1);
        assert_eq!(
            hidden_flags(&f.data.lock()),
            vec![("Apple".to_string(), true), ("Banana".to_string(), false)]
        );
    }

    #[test]
    fn test_group_label_match_keeps_children() {
        let (f, accessors) = fixture(vec![
            GroupData::new("Citrus", vec![LeafData::new("Lemon"), LeafData::new("Lime")]).into(),
            GroupData::new("Berries", vec![LeafData::new("Strawberry"), LeafData::new("Lingonberry")]).into(),
        ]);
        let headers = CustomHeaders::start(&f.page, f.container, search_settings(), accessors, Arc::new(Signal::new())).unwrap();

        type_query(&f.page, headers.search_input().unwrap(), "citrus");
        f.page.process_timers_at(Instant::now() + Duration::from_secs(1));

        let flags: Vec<bool> = hidden_flags(&f.data.lock()).into_iter().map(|(_, hidden)| hidden).collect();
        assert_eq!(flags, vec![false, false, true, true]);
    }

    #[test]
    fn test_empty_query_shows_everything() {
        let (f, accessors) = fixture(vec![LeafData::new("Apple").hidden().into()]);
        let headers = CustomHeaders::start(&f.page, f.container, search_settings(), accessors, Arc::new(Signal::new())).unwrap();

        type_query(&f.page, headers.search_input().unwrap(), "");
        f.page.process_timers_at(Instant::now() + Duration::from_secs(1));

        assert_eq!(hidden_flags(&f.data.lock()), vec![("Apple".to_string(), false)]);
    }

    #[test]
    fn test_destroy_cancels_pending_filter() {
        let (f, accessors) = fixture(vec![ExternalEntry::leaf("Apple")]);
        let headers = CustomHeaders::start(&f.page, f.container, search_settings(), accessors, Arc::new(Signal::new())).unwrap();
        let input = headers.search_input().unwrap();
        type_query(&f.page, input, "x");

        headers.destroy(&f.page).unwrap();
        type_query(&f.page, input, "y");

        assert_eq!(f.page.process_timers_at(Instant::now() + Duration::from_secs(1)), 0);
        assert_eq!(*f.writes.lock(), 0);
        assert_eq!(f.page.listener_count(), 0);
    }

    #[test]
    fn test_matches_query() {
        assert!(matches_query("an", "Banana"));
        assert!(matches_query("", "Anything"));
        assert!(!matches_query("an", "Apple"));
        assert!(matches_query("ban", "BANANA"));
    }
}
