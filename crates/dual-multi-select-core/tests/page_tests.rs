//! Integration tests for the page: document, event dispatch and timers
//! working together.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dual_multi_select_core::{DomEvent, EventKind, ListenerId, NodeId, Page, Signal};
use parking_lot::Mutex;

fn setup() -> (Arc<Page>, NodeId, NodeId) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let page = Page::new();
    let (select, option) = {
        let mut doc = page.document();
        let select = doc.create_element("select");
        doc.toggle_attribute(select, "multiple", true).unwrap();
        let option = doc.create_element("option");
        doc.set_text(option, "Apple").unwrap();
        doc.append_child(select, option).unwrap();
        let root = doc.root();
        doc.append_child(root, select).unwrap();
        (select, option)
    };
    (page, select, option)
}

#[test]
fn test_change_listener_reads_mutated_state() {
    let (page, select, option) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let weak = Arc::downgrade(&page);
    let seen_clone = seen.clone();
    page.add_event_listener(select, EventKind::Change, move |event| {
        let page = weak.upgrade().unwrap();
        let doc = page.document();
        let selected: Vec<String> = doc
            .options(event.current_target)
            .unwrap()
            .into_iter()
            .filter(|&o| doc.is_selected(o).unwrap())
            .map(|o| doc.option_value(o).unwrap())
            .collect();
        seen_clone.lock().push(selected);
    });

    page.document().set_selected(option, true).unwrap();
    page.dispatch_event(DomEvent::change(select)).unwrap();

    assert_eq!(*seen.lock(), vec![vec!["Apple".to_string()]]);
}

#[test]
fn test_listener_can_dispatch_nested_event() {
    let (page, select, option) = setup();
    let changes = Arc::new(AtomicUsize::new(0));

    let weak = Arc::downgrade(&page);
    page.add_event_listener(option, EventKind::Click, move |_| {
        let page = weak.upgrade().unwrap();
        page.document().set_selected(option, true).unwrap();
        page.dispatch_event(DomEvent::change(select)).unwrap();
    });
    let changes_clone = changes.clone();
    page.add_event_listener(select, EventKind::Change, move |_| {
        changes_clone.fetch_add(1, Ordering::SeqCst);
    });

    page.click(option).unwrap();

    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert!(page.document().is_selected(option).unwrap());
}

#[test]
fn test_listener_removing_itself() {
    let (page, select, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

    let weak = Arc::downgrade(&page);
    let calls_clone = calls.clone();
    let slot_clone = slot.clone();
    let id = page.add_event_listener(select, EventKind::Change, move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        if let (Some(page), Some(id)) = (weak.upgrade(), slot_clone.lock().take()) {
            page.remove_event_listener(id).unwrap();
        }
    });
    *slot.lock() = Some(id);

    page.dispatch_event(DomEvent::change(select)).unwrap();
    page.dispatch_event(DomEvent::change(select)).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(page.listener_count(), 0);
}

#[test]
fn test_debounce_pattern_with_timers() {
    let (page, _, _) = setup();
    let fired = Arc::new(Signal::<u32>::new());
    let last = Arc::new(Mutex::new(None));
    let last_clone = last.clone();
    fired.connect(move |value| *last_clone.lock() = Some(*value));

    let pending = Arc::new(Mutex::new(None));
    for value in 1..=3u32 {
        if let Some(id) = pending.lock().take() {
            page.stop_timer(id).unwrap();
        }
        let fired = fired.clone();
        let id = page.start_timer(Duration::from_millis(10), move || fired.emit(value));
        *pending.lock() = Some(id);
    }

    assert_eq!(page.pending_timers(), 1);
    assert_eq!(page.process_timers_at(Instant::now() + Duration::from_secs(1)), 1);
    assert_eq!(*last.lock(), Some(3));
}

#[test]
fn test_detached_subtree_has_no_layout_box() {
    let (page, select, option) = setup();
    let mut doc = page.document();

    assert!(doc.has_layout_box(option));
    doc.set_style(select, "display", "none").unwrap();
    assert!(!doc.has_layout_box(option));
    doc.set_style(select, "display", "").unwrap();

    doc.detach(select).unwrap();
    assert!(!doc.has_layout_box(option));
    assert!(!doc.is_connected(option));
}
