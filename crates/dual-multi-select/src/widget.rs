//! The widget facade: validation, wiring and teardown.

use std::sync::Arc;

use dual_multi_select_core::{Document, DomError, NodeId, Page, Signal};

use crate::config::DualListOptions;
use crate::error::{DualListError, Result};
use crate::headers::{CustomHeaders, DataAccessors, HeaderSettings};
use crate::interaction::{ClickContext, InteractionController};
use crate::model::ExternalEntry;
use crate::projection::DataProjection;
use crate::skeleton::Skeleton;
use crate::sync::SyncController;

/// A dual-list picker bound to a `select[multiple]` element.
///
/// The select stays the source of truth: every change made through the
/// widget is a change to the select followed by a change event, and every
/// change event on the select re-renders the widget.
///
/// # Example
///
/// ```
/// use dual_multi_select::{DualListOptions, DualMultiSelect, ExternalEntry, LeafData};
/// use dual_multi_select_core::Page;
///
/// let page = Page::new();
/// let select = {
///     let mut doc = page.document();
///     let select = doc.create_element("select");
///     doc.toggle_attribute(select, "multiple", true).unwrap();
///     let root = doc.root();
///     doc.append_child(root, select).unwrap();
///     select
/// };
///
/// let options = DualListOptions::new().with_data(vec![
///     ExternalEntry::leaf("Apple"),
///     LeafData::new("Banana").selected().into(),
/// ]);
/// let widget = DualMultiSelect::new(&page, select, options).unwrap();
/// assert_eq!(widget.data().unwrap().len(), 2);
///
/// widget.destroy().unwrap();
/// ```
pub struct DualMultiSelect {
    page: Arc<Page>,
    select: NodeId,
    skeleton: Skeleton,
    projection: Arc<DataProjection>,
    sync: SyncController,
    interaction: InteractionController,
    headers: Option<CustomHeaders>,
    errors: Arc<Signal<DualListError>>,
    destroyed: bool,
}

static_assertions::assert_impl_all!(DualMultiSelect: Send, Sync);

impl DualMultiSelect {
    /// Bind a widget to `select`.
    ///
    /// The target and the options are checked before anything is attached,
    /// so an error leaves the document untouched.
    #[tracing::instrument(skip(page, options), target = "dual_multi_select::widget", level = "debug")]
    pub fn new(page: &Arc<Page>, select: NodeId, options: DualListOptions) -> Result<Self> {
        {
            let document = page.document();
            validate_target(&document, select)?;
            options.validate(&document)?;
        }

        let skeleton = Skeleton::build(&mut page.document(), select, options.stack_lists, options.sticky_headers)?;
        let container = skeleton.container();
        let projection = Arc::new(DataProjection::new());
        let errors = Arc::new(Signal::new());

        let sync = match SyncController::start(page, select, container, projection.clone(), errors.clone()) {
            Ok(sync) => sync,
            Err(err) => {
                if let Err(cleanup) = skeleton.destroy(page, select) {
                    tracing::warn!(target: "dual_multi_select::widget", error = %cleanup, "failed to remove skeleton");
                }
                return Err(err);
            }
        };

        let context = ClickContext {
            select,
            container,
            selectable_option_groups: options.selectable_option_groups,
        };
        let interaction = InteractionController::start(page, context, errors.clone());

        // From here on, dropping the widget on error tears everything down.
        let mut widget = Self {
            page: page.clone(),
            select,
            skeleton,
            projection,
            sync,
            interaction,
            headers: None,
            errors,
            destroyed: false,
        };

        if let Some(data) = &options.data {
            widget.set_data(data)?;
        }

        if options.wants_headers() {
            let settings = HeaderSettings {
                selectable_header: options.selectable_header,
                selected_header: options.selected_header,
                search_bar: options.search_bar,
                search_debounce: options.search_debounce,
            };
            let headers = CustomHeaders::start(page, container, settings, widget.accessors(), widget.errors.clone())?;
            widget.headers = Some(headers);
        }

        tracing::debug!(target: "dual_multi_select::widget", ?select, ?container, "widget created");
        Ok(widget)
    }

    /// Replace the select's content and re-render.
    pub fn set_data(&self, data: &[ExternalEntry]) -> Result<()> {
        self.projection.apply(&self.page, self.select, data)
    }

    /// The select's current content in the public shape.
    pub fn data(&self) -> Result<Vec<ExternalEntry>> {
        self.projection.external(&mut self.page.document(), self.select)
    }

    /// The outermost rendered element.
    pub fn container(&self) -> NodeId {
        self.skeleton.container()
    }

    /// The bound select element.
    pub fn select(&self) -> NodeId {
        self.select
    }

    /// The page the widget lives in.
    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// The search input, if the search bar is enabled.
    pub fn search_input(&self) -> Option<NodeId> {
        self.headers.as_ref().and_then(CustomHeaders::search_input)
    }

    /// Errors raised inside event listeners and timers, which have no
    /// caller to return them to.
    pub fn errors(&self) -> &Signal<DualListError> {
        &self.errors
    }

    /// Number of synchronization passes run so far.
    pub fn sync_passes(&self) -> u64 {
        self.sync.passes()
    }

    /// Tear the widget down: remove every listener and pending timer,
    /// restore the select's inline style and remove the rendered markup.
    pub fn destroy(mut self) -> Result<()> {
        self.teardown()
    }

    /// Accessors handed to the headers decorator. They hold the page weakly
    /// because they end up in the page's own listener table.
    fn accessors(&self) -> DataAccessors {
        let select = self.select;

        let page = Arc::downgrade(&self.page);
        let projection = self.projection.clone();
        let get = move || -> Result<Vec<ExternalEntry>> {
            let page = page.upgrade().ok_or(DomError::Detached)?;
            let mut document = page.document();
            projection.external(&mut document, select)
        };

        let page = Arc::downgrade(&self.page);
        let projection = self.projection.clone();
        let set = move |data: &[ExternalEntry]| -> Result<()> {
            let page = page.upgrade().ok_or(DomError::Detached)?;
            projection.apply(&page, select, data)
        };

        DataAccessors {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    fn teardown(&mut self) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;

        let mut result = self.sync.dispose(&self.page);
        self.interaction.dispose(&self.page);
        if let Some(headers) = self.headers.take() {
            result = result.and(headers.destroy(&self.page));
        }
        result = result.and(self.skeleton.destroy(&self.page, self.select));
        self.errors.disconnect_all();

        tracing::debug!(target: "dual_multi_select::widget", select = ?self.select, "widget destroyed");
        result
    }
}

impl Drop for DualMultiSelect {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            tracing::warn!(target: "dual_multi_select::widget", error = %err, "teardown on drop failed");
        }
    }
}

/// Check that `select` is a `select` element with the `multiple` attribute.
pub fn validate_target(document: &Document, select: NodeId) -> Result<()> {
    let tag = document
        .tag(select)
        .map_err(|_| DualListError::invalid_target("the node does not exist"))?;
    if tag != "select" {
        return Err(DualListError::invalid_target(format!("expected a select element, found <{tag}>")));
    }
    if !document.has_attribute(select, "multiple") {
        return Err(DualListError::NotMultiple);
    }
    Ok(())
}
