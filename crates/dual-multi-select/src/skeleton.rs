//! The widget's static markup.
//!
//! ```text
//! div.dms-container
//! ├── div.dms-selectable > ul.dms-list[tabindex=0]
//! ├── div.dms-arrows
//! └── div.dms-selected > ul.dms-list[tabindex=0]
//! ```
//!
//! The container goes right after the select, which is moved off-screen by
//! inline style for as long as the widget lives.

use dual_multi_select_core::{Document, NodeId, Page};

use crate::classes;
use crate::error::Result;
use crate::render::Pane;

/// Inline style properties used to hide the native control.
const HIDING_STYLE: [(&str, &str); 3] = [
    ("position", "absolute"),
    ("left", "-9999px"),
    ("visibility", "hidden"),
];

/// The built markup plus what is needed to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    container: NodeId,
    /// The select's inline values for [`HIDING_STYLE`] before hiding.
    saved_style: Vec<(&'static str, String)>,
}

impl Skeleton {
    /// Build the container, hide `select` and insert the container after it.
    ///
    /// A select without a parent leaves the container detached.
    pub fn build(document: &mut Document, select: NodeId, stack_lists: bool, sticky_headers: bool) -> Result<Self> {
        let container = document.create_element("div");
        document.add_class(container, classes::CONTAINER)?;
        if stack_lists {
            document.add_class(container, classes::STACK_LISTS)?;
        }
        if sticky_headers {
            document.add_class(container, classes::STICKY_HEADERS)?;
        }

        let selectable = pane(document, Pane::Selectable)?;
        let arrows = document.create_element("div");
        document.add_class(arrows, classes::ARROWS)?;
        let selected = pane(document, Pane::Selected)?;
        for child in [selectable, arrows, selected] {
            document.append_child(container, child)?;
        }

        let mut saved_style = Vec::with_capacity(HIDING_STYLE.len());
        for (property, value) in HIDING_STYLE {
            saved_style.push((property, document.style(select, property)?.to_string()));
            document.set_style(select, property, value)?;
        }

        if document.parent(select)?.is_some() {
            document.insert_after(select, container)?;
        }

        tracing::debug!(target: "dual_multi_select::widget", ?select, ?container, "skeleton built");
        Ok(Self {
            container,
            saved_style,
        })
    }

    /// The outermost rendered element.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Restore the select's inline style and remove the container along
    /// with every listener attached inside it.
    pub fn destroy(&self, page: &Page, select: NodeId) -> Result<()> {
        {
            let mut document = page.document();
            if document.contains(select) {
                for (property, value) in &self.saved_style {
                    document.set_style(select, property, value)?;
                }
            }
        }
        if page.document().contains(self.container) {
            page.remove_node(self.container)?;
        }
        Ok(())
    }
}

fn pane(document: &mut Document, pane: Pane) -> Result<NodeId> {
    let element = document.create_element("div");
    document.add_class(element, pane.class())?;
    let list = document.create_element("ul");
    document.add_class(list, classes::LIST)?;
    document.set_attribute(list, "tabindex", "0")?;
    document.append_child(element, list)?;
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::live_list;

    fn select_in_form(doc: &mut Document) -> (NodeId, NodeId) {
        let form = doc.create_element("form");
        let select = doc.create_element("select");
        let submit = doc.create_element("button");
        let root = doc.root();
        doc.append_child(root, form).unwrap();
        doc.append_child(form, select).unwrap();
        doc.append_child(form, submit).unwrap();
        (form, select)
    }

    #[test]
    fn test_build_structure() {
        let mut doc = Document::new();
        let (form, select) = select_in_form(&mut doc);

        let skeleton = Skeleton::build(&mut doc, select, true, false).unwrap();
        let container = skeleton.container();

        assert_eq!(doc.children(form).unwrap()[1], container);
        assert!(doc.has_class(container, classes::STACK_LISTS));
        assert!(!doc.has_class(container, classes::STICKY_HEADERS));
        let children = doc.children(container).unwrap();
        assert!(doc.has_class(children[0], classes::SELECTABLE));
        assert!(doc.has_class(children[1], classes::ARROWS));
        assert!(doc.has_class(children[2], classes::SELECTED));
        for pane in Pane::ALL {
            let list = live_list(&doc, container, pane).unwrap();
            assert_eq!(doc.attribute(list, "tabindex").unwrap(), Some("0"));
        }
    }

    #[test]
    fn test_select_hidden_and_restored() {
        let page = Page::new();
        let select = {
            let mut doc = page.document();
            let (_, select) = select_in_form(&mut doc);
            doc.set_style(select, "position", "relative").unwrap();
            select
        };

        let skeleton = Skeleton::build(&mut page.document(), select, false, false).unwrap();
        {
            let doc = page.document();
            assert_eq!(doc.style(select, "position").unwrap(), "absolute");
            assert_eq!(doc.style(select, "left").unwrap(), "-9999px");
            assert_eq!(doc.style(select, "visibility").unwrap(), "hidden");
        }

        skeleton.destroy(&page, select).unwrap();

        let doc = page.document();
        assert_eq!(doc.style(select, "position").unwrap(), "relative");
        assert_eq!(doc.style(select, "left").unwrap(), "");
        assert_eq!(doc.style(select, "visibility").unwrap(), "");
        assert!(!doc.contains(skeleton.container()));
    }

    #[test]
    fn test_detached_select_keeps_container_detached() {
        let mut doc = Document::new();
        let select = doc.create_element("select");

        let skeleton = Skeleton::build(&mut doc, select, false, true).unwrap();

        assert_eq!(doc.parent(skeleton.container()).unwrap(), None);
        assert!(doc.has_class(skeleton.container(), classes::STICKY_HEADERS));
    }
}
