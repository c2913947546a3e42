#![forbid(unsafe_code)]

//! [`UiTree`] over the live browser document.
//!
//! Elements are interned into an arena the first time a query returns them,
//! so a [`NodeId`] stays attached to the same element for the page's life.
//! A `WeakMap` from element to arena index makes re-interning O(1) without
//! touching the markup.
//!
//! DOM calls that throw are logged and treated as "not found" or "no
//! effect"; the trait surface is infallible.

use std::cell::RefCell;

use folio_core::focusable::{self, FOCUSABLE_CANDIDATES};
use folio_core::{NodeId, Selector, UiTree};
use js_sys::{Object, WeakMap};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

/// The browser document as a [`UiTree`].
#[derive(Debug)]
pub struct DomTree {
    window: Window,
    document: Document,
    nodes: RefCell<Vec<Element>>,
    handles: WeakMap,
}

impl DomTree {
    /// Adapter over `document`, scrolling through `window`.
    #[must_use]
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            nodes: RefCell::new(Vec::new()),
            handles: WeakMap::new(),
        }
    }

    /// Handle for `element`, allocating one on first sight.
    pub fn intern(&self, element: &Element) -> NodeId {
        let key: &Object = element.as_ref();
        if let Some(idx) = self.handles.get(key).as_f64() {
            return NodeId::new(idx as u32);
        }
        let mut nodes = self.nodes.borrow_mut();
        let idx = nodes.len() as u32;
        nodes.push(element.clone());
        self.handles.set(key, &JsValue::from(idx));
        NodeId::new(idx)
    }

    /// The element behind `node`.
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node.raw() as usize).cloned()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn intern_all(&self, list: &NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .map(|e| self.intern(&e))
            .collect()
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }
}

fn log_js(op: &'static str, err: &JsValue) {
    debug!(op, error = ?err, "dom call failed");
}

fn is_focusable(element: &Element) -> bool {
    let attrs: [(&str, Option<String>); 3] = [
        ("href", element.get_attribute("href")),
        ("disabled", element.get_attribute("disabled")),
        ("tabindex", element.get_attribute("tabindex")),
    ];
    focusable::is_focusable(&element.tag_name(), |name| {
        attrs
            .iter()
            .find(|(k, _)| *k == name)
            .and_then(|(_, v)| v.as_deref())
    })
}

impl UiTree for DomTree {
    fn query(&self, selector: &Selector) -> Option<NodeId> {
        match self.document.query_selector(&selector.as_css()) {
            Ok(found) => found.map(|e| self.intern(&e)),
            Err(err) => {
                log_js("querySelector", &err);
                None
            }
        }
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        match self.document.query_selector_all(&selector.as_css()) {
            Ok(list) => self.intern_all(&list),
            Err(err) => {
                log_js("querySelectorAll", &err);
                Vec::new()
            }
        }
    }

    fn query_within(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        let root = self.element(root)?;
        match root.query_selector(&selector.as_css()) {
            Ok(found) => found.map(|e| self.intern(&e)),
            Err(err) => {
                log_js("querySelector", &err);
                None
            }
        }
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let element = self.element(node)?;
        match element.closest(&selector.as_css()) {
            Ok(found) => found.map(|e| self.intern(&e)),
            Err(err) => {
                log_js("closest", &err);
                None
            }
        }
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(a), Some(n)) => {
                let n: &web_sys::Node = &n;
                a.contains(Some(n))
            }
            _ => false,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.element(node)
            && let Err(err) = e.set_attribute(name, value)
        {
            log_js("setAttribute", &err);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.element(node)
            && let Err(err) = e.class_list().add_1(class)
        {
            log_js("classList.add", &err);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.element(node)
            && let Err(err) = e.class_list().remove_1(class)
        {
            log_js("classList.remove", &err);
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.html(node) else { return };
        let style = el.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(drop)
        } else {
            style.set_property(property, value)
        };
        if let Err(err) = result {
            log_js("style", &err);
        }
    }

    fn focusable_descendants(&self, root: NodeId) -> Vec<NodeId> {
        let Some(root) = self.element(root) else {
            return Vec::new();
        };
        let list = match root.query_selector_all(FOCUSABLE_CANDIDATES) {
            Ok(list) => list,
            Err(err) => {
                log_js("querySelectorAll", &err);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .filter(is_focusable)
            .map(|e| self.intern(&e))
            .collect()
    }

    fn focused(&self) -> Option<NodeId> {
        self.document.active_element().map(|e| self.intern(&e))
    }

    fn focus(&mut self, node: NodeId) {
        if let Some(el) = self.html(node)
            && let Err(err) = el.focus()
        {
            log_js("focus", &err);
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&mut self, y: f64) {
        self.window.scroll_to_with_x_and_y(0.0, y);
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.element(node)
            .map_or(0.0, |e| e.get_bounding_client_rect().top() + self.scroll_y())
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        let Some(body) = self.body() else { return };
        let style = body.style();
        let result = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(drop)
        };
        if let Err(err) = result {
            log_js("body.style.overflow", &err);
        }
    }
}
