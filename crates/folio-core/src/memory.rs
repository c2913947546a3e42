#![forbid(unsafe_code)]

//! Headless, in-memory [`UiTree`].
//!
//! `MemoryTree` models just enough of a document for the page reactors:
//! an element hierarchy with tags, ids, classes, attributes and inline
//! styles, a focused element, a viewport scroll offset, and a fixed
//! document-relative top edge per element. It drives the unit and
//! integration tests and the fuzz target without a browser.
//!
//! # Invariants
//!
//! - Node 0 is the `body` element and is never removed.
//! - Document order is the pre-order walk from the body.
//! - `scroll_to` clamps to `[0, max_scroll]` like a browser viewport and
//!   appends the applied offset to [`MemoryTree::scroll_history`].

use ahash::AHashMap;

use crate::focusable;
use crate::selector::Selector;
use crate::tree::{NodeId, UiTree};

/// Declarative description of an element to append.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    top: f64,
}

impl ElementSpec {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Document-relative top edge reported by [`UiTree::offset_top`].
    #[must_use]
    pub fn top(mut self, top: f64) -> Self {
        self.top = top;
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: AHashMap<String, String>,
    styles: AHashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    top: f64,
}

impl Node {
    fn from_spec(spec: ElementSpec, parent: Option<NodeId>) -> Self {
        Self {
            tag: spec.tag,
            id: spec.id,
            classes: spec.classes,
            attributes: spec.attributes.into_iter().collect(),
            styles: AHashMap::new(),
            parent,
            children: Vec::new(),
            top: spec.top,
        }
    }

    fn matches(&self, selector: &Selector) -> bool {
        selector.matches(
            &self.tag,
            self.id.as_deref(),
            self.classes.iter().map(String::as_str),
        )
    }
}

/// In-memory document.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: Vec<Node>,
    focused: Option<NodeId>,
    scroll_y: f64,
    max_scroll: f64,
    scroll_history: Vec<f64>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// A document containing only an empty `body`, unbounded scroll range.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::from_spec(ElementSpec::new("body"), None)],
            focused: None,
            scroll_y: 0.0,
            max_scroll: f64::INFINITY,
            scroll_history: Vec::new(),
        }
    }

    /// Bound the scrollable range (document height minus viewport height).
    #[must_use]
    pub fn with_max_scroll(mut self, max_scroll: f64) -> Self {
        self.max_scroll = max_scroll.max(0.0);
        self
    }

    /// The `body` element.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Append a new element as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        assert!(self.node(parent).is_some(), "unknown parent {parent:?}");
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::from_spec(spec, Some(parent)));
        self.nodes[parent.raw() as usize].children.push(id);
        id
    }

    /// Number of elements, including the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inline style value previously set through [`UiTree::set_style`].
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node)
            .and_then(|n| n.styles.get(property))
            .map(String::as_str)
    }

    /// Whether the body `overflow` style currently suppresses scrolling.
    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.style(self.root(), "overflow") == Some("hidden")
    }

    /// Every offset applied by `scroll_to`, oldest first.
    #[must_use]
    pub fn scroll_history(&self) -> &[f64] {
        &self.scroll_history
    }

    /// Move the viewport without going through `scroll_to`, as a user
    /// dragging the scrollbar would. Not recorded in the history.
    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll);
    }

    /// Remove focus from every element.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.raw() as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.raw() as usize)
    }

    /// Pre-order walk of `root`'s subtree, `root` first.
    fn walk(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }
}

impl UiTree for MemoryTree {
    fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.walk(self.root())
            .into_iter()
            .find(|&id| self.nodes[id.raw() as usize].matches(selector))
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.walk(self.root())
            .into_iter()
            .filter(|&id| self.nodes[id.raw() as usize].matches(selector))
            .collect()
    }

    fn query_within(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.walk(root)
            .into_iter()
            .skip(1)
            .find(|&id| self.nodes[id.raw() as usize].matches(selector))
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let n = self.node(id)?;
            if n.matches(selector) {
                return Some(id);
            }
            cursor = n.parent;
        }
        None
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let n = self.node(node)?;
        match name {
            "id" => n.id.clone(),
            "class" => Some(n.classes.join(" ")),
            _ => n.attributes.get(name).cloned(),
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            match name {
                "id" => n.id = Some(value.to_owned()),
                "class" => n.classes = value.split_whitespace().map(str::to_owned).collect(),
                _ => {
                    n.attributes.insert(name.to_owned(), value.to_owned());
                }
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            if value.is_empty() {
                n.styles.remove(property);
            } else {
                n.styles.insert(property.to_owned(), value.to_owned());
            }
        }
    }

    fn focusable_descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.walk(root)
            .into_iter()
            .skip(1)
            .filter(|&id| {
                let n = &self.nodes[id.raw() as usize];
                focusable::is_focusable(&n.tag, |name| n.attributes.get(name).map(String::as_str))
            })
            .collect()
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn focus(&mut self, node: NodeId) {
        if self.node(node).is_some() {
            self.focused = Some(node);
        }
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll);
        self.scroll_history.push(self.scroll_y);
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.node(node).map_or(0.0, |n| n.top)
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        let body = self.root();
        self.set_style(body, "overflow", if locked { "hidden" } else { "" });
    }
}
