#![forbid(unsafe_code)]

//! The abstract UI tree the reactors operate on.
//!
//! A [`UiTree`] is the minimal slice of a document object model the page
//! needs: structural queries, attributes, classes, inline styles, focus, and
//! the viewport scroll offset. Nodes are addressed by opaque [`NodeId`]s that
//! stay valid for the life of the tree.
//!
//! # Invariants
//!
//! - Query results are in document order.
//! - `contains(a, a)` is true (a node contains itself, like `Node.contains`).
//! - Mutating methods on an unknown `NodeId` are no-ops.

use crate::selector::Selector;

/// Opaque handle to an element in a [`UiTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap a backend-specific index.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Document operations used by the scroll and modal reactors.
pub trait UiTree {
    /// First element in document order matching `selector`.
    fn query(&self, selector: &Selector) -> Option<NodeId>;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// First descendant of `root` (excluding `root`) matching `selector`.
    fn query_within(&self, root: NodeId, selector: &Selector) -> Option<NodeId>;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Value of attribute `name`, `None` when absent.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Create or overwrite attribute `name`.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Whether `class` is in the element's class list.
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Add `class` to the class list. Adding a present class changes nothing.
    fn add_class(&mut self, node: NodeId, class: &str);

    /// Remove `class` from the class list if present.
    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Set an inline style property (`element.style[property] = value`).
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Keyboard-focusable descendants of `root` in document order.
    ///
    /// See [`crate::focusable`] for the matching rule.
    fn focusable_descendants(&self, root: NodeId) -> Vec<NodeId>;

    /// Element currently holding keyboard focus.
    fn focused(&self) -> Option<NodeId>;

    /// Move keyboard focus to `node`.
    fn focus(&mut self, node: NodeId);

    /// Vertical viewport scroll offset.
    fn scroll_y(&self) -> f64;

    /// Scroll the viewport to vertical offset `y` (horizontal offset 0).
    fn scroll_to(&mut self, y: f64);

    /// Document-relative top edge of `node`: its viewport-relative top plus
    /// the current scroll offset.
    fn offset_top(&self, node: NodeId) -> f64;

    /// Suppress or restore page scrolling (the body `overflow` style).
    fn set_scroll_locked(&mut self, locked: bool);
}
