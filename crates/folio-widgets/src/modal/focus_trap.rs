#![forbid(unsafe_code)]

use folio_core::{KeyEvent, NodeId, Outcome, UiTree};

/// Focus the first focusable descendant of `root`.
///
/// Returns the node focused, or `None` if `root` has nothing focusable.
pub fn focus_first<T: UiTree + ?Sized>(tree: &mut T, root: NodeId) -> Option<NodeId> {
    let first = tree.focusable_descendants(root).into_iter().next()?;
    tree.focus(first);
    Some(first)
}

/// Keep Tab / Shift+Tab cycling inside `root`.
///
/// Tab on the last focusable descendant moves to the first; Shift+Tab on the
/// first moves to the last. Returns `Consumed` only when focus was wrapped.
/// Every other key, and any key while focus sits outside `root`, is
/// `Ignored`.
pub fn wrap_tab<T: UiTree + ?Sized>(tree: &mut T, root: NodeId, key: &KeyEvent) -> Outcome {
    let forward = key.is_tab();
    if !forward && !key.is_back_tab() {
        return Outcome::Ignored;
    }
    let Some(current) = tree.focused().filter(|&f| tree.contains(root, f)) else {
        return Outcome::Ignored;
    };
    let focusables = tree.focusable_descendants(root);
    let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
        return Outcome::Ignored;
    };

    let wrap_to = if forward && current == last {
        first
    } else if !forward && current == first {
        last
    } else {
        return Outcome::Ignored;
    };
    tree.focus(wrap_to);
    Outcome::Consumed
}
