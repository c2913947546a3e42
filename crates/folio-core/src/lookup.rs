#![forbid(unsafe_code)]

//! Explicit found / not-found element lookups.
//!
//! Every element the page reactors depend on is resolved through these
//! helpers once, at initialization. A missing element is a value, not a
//! fault: callers decide whether it disables a reactor or is ignored.

use crate::selector::Selector;
use crate::tree::{NodeId, UiTree};

/// Failure to resolve an element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no element matches `{selector}`")]
    Missing { selector: String },
    #[error("invalid selector `{input}`: {reason}")]
    InvalidSelector { input: String, reason: &'static str },
}

impl LookupError {
    fn missing(selector: &Selector) -> Self {
        Self::Missing {
            selector: selector.to_string(),
        }
    }
}

/// First element matching `selector`.
///
/// # Errors
///
/// [`LookupError::Missing`] when nothing matches.
pub fn find<T: UiTree + ?Sized>(tree: &T, selector: &Selector) -> Result<NodeId, LookupError> {
    tree.query(selector)
        .ok_or_else(|| LookupError::missing(selector))
}

/// First descendant of `root` matching `selector`.
///
/// # Errors
///
/// [`LookupError::Missing`] when nothing inside `root` matches.
pub fn find_within<T: UiTree + ?Sized>(
    tree: &T,
    root: NodeId,
    selector: &Selector,
) -> Result<NodeId, LookupError> {
    tree.query_within(root, selector)
        .ok_or_else(|| LookupError::missing(selector))
}

/// Element whose `id` attribute equals `id`.
///
/// # Errors
///
/// [`LookupError::Missing`] when no element carries the id.
pub fn find_by_id<T: UiTree + ?Sized>(tree: &T, id: &str) -> Result<NodeId, LookupError> {
    find(tree, &Selector::id(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ElementSpec, MemoryTree};

    #[test]
    fn found_and_missing() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let section = tree.append(body, ElementSpec::new("section").id("projects"));

        assert_eq!(find_by_id(&tree, "projects"), Ok(section));
        assert_eq!(
            find(&tree, &Selector::class("scroll-indicator")),
            Err(LookupError::Missing {
                selector: ".scroll-indicator".into()
            })
        );
    }

    #[test]
    fn within_excludes_outside_matches() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let modal = tree.append(body, ElementSpec::new("div").class("modal"));
        let _outside = tree.append(body, ElementSpec::new("button").class("close-modal"));

        assert!(find_within(&tree, modal, &Selector::class("close-modal")).is_err());

        let inside = tree.append(modal, ElementSpec::new("button").class("close-modal"));
        assert_eq!(
            find_within(&tree, modal, &Selector::class("close-modal")),
            Ok(inside)
        );
    }
}
