#![forbid(unsafe_code)]

//! Cards, modals and the selectors that relate them, resolved once.

use ahash::AHashMap;
use folio_core::config::SelectorConfig;
use folio_core::{CompiledSelectors, NodeId, Selector, UiTree};
use tracing::{debug, warn};

/// Index of a modal inside a [`ModalRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalKey(pub(crate) usize);

impl ModalKey {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A project card and the modal id it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBinding {
    pub node: NodeId,
    pub modal_id: String,
    /// `None` when no registered modal carries `modal_id`.
    pub target: Option<ModalKey>,
}

/// A modal dialog element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalBinding {
    pub node: NodeId,
    pub id: String,
    /// First close control inside the modal, if any.
    pub close: Option<NodeId>,
}

/// Static card/modal bindings for one page.
#[derive(Debug, Clone)]
pub struct ModalRegistry {
    cards: Vec<CardBinding>,
    modals: Vec<ModalBinding>,
    by_id: AHashMap<String, ModalKey>,
    close: Selector,
    card_ignore: Selector,
    active_class: String,
}

impl ModalRegistry {
    /// Scan `tree` for modals and cards.
    ///
    /// Modals without an id and cards without a modal attribute are skipped
    /// with a warning. When two modals share an id the first one wins.
    pub fn build<T: UiTree + ?Sized>(
        tree: &T,
        selectors: &CompiledSelectors,
        names: &SelectorConfig,
    ) -> Self {
        let mut modals = Vec::new();
        let mut by_id = AHashMap::new();
        for node in tree.query_all(&selectors.modal) {
            let Some(id) = tree.attribute(node, "id").filter(|id| !id.is_empty()) else {
                warn!(node = node.raw(), "modal without id skipped");
                continue;
            };
            if by_id.contains_key(&id) {
                warn!(modal = %id, "duplicate modal id; keeping the first");
                continue;
            }
            let close = tree.query_within(node, &selectors.close);
            if close.is_none() {
                warn!(modal = %id, selector = %selectors.close, "modal has no close control");
            }
            by_id.insert(id.clone(), ModalKey(modals.len()));
            modals.push(ModalBinding { node, id, close });
        }

        let mut cards = Vec::new();
        for node in tree.query_all(&selectors.project_card) {
            let Some(modal_id) = tree.attribute(node, &names.modal_attribute) else {
                warn!(
                    node = node.raw(),
                    attribute = %names.modal_attribute,
                    "card without modal attribute skipped"
                );
                continue;
            };
            let target = by_id.get(&modal_id).copied();
            if target.is_none() {
                debug!(modal = %modal_id, "card refers to an unknown modal");
            }
            cards.push(CardBinding {
                node,
                modal_id,
                target,
            });
        }

        debug!(cards = cards.len(), modals = modals.len(), "modal registry built");
        Self {
            cards,
            modals,
            by_id,
            close: selectors.close.clone(),
            card_ignore: selectors.card_ignore.clone(),
            active_class: names.active_class.clone(),
        }
    }

    #[must_use]
    pub fn cards(&self) -> &[CardBinding] {
        &self.cards
    }

    #[must_use]
    pub fn modals(&self) -> &[ModalBinding] {
        &self.modals
    }

    /// Class marking a modal visible.
    #[must_use]
    pub fn active_class(&self) -> &str {
        &self.active_class
    }

    #[must_use]
    pub fn get(&self, key: ModalKey) -> Option<&ModalBinding> {
        self.modals.get(key.0)
    }

    /// Modal registered under `id`.
    #[must_use]
    pub fn key_for_id(&self, id: &str) -> Option<ModalKey> {
        self.by_id.get(id).copied()
    }

    /// Modal whose element is exactly `node`.
    #[must_use]
    pub fn key_for_node(&self, node: NodeId) -> Option<ModalKey> {
        self.modals
            .iter()
            .position(|m| m.node == node)
            .map(ModalKey)
    }

    /// Innermost registered modal containing `node`.
    pub fn modal_containing<T: UiTree + ?Sized>(&self, tree: &T, node: NodeId) -> Option<ModalKey> {
        // Candidates are all ancestors of `node`, so they form a chain; the
        // innermost is the one every other candidate contains.
        let mut best: Option<(usize, NodeId)> = None;
        for (i, m) in self.modals.iter().enumerate() {
            if !tree.contains(m.node, node) {
                continue;
            }
            if best.is_none_or(|(_, outer)| tree.contains(outer, m.node)) {
                best = Some((i, m.node));
            }
        }
        best.map(|(i, _)| ModalKey(i))
    }

    /// Card bound to exactly `node`.
    #[must_use]
    pub fn card_for_node(&self, node: NodeId) -> Option<&CardBinding> {
        self.cards.iter().find(|c| c.node == node)
    }

    /// Card activated by a click on `target`.
    ///
    /// Clicks inside the card's ignore region (embedded links that handle
    /// the click themselves) do not count.
    pub fn card_for_click<T: UiTree + ?Sized>(&self, tree: &T, target: NodeId) -> Option<&CardBinding> {
        let card = self.cards.iter().find(|c| tree.contains(c.node, target))?;
        match tree.closest(target, &self.card_ignore) {
            Some(ignored) if tree.contains(card.node, ignored) => None,
            _ => Some(card),
        }
    }

    /// Close control containing `target`, and the modal it belongs to.
    pub fn close_for_click<T: UiTree + ?Sized>(&self, tree: &T, target: NodeId) -> Option<ModalKey> {
        let control = tree.closest(target, &self.close)?;
        self.modal_containing(tree, control)
    }

    /// Give every modal dialog semantics and every card keyboard access.
    ///
    /// Modals get `role="dialog"`, `aria-modal="true"` and an `aria-hidden`
    /// matching their current `active` class. Cards without a `tabindex`
    /// become focusable buttons.
    pub fn prepare_accessibility<T: UiTree + ?Sized>(&self, tree: &mut T) {
        for modal in &self.modals {
            tree.set_attribute(modal.node, "role", "dialog");
            tree.set_attribute(modal.node, "aria-modal", "true");
            let hidden = !tree.has_class(modal.node, &self.active_class);
            tree.set_attribute(modal.node, "aria-hidden", if hidden { "true" } else { "false" });
        }
        for card in &self.cards {
            if tree.attribute(card.node, "tabindex").is_none() {
                tree.set_attribute(card.node, "tabindex", "0");
            }
            if tree.attribute(card.node, "role").is_none() {
                tree.set_attribute(card.node, "role", "button");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{ElementSpec, MemoryTree, PageConfig};

    fn build(tree: &MemoryTree) -> ModalRegistry {
        let cfg = PageConfig::default();
        let selectors = cfg.compile_selectors().unwrap();
        ModalRegistry::build(tree, &selectors, &cfg.selectors)
    }

    #[test]
    fn binds_cards_to_modals() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let card = tree.append(
            body,
            ElementSpec::new("div").class("project-card").attr("data-modal", "modal-1"),
        );
        let orphan = tree.append(
            body,
            ElementSpec::new("div").class("project-card").attr("data-modal", "modal-9"),
        );
        let modal = tree.append(body, ElementSpec::new("div").class("modal").id("modal-1"));
        let close = tree.append(modal, ElementSpec::new("button").class("close-modal"));

        let reg = build(&tree);
        assert_eq!(reg.modals().len(), 1);
        assert_eq!(reg.modals()[0].close, Some(close));
        assert_eq!(reg.key_for_id("modal-1"), reg.key_for_node(modal));
        assert_eq!(reg.card_for_node(card).unwrap().target, reg.key_for_id("modal-1"));
        assert_eq!(reg.card_for_node(orphan).unwrap().target, None);
    }

    #[test]
    fn skips_malformed_elements() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        tree.append(body, ElementSpec::new("div").class("project-card"));
        tree.append(body, ElementSpec::new("div").class("modal"));
        let first = tree.append(body, ElementSpec::new("div").class("modal").id("dup"));
        tree.append(body, ElementSpec::new("div").class("modal").id("dup"));

        let reg = build(&tree);
        assert!(reg.cards().is_empty());
        assert_eq!(reg.modals().len(), 1);
        assert_eq!(reg.modals()[0].node, first);
    }

    #[test]
    fn click_resolution() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let card = tree.append(
            body,
            ElementSpec::new("div").class("project-card").attr("data-modal", "m"),
        );
        let title = tree.append(card, ElementSpec::new("h3"));
        let video = tree.append(
            card,
            ElementSpec::new("a").class("youtube-link").attr("href", "https://youtu.be/x"),
        );
        let icon = tree.append(video, ElementSpec::new("img"));
        let modal = tree.append(body, ElementSpec::new("div").class("modal").id("m"));
        let close = tree.append(modal, ElementSpec::new("button").class("close-modal"));
        let glyph = tree.append(close, ElementSpec::new("span"));

        let reg = build(&tree);
        assert_eq!(reg.card_for_click(&tree, title).map(|c| c.node), Some(card));
        assert!(reg.card_for_click(&tree, icon).is_none());
        assert!(reg.card_for_click(&tree, modal).is_none());
        assert_eq!(reg.close_for_click(&tree, glyph), reg.key_for_node(modal));
        assert_eq!(reg.close_for_click(&tree, modal), None);
    }

    #[test]
    fn nested_modal_containment_prefers_innermost() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let outer = tree.append(body, ElementSpec::new("div").class("modal").id("outer"));
        let inner = tree.append(outer, ElementSpec::new("div").class("modal").id("inner"));
        let button = tree.append(inner, ElementSpec::new("button"));

        let reg = build(&tree);
        assert_eq!(reg.modal_containing(&tree, button), reg.key_for_node(inner));
        assert_eq!(reg.modal_containing(&tree, outer), reg.key_for_node(outer));
    }

    #[test]
    fn accessibility_preparation() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let card = tree.append(
            body,
            ElementSpec::new("div").class("project-card").attr("data-modal", "m"),
        );
        let custom = tree.append(
            body,
            ElementSpec::new("div")
                .class("project-card")
                .attr("data-modal", "m")
                .attr("tabindex", "2"),
        );
        let hidden = tree.append(body, ElementSpec::new("div").class("modal").id("m"));
        let shown = tree.append(body, ElementSpec::new("div").class("modal").class("active").id("n"));

        let reg = build(&tree);
        reg.prepare_accessibility(&mut tree);

        assert_eq!(tree.attribute(card, "tabindex").as_deref(), Some("0"));
        assert_eq!(tree.attribute(card, "role").as_deref(), Some("button"));
        assert_eq!(tree.attribute(custom, "tabindex").as_deref(), Some("2"));
        assert_eq!(tree.attribute(hidden, "role").as_deref(), Some("dialog"));
        assert_eq!(tree.attribute(hidden, "aria-modal").as_deref(), Some("true"));
        assert_eq!(tree.attribute(hidden, "aria-hidden").as_deref(), Some("true"));
        assert_eq!(tree.attribute(shown, "aria-hidden").as_deref(), Some("false"));
    }
}
