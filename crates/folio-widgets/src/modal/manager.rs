#![forbid(unsafe_code)]

use folio_core::{Event, KeyCode, KeyEvent, NodeId, Outcome, UiTree};
use tracing::{debug, info};

use super::focus_trap::{focus_first, wrap_tab};
use super::registry::{ModalKey, ModalRegistry};
use super::stack::{ClosedModal, ModalStack, TrapToken};

/// Ask the host to call [`ModalManager::arm_trap`] after `delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmRequest {
    pub token: TrapToken,
    pub delay_ms: u32,
}

/// What a handled event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Opened(ModalKey),
    /// A close control was activated.
    Closed(ModalKey),
    BackdropClicked(ModalKey),
    /// Escape closed every open modal.
    EscapePressed { closed: usize },
    /// Tab or Shift+Tab wrapped around the top modal.
    FocusWrapped(ModalKey),
}

/// Result of [`ModalManager::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalResponse {
    /// `Consumed` means the host should prevent the event's default action.
    pub outcome: Outcome,
    pub action: Option<ModalAction>,
    /// Set when a modal opened and its focus trap must be armed later.
    pub arm: Option<ArmRequest>,
}

impl ModalResponse {
    fn acted(action: ModalAction) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }
}

/// Card-bound modal state machine.
///
/// Owns the [`ModalRegistry`] and the [`ModalStack`]. All document effects
/// (the active class, `aria-hidden`, the scroll lock, focus) go through the
/// [`UiTree`] passed to each call.
#[derive(Debug, Clone)]
pub struct ModalManager {
    registry: ModalRegistry,
    stack: ModalStack,
    trap_delay_ms: u32,
}

impl ModalManager {
    #[must_use]
    pub fn new(registry: ModalRegistry, trap_delay_ms: u32) -> Self {
        Self {
            registry,
            stack: ModalStack::new(),
            trap_delay_ms,
        }
    }

    /// Prepare the document and adopt modals that are already visible.
    ///
    /// Modals carrying the active class at this point are pushed with an
    /// armed trap and no focus memory, and the scroll lock is taken.
    pub fn attach<T: UiTree + ?Sized>(&mut self, tree: &mut T) {
        self.registry.prepare_accessibility(tree);
        for (index, modal) in self.registry.modals().iter().enumerate() {
            if tree.has_class(modal.node, self.registry.active_class()) {
                debug!(modal = %modal.id, "modal already open at attach");
                self.stack.push_armed(ModalKey(index), None);
            }
        }
        if !self.stack.is_empty() {
            tree.set_scroll_locked(true);
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ModalRegistry {
        &self.registry
    }

    #[must_use]
    pub fn stack(&self) -> &ModalStack {
        &self.stack
    }

    #[must_use]
    pub fn is_open(&self, key: ModalKey) -> bool {
        self.stack.contains(key)
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.stack.depth()
    }

    /// Open `key`, remembering the currently focused element.
    ///
    /// Returns `None` for an unknown key or a modal that is already open;
    /// nothing changes in either case.
    pub fn open<T: UiTree + ?Sized>(&mut self, tree: &mut T, key: ModalKey) -> Option<ArmRequest> {
        let modal = self.registry.get(key)?;
        let node = modal.node;
        let token = self.stack.push(key, tree.focused())?;

        tree.add_class(node, self.registry.active_class());
        tree.set_attribute(node, "aria-hidden", "false");
        tree.set_scroll_locked(true);
        info!(modal = %modal.id, depth = self.stack.depth(), "modal opened");

        Some(ArmRequest {
            token,
            delay_ms: self.trap_delay_ms,
        })
    }

    /// Open the modal registered under `id`.
    pub fn open_by_id<T: UiTree + ?Sized>(&mut self, tree: &mut T, id: &str) -> Option<ArmRequest> {
        let Some(key) = self.registry.key_for_id(id) else {
            debug!(modal = %id, "open requested for unknown modal");
            return None;
        };
        self.open(tree, key)
    }

    /// Close `key`. Returns `false` if it was not open.
    pub fn close<T: UiTree + ?Sized>(&mut self, tree: &mut T, key: ModalKey) -> bool {
        let Some(closed) = self.stack.pop_key(key) else {
            return false;
        };
        self.apply_close(tree, closed);
        true
    }

    /// Close every open modal, top first. Returns how many closed.
    pub fn close_all<T: UiTree + ?Sized>(&mut self, tree: &mut T) -> usize {
        let closed = self.stack.pop_all();
        let count = closed.len();
        for entry in closed {
            self.apply_close(tree, entry);
        }
        count
    }

    fn apply_close<T: UiTree + ?Sized>(&self, tree: &mut T, closed: ClosedModal) {
        if let Some(modal) = self.registry.get(closed.key) {
            tree.remove_class(modal.node, self.registry.active_class());
            tree.set_attribute(modal.node, "aria-hidden", "true");
            info!(modal = %modal.id, depth = self.stack.depth(), "modal closed");
        }
        if self.stack.is_empty() {
            tree.set_scroll_locked(false);
        }
        if let Some(previous) = closed.restore_focus {
            tree.focus(previous);
        }
    }

    /// Arm the focus trap for `token` and focus the modal's first focusable
    /// descendant.
    ///
    /// A token whose modal has closed since is stale: nothing happens and
    /// `None` is returned.
    pub fn arm_trap<T: UiTree + ?Sized>(&mut self, tree: &mut T, token: TrapToken) -> Option<ModalKey> {
        let Some(key) = self.stack.arm(token) else {
            debug!(token = token.id(), "stale focus-trap timer");
            return None;
        };
        if let Some(modal) = self.registry.get(key) {
            let focused = focus_first(tree, modal.node);
            debug!(modal = %modal.id, focused = ?focused.map(NodeId::raw), "focus trap armed");
        }
        Some(key)
    }

    /// Route one input event through the state machine.
    pub fn handle_event<T: UiTree + ?Sized>(&mut self, tree: &mut T, event: &Event) -> ModalResponse {
        match event {
            Event::Click(click) => self.handle_click(tree, click.target),
            Event::Key(key) if key.is_down() => self.handle_key(tree, key),
            _ => ModalResponse::default(),
        }
    }

    fn handle_click<T: UiTree + ?Sized>(&mut self, tree: &mut T, target: NodeId) -> ModalResponse {
        if let Some(key) = self.registry.close_for_click(tree, target) {
            if self.close(tree, key) {
                return ModalResponse::acted(ModalAction::Closed(key));
            }
            return ModalResponse::default();
        }

        if let Some(key) = self.registry.key_for_node(target)
            && self.close(tree, key)
        {
            return ModalResponse::acted(ModalAction::BackdropClicked(key));
        }

        self.activate_card(tree, target, Outcome::Ignored)
    }

    fn handle_key<T: UiTree + ?Sized>(&mut self, tree: &mut T, key: &KeyEvent) -> ModalResponse {
        if key.code == KeyCode::Escape {
            let closed = self.close_all(tree);
            if closed == 0 {
                return ModalResponse::default();
            }
            return ModalResponse::acted(ModalAction::EscapePressed { closed });
        }

        if key.is_tab() || key.is_back_tab() {
            let Some(top) = self.stack.armed_top() else {
                return ModalResponse::default();
            };
            let Some(modal) = self.registry.get(top) else {
                return ModalResponse::default();
            };
            if wrap_tab(tree, modal.node, key).is_consumed() {
                return ModalResponse {
                    outcome: Outcome::Consumed,
                    ..ModalResponse::acted(ModalAction::FocusWrapped(top))
                };
            }
            return ModalResponse::default();
        }

        if key.is_activation()
            && let Some(focused) = tree.focused()
        {
            return self.activate_card(tree, focused, Outcome::Consumed);
        }

        ModalResponse::default()
    }

    /// Open the modal of the card at `target`, if any.
    ///
    /// `outcome` is reported whenever a card was hit, even if its modal was
    /// unknown or already open.
    fn activate_card<T: UiTree + ?Sized>(
        &mut self,
        tree: &mut T,
        target: NodeId,
        outcome: Outcome,
    ) -> ModalResponse {
        let Some(card) = self.registry.card_for_click(tree, target) else {
            return ModalResponse::default();
        };
        let Some(key) = card.target else {
            debug!(modal = %card.modal_id, "card refers to an unknown modal");
            return ModalResponse {
                outcome,
                ..ModalResponse::default()
            };
        };
        let arm = self.open(tree, key);
        ModalResponse {
            outcome,
            action: arm.map(|_| ModalAction::Opened(key)),
            arm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{ElementSpec, MemoryTree, Modifiers, PageConfig};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    struct Page {
        tree: MemoryTree,
        manager: ModalManager,
        card_a: NodeId,
        card_b: NodeId,
        orphan: NodeId,
        video: NodeId,
        modal_a: NodeId,
        close_a: NodeId,
        link_a: NodeId,
        modal_b: NodeId,
        close_b: NodeId,
        outside: NodeId,
    }

    fn page() -> Page {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let outside = tree.append(body, ElementSpec::new("button").class("scroll-button"));
        let card_a = tree.append(
            body,
            ElementSpec::new("div").class("project-card").attr("data-modal", "modal-a"),
        );
        let video = tree.append(
            card_a,
            ElementSpec::new("a").class("youtube-link").attr("href", "https://youtu.be/a"),
        );
        let card_b = tree.append(
            body,
            ElementSpec::new("div").class("project-card").attr("data-modal", "modal-b"),
        );
        let orphan = tree.append(
            body,
            ElementSpec::new("div").class("project-card").attr("data-modal", "missing"),
        );
        let modal_a = tree.append(body, ElementSpec::new("div").class("modal").id("modal-a"));
        let close_a = tree.append(modal_a, ElementSpec::new("span").class("close-modal").attr("tabindex", "0"));
        let link_a = tree.append(modal_a, ElementSpec::new("a").attr("href", "https://example.com"));
        let modal_b = tree.append(body, ElementSpec::new("div").class("modal").id("modal-b"));
        let close_b = tree.append(modal_b, ElementSpec::new("button").class("close-modal"));

        let cfg = PageConfig::default();
        let selectors = cfg.compile_selectors().unwrap();
        let registry = ModalRegistry::build(&tree, &selectors, &cfg.selectors);
        let mut manager = ModalManager::new(registry, cfg.timing.focus_trap_delay_ms);
        manager.attach(&mut tree);

        Page {
            tree,
            manager,
            card_a,
            card_b,
            orphan,
            video,
            modal_a,
            close_a,
            link_a,
            modal_b,
            close_b,
            outside,
        }
    }

    impl Page {
        fn send(&mut self, event: Event) -> ModalResponse {
            self.manager.handle_event(&mut self.tree, &event)
        }

        fn key(&self, node: NodeId) -> ModalKey {
            self.manager.registry().key_for_node(node).unwrap()
        }

        fn is_active(&self, node: NodeId) -> bool {
            self.tree.has_class(node, "active")
        }

        fn aria_hidden(&self, node: NodeId) -> String {
            self.tree.attribute(node, "aria-hidden").unwrap_or_default()
        }

        fn aria_consistent(&self) -> bool {
            self.manager
                .registry()
                .modals()
                .iter()
                .all(|m| self.tree.has_class(m.node, "active") == (self.aria_hidden(m.node) == "false"))
        }
    }

    #[test]
    fn card_click_opens_modal() {
        let mut p = page();
        p.tree.focus(p.outside);
        let resp = p.send(Event::click(p.card_a));

        let key = p.key(p.modal_a);
        assert_eq!(resp.outcome, Outcome::Ignored);
        assert_eq!(resp.action, Some(ModalAction::Opened(key)));
        assert_eq!(resp.arm.map(|a| a.delay_ms), Some(250));
        assert!(p.is_active(p.modal_a));
        assert_eq!(p.aria_hidden(p.modal_a), "false");
        assert!(p.tree.is_scroll_locked());
        // focus does not move until the trap is armed
        assert_eq!(p.tree.focused(), Some(p.outside));
    }

    #[test]
    fn attach_prepares_hidden_modals() {
        let p = page();
        assert_eq!(p.aria_hidden(p.modal_a), "true");
        assert_eq!(p.aria_hidden(p.modal_b), "true");
        assert_eq!(p.tree.attribute(p.card_a, "tabindex").as_deref(), Some("0"));
        assert!(!p.tree.is_scroll_locked());
        assert_eq!(p.manager.open_count(), 0);
    }

    #[test]
    fn attach_adopts_visible_modal() {
        let mut tree = MemoryTree::new();
        let body = tree.root();
        let modal = tree.append(body, ElementSpec::new("div").class("modal").class("active").id("m"));
        let close = tree.append(modal, ElementSpec::new("button").class("close-modal"));
        let cfg = PageConfig::default();
        let selectors = cfg.compile_selectors().unwrap();
        let mut manager = ModalManager::new(ModalRegistry::build(&tree, &selectors, &cfg.selectors), 250);
        manager.attach(&mut tree);

        assert_eq!(manager.open_count(), 1);
        assert!(tree.is_scroll_locked());
        assert_eq!(tree.attribute(modal, "aria-hidden").as_deref(), Some("false"));

        manager.handle_event(&mut tree, &Event::click(close));
        assert_eq!(manager.open_count(), 0);
        assert!(!tree.is_scroll_locked());
    }

    #[test]
    fn click_inside_ignore_region_does_nothing() {
        let mut p = page();
        let resp = p.send(Event::click(p.video));
        assert_eq!(resp, ModalResponse::default());
        assert!(!p.is_active(p.modal_a));
    }

    #[test]
    fn unknown_modal_id_changes_nothing() {
        let mut p = page();
        let resp = p.send(Event::click(p.orphan));
        assert_eq!(resp.action, None);
        assert_eq!(resp.arm, None);
        assert!(!p.is_active(p.modal_a));
        assert!(!p.is_active(p.modal_b));
        assert!(!p.tree.is_scroll_locked());
        assert!(p.aria_consistent());
    }

    #[test]
    fn reopening_is_a_no_op() {
        let mut p = page();
        assert!(p.send(Event::click(p.card_a)).arm.is_some());
        let again = p.send(Event::click(p.card_a));
        assert_eq!(again.arm, None);
        assert_eq!(again.action, None);
        assert_eq!(p.manager.open_count(), 1);
    }

    #[test]
    fn close_control_restores_focus_and_unlocks() {
        let mut p = page();
        p.tree.focus(p.card_a);
        let arm = p.send(Event::click(p.card_a)).arm.unwrap();
        assert_eq!(p.manager.arm_trap(&mut p.tree, arm.token), Some(p.key(p.modal_a)));
        assert_eq!(p.tree.focused(), Some(p.close_a));

        let resp = p.send(Event::click(p.close_a));
        assert_eq!(resp.action, Some(ModalAction::Closed(p.key(p.modal_a))));
        assert!(!p.is_active(p.modal_a));
        assert_eq!(p.aria_hidden(p.modal_a), "true");
        assert!(!p.tree.is_scroll_locked());
        assert_eq!(p.tree.focused(), Some(p.card_a));
    }

    #[test]
    fn backdrop_click_closes() {
        let mut p = page();
        p.send(Event::click(p.card_b));
        let resp = p.send(Event::click(p.modal_b));
        assert_eq!(resp.action, Some(ModalAction::BackdropClicked(p.key(p.modal_b))));
        assert!(!p.is_active(p.modal_b));
    }

    #[test]
    fn click_inside_modal_content_keeps_it_open() {
        let mut p = page();
        p.send(Event::click(p.card_a));
        let resp = p.send(Event::click(p.link_a));
        assert_eq!(resp, ModalResponse::default());
        assert!(p.is_active(p.modal_a));
    }

    #[test]
    fn enter_and_space_on_focused_card_open() {
        let mut p = page();
        p.tree.focus(p.card_b);
        let resp = p.send(Event::key(KeyCode::Enter));
        assert_eq!(resp.outcome, Outcome::Consumed);
        assert!(p.is_active(p.modal_b));

        p.send(Event::key(KeyCode::Escape));
        assert_eq!(p.tree.focused(), Some(p.card_b));
        let resp = p.send(Event::key(KeyCode::Char(' ')));
        assert_eq!(resp.outcome, Outcome::Consumed);
        assert!(p.is_active(p.modal_b));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut p = page();
        p.tree.focus(p.card_a);
        let release = KeyEvent::new(KeyCode::Enter).with_kind(folio_core::KeyEventKind::Release);
        assert_eq!(p.send(Event::Key(release)), ModalResponse::default());
        assert!(!p.is_active(p.modal_a));
    }

    #[test]
    fn escape_closes_everything_at_once() {
        let mut p = page();
        p.tree.focus(p.card_a);
        p.send(Event::click(p.card_a));
        p.manager.open_by_id(&mut p.tree, "modal-b");
        assert_eq!(p.manager.open_count(), 2);

        let resp = p.send(Event::key(KeyCode::Escape));
        assert_eq!(resp.action, Some(ModalAction::EscapePressed { closed: 2 }));
        assert_eq!(resp.outcome, Outcome::Ignored);
        assert!(!p.is_active(p.modal_a));
        assert!(!p.is_active(p.modal_b));
        assert!(!p.tree.is_scroll_locked());
        assert_eq!(p.tree.focused(), Some(p.card_a));
        assert!(p.aria_consistent());
    }

    #[test]
    fn escape_without_open_modals() {
        let mut p = page();
        assert_eq!(p.send(Event::key(KeyCode::Escape)), ModalResponse::default());
    }

    #[test]
    fn scroll_lock_held_until_last_close() {
        let mut p = page();
        p.send(Event::click(p.card_a));
        p.manager.open_by_id(&mut p.tree, "modal-b");
        p.send(Event::click(p.close_a));
        assert!(p.tree.is_scroll_locked());
        p.send(Event::click(p.close_b));
        assert!(!p.tree.is_scroll_locked());
    }

    #[test]
    fn tab_wraps_only_when_armed() {
        let mut p = page();
        let arm = p.send(Event::click(p.card_a)).arm.unwrap();
        p.tree.focus(p.link_a);
        // not armed yet: Tab passes through
        assert_eq!(p.send(Event::key(KeyCode::Tab)), ModalResponse::default());

        p.manager.arm_trap(&mut p.tree, arm.token);
        p.tree.focus(p.link_a);
        let resp = p.send(Event::key(KeyCode::Tab));
        assert_eq!(resp.outcome, Outcome::Consumed);
        assert_eq!(resp.action, Some(ModalAction::FocusWrapped(p.key(p.modal_a))));
        assert_eq!(p.tree.focused(), Some(p.close_a));

        let back = KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT);
        assert_eq!(p.send(Event::Key(back)).outcome, Outcome::Consumed);
        assert_eq!(p.tree.focused(), Some(p.link_a));
    }

    #[test]
    fn closed_before_timer_never_steals_focus() {
        let mut p = page();
        p.tree.focus(p.card_a);
        let arm = p.send(Event::click(p.card_a)).arm.unwrap();
        p.send(Event::key(KeyCode::Escape));
        p.tree.focus(p.outside);

        assert_eq!(p.manager.arm_trap(&mut p.tree, arm.token), None);
        assert_eq!(p.tree.focused(), Some(p.outside));
    }

    #[test]
    fn unknown_id_open_is_none() {
        let mut p = page();
        assert_eq!(p.manager.open_by_id(&mut p.tree, "nope"), None);
        assert_eq!(p.manager.open_count(), 0);
    }

    #[derive(Debug, Clone)]
    enum Step {
        ClickCard(usize),
        ClickClose(usize),
        ClickBackdrop(usize),
        Escape,
        Tab(bool),
        Enter,
        FireTimer,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..3).prop_map(Step::ClickCard),
            (0usize..2).prop_map(Step::ClickClose),
            (0usize..2).prop_map(Step::ClickBackdrop),
            Just(Step::Escape),
            any::<bool>().prop_map(Step::Tab),
            Just(Step::Enter),
            Just(Step::FireTimer),
        ]
    }

    proptest! {
        #[test]
        fn aria_hidden_tracks_active(steps in proptest::collection::vec(step(), 0..48)) {
            let mut p = page();
            let cards = [p.card_a, p.card_b, p.orphan];
            let closes = [p.close_a, p.close_b];
            let modals = [p.modal_a, p.modal_b];
            let mut pending = Vec::new();

            for s in steps {
                let event = match s {
                    Step::ClickCard(i) => Some(Event::click(cards[i])),
                    Step::ClickClose(i) => Some(Event::click(closes[i])),
                    Step::ClickBackdrop(i) => Some(Event::click(modals[i])),
                    Step::Escape => Some(Event::key(KeyCode::Escape)),
                    Step::Tab(shift) => {
                        let mods = if shift { Modifiers::SHIFT } else { Modifiers::empty() };
                        Some(Event::Key(KeyEvent::new(KeyCode::Tab).with_modifiers(mods)))
                    }
                    Step::Enter => Some(Event::key(KeyCode::Enter)),
                    Step::FireTimer => {
                        if let Some(token) = pending.pop() {
                            p.manager.arm_trap(&mut p.tree, token);
                        }
                        None
                    }
                };
                if let Some(event) = event
                    && let Some(arm) = p.send(event).arm
                {
                    pending.push(arm.token);
                }

                prop_assert!(p.aria_consistent());
                prop_assert_eq!(p.tree.is_scroll_locked(), p.manager.open_count() > 0);
                for &m in &modals {
                    prop_assert_eq!(p.is_active(m), p.manager.is_open(p.key(m)));
                }
            }
        }
    }
}
