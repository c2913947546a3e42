#![forbid(unsafe_code)]

//! The page program: document plus scroll and modal reactors.

use folio_core::{ConfigError, Event, NodeId, Outcome, PageConfig, UiTree};
use folio_widgets::{
    FrameOutcome, ModalManager, ModalResponse, PageBindings, ScrollAnimator, ScrollBinding,
    ScrollIndicator,
};
use tracing::{debug, info};

use crate::program::{Cmd, Msg, TimerTask, Update};

/// A portfolio page and its interaction state.
///
/// The two reactors share nothing but the document. Every input event is
/// offered to both; their outcomes and commands are merged.
#[derive(Debug)]
pub struct Page<T> {
    tree: T,
    scroll: Option<ScrollBinding>,
    animator: ScrollAnimator,
    indicator: ScrollIndicator,
    modals: ModalManager,
}

impl<T: UiTree> Page<T> {
    /// Resolve bindings in `tree` and set up both reactors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` does not validate. Missing
    /// elements only disable the reactor that needs them.
    pub fn new(tree: T, config: &PageConfig) -> Result<Self, ConfigError> {
        let bindings = PageBindings::build(&tree, config)?;
        info!(
            scroll = bindings.scroll.is_some(),
            indicator = bindings.indicator.is_some(),
            cards = bindings.modals.cards().len(),
            modals = bindings.modals.modals().len(),
            "page bound"
        );
        Ok(Self {
            tree,
            scroll: bindings.scroll,
            animator: ScrollAnimator::new(config.timing.scroll_duration_ms),
            indicator: ScrollIndicator::new(bindings.indicator, &config.indicator),
            modals: ModalManager::new(bindings.modals, config.timing.focus_trap_delay_ms),
        })
    }

    /// Prepare the document: accessibility attributes, modals already open,
    /// and the indicator for the initial offset.
    pub fn init(&mut self) -> Cmd {
        self.modals.attach(&mut self.tree);
        self.indicator.on_scroll(&mut self.tree);
        Cmd::None
    }

    pub fn update(&mut self, msg: Msg) -> Update {
        match msg {
            Msg::Input(event) => self.on_event(event),
            Msg::Frame { token, now_ms } => match self.animator.on_frame(&mut self.tree, token, now_ms) {
                FrameOutcome::Continue => Update::cmd(Cmd::RequestFrame(token)),
                FrameOutcome::Finished | FrameOutcome::Stale => Update::default(),
            },
            Msg::Timer(TimerTask::ArmFocusTrap(token)) => {
                self.modals.arm_trap(&mut self.tree, token);
                Update::default()
            }
        }
    }

    fn on_event(&mut self, event: Event) -> Update {
        let scroll = match event {
            Event::Click(click) => self.on_click_scroll(click.target),
            Event::Scroll => {
                self.indicator.on_scroll(&mut self.tree);
                Update::default()
            }
            Event::Key(_) => Update::default(),
        };

        let ModalResponse {
            outcome,
            action,
            arm,
        } = self.modals.handle_event(&mut self.tree, &event);
        if let Some(action) = action {
            debug!(?action, "modal action");
        }
        let arm = arm.map_or(Cmd::None, |arm| Cmd::SetTimeout {
            delay_ms: arm.delay_ms,
            task: TimerTask::ArmFocusTrap(arm.token),
        });

        Update::new(scroll.outcome.or(outcome), Cmd::batch([scroll.cmd, arm]))
    }

    fn on_click_scroll(&mut self, target: NodeId) -> Update {
        let Some(binding) = self.scroll else {
            return Update::default();
        };
        if !self.tree.contains(binding.trigger, target) {
            return Update::default();
        }
        let token = self.animator.start(&self.tree, binding.target);
        Update::new(Outcome::Consumed, Cmd::RequestFrame(token))
    }

    #[must_use]
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access for hosts that move the viewport or focus themselves.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    #[must_use]
    pub fn modals(&self) -> &ModalManager {
        &self.modals
    }

    #[must_use]
    pub fn animator(&self) -> &ScrollAnimator {
        &self.animator
    }
}
