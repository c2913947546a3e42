#![forbid(unsafe_code)]

//! Element bindings resolved once when a page is attached.
//!
//! Missing elements disable the reactor that needs them; they are logged
//! here, once, and never looked up again.

use folio_core::lookup::{self, LookupError};
use folio_core::{ConfigError, NodeId, PageConfig, UiTree};
use tracing::{debug, warn};

use crate::modal::ModalRegistry;

/// The scroll trigger and the section it scrolls to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBinding {
    pub trigger: NodeId,
    pub target: NodeId,
}

/// Every element the page reactors act on.
#[derive(Debug, Clone)]
pub struct PageBindings {
    /// `None` disables the scroll animator.
    pub scroll: Option<ScrollBinding>,
    /// `None` disables the scroll indicator.
    pub indicator: Option<NodeId>,
    pub modals: ModalRegistry,
}

impl PageBindings {
    /// Resolve bindings for `config` against `tree`.
    ///
    /// # Errors
    ///
    /// Only configuration problems are errors. Absent elements are not.
    pub fn build<T: UiTree + ?Sized>(tree: &T, config: &PageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let selectors = config.compile_selectors()?;

        let scroll = match (
            lookup::find(tree, &selectors.scroll_trigger),
            lookup::find(tree, &selectors.scroll_target),
        ) {
            (Ok(trigger), Ok(target)) => Some(ScrollBinding { trigger, target }),
            (trigger, target) => {
                for err in [trigger.err(), target.err()].into_iter().flatten() {
                    warn!(error = %err, "scroll animation disabled");
                }
                None
            }
        };

        // The indicator is optional in the stock markup.
        let indicator = lookup::find(tree, &selectors.scroll_indicator)
            .inspect_err(|err: &LookupError| debug!(error = %err, "scroll indicator disabled"))
            .ok();

        let modals = ModalRegistry::build(tree, &selectors, &config.selectors);
        Ok(Self {
            scroll,
            indicator,
            modals,
        })
    }
}
