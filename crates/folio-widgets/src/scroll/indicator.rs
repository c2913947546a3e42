#![forbid(unsafe_code)]

use folio_core::config::IndicatorConfig;
use folio_core::{NodeId, UiTree};

/// Dims the scroll indicator once the page has scrolled past a threshold.
///
/// Recomputed on every scroll event, no debouncing. Without an indicator
/// element every call is a no-op.
#[derive(Debug, Clone)]
pub struct ScrollIndicator {
    node: Option<NodeId>,
    threshold: f64,
    visible_opacity: String,
    hidden_opacity: String,
}

impl ScrollIndicator {
    /// Indicator bound to `node`, or a permanent no-op for `None`.
    #[must_use]
    pub fn new(node: Option<NodeId>, config: &IndicatorConfig) -> Self {
        Self {
            node,
            threshold: config.threshold,
            visible_opacity: config.visible_opacity.clone(),
            hidden_opacity: config.hidden_opacity.clone(),
        }
    }

    /// Opacity for a given scroll offset.
    #[must_use]
    pub fn opacity_for(&self, scroll_y: f64) -> &str {
        if scroll_y > self.threshold {
            &self.hidden_opacity
        } else {
            &self.visible_opacity
        }
    }

    /// Apply the opacity for the tree's current offset.
    ///
    /// Returns the value written, or `None` when there is no indicator.
    pub fn on_scroll<T: UiTree + ?Sized>(&self, tree: &mut T) -> Option<&str> {
        let node = self.node?;
        let opacity = self.opacity_for(tree.scroll_y());
        tree.set_style(node, "opacity", opacity);
        Some(opacity)
    }
}
