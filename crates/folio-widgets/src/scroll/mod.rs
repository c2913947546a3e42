#![forbid(unsafe_code)]

//! Scroll-to-section animation and scroll-indicator dimming.
//!
//! # Animation
//!
//! [`ScrollAnimator`] moves the viewport from its current offset to a target
//! element's top edge over a fixed duration, remapping time through
//! [`ease_in_out_cubic`]. The host calls
//! [`ScrollAnimator::on_frame`] once per rendering frame with the frame
//! timestamp until it stops returning [`FrameOutcome::Continue`].
//!
//! Each run is identified by a [`RunToken`]. Starting a new run invalidates
//! the previous token, so frame callbacks still queued for an older run are
//! answered with [`FrameOutcome::Stale`] and touch nothing.

mod animator;
mod easing;
mod indicator;

pub use animator::{FrameOutcome, RunToken, ScrollAnimator};
pub use easing::ease_in_out_cubic;
pub use indicator::ScrollIndicator;
