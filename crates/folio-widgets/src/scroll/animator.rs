#![forbid(unsafe_code)]

use folio_core::{NodeId, UiTree};
use tracing::{debug, trace};

use super::easing::ease_in_out_cubic;

/// Identifies one scroll animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

impl RunToken {
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Result of feeding one frame to the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The run needs another frame.
    Continue,
    /// The run reached its duration; the viewport sits on the target.
    Finished,
    /// The token does not belong to the current run. Nothing was touched.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct ScrollRun {
    token: RunToken,
    /// Timestamp of the first frame, set lazily like `requestAnimationFrame`.
    started_at: Option<f64>,
    start: f64,
    distance: f64,
}

/// Eased scroll-to-element animation.
///
/// # Invariants
///
/// - At most one run is current; only its token advances the viewport.
/// - Progress is clamped to `[0, 1]`, so the viewport never passes the
///   target captured at start.
/// - The frame on which `elapsed >= duration` applies progress 1 exactly.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    duration_ms: f64,
    next_token: u64,
    run: Option<ScrollRun>,
}

impl ScrollAnimator {
    /// Animator with the given duration and cubic ease-in-out.
    #[must_use]
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            next_token: 1,
            run: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Whether a run is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Token of the run in progress.
    #[must_use]
    pub fn current(&self) -> Option<RunToken> {
        self.run.map(|r| r.token)
    }

    /// Begin scrolling toward `target`'s top edge.
    ///
    /// Captures the current offset and the target position now; later layout
    /// changes do not retarget the run. Any earlier run becomes stale.
    pub fn start<T: UiTree + ?Sized>(&mut self, tree: &T, target: NodeId) -> RunToken {
        let token = RunToken(self.next_token);
        self.next_token += 1;

        let start = tree.scroll_y();
        let destination = tree.offset_top(target);
        if let Some(prev) = self.run {
            debug!(superseded = prev.token.0, "scroll run superseded");
        }
        debug!(token = token.0, start, destination, "scroll run started");

        self.run = Some(ScrollRun {
            token,
            started_at: None,
            start,
            distance: destination - start,
        });
        token
    }

    /// Advance the run identified by `token` to frame time `now_ms`.
    pub fn on_frame<T: UiTree + ?Sized>(
        &mut self,
        tree: &mut T,
        token: RunToken,
        now_ms: f64,
    ) -> FrameOutcome {
        let Some(run) = self.run.as_mut().filter(|r| r.token == token) else {
            trace!(token = token.0, "stale scroll frame");
            return FrameOutcome::Stale;
        };

        let started_at = *run.started_at.get_or_insert(now_ms);
        let elapsed = now_ms - started_at;
        let offset = run.start + run.distance * ease_in_out_cubic(elapsed / self.duration_ms);
        tree.scroll_to(offset);
        trace!(token = token.0, elapsed, offset, "scroll frame");

        if elapsed < self.duration_ms {
            FrameOutcome::Continue
        } else {
            debug!(token = token.0, "scroll run finished");
            self.run = None;
            FrameOutcome::Finished
        }
    }
}
