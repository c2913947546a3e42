#![forbid(unsafe_code)]

//! Deterministic headless host.
//!
//! [`Driver`] executes a page's commands against a virtual millisecond clock.
//! Animation frames fire every `frame_interval_ms`; timers fire at their due
//! time. Callbacks due at the same instant run in the order they were
//! scheduled. Whenever a callback moves the viewport, a scroll event is fed
//! back to the page, as a browser would.
//!
//! Nothing here reads the wall clock, so replays are bit-for-bit identical.

use folio_core::{Event, Outcome, UiTree};
use folio_widgets::RunToken;
use tracing::trace;

use crate::page::Page;
use crate::program::{Cmd, Msg, TimerTask};

/// Default frame interval, roughly 60 Hz.
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;

/// Upper bound on callbacks fired by [`Driver::run_until_idle`].
const IDLE_STEP_LIMIT: usize = 100_000;

#[derive(Debug, Clone, Copy)]
enum Callback {
    Frame(RunToken),
    Timer(TimerTask),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due_ms: f64,
    seq: u64,
    callback: Callback,
}

/// Headless page host with a virtual clock.
#[derive(Debug)]
pub struct Driver<T> {
    page: Page<T>,
    now_ms: f64,
    frame_interval_ms: f64,
    queue: Vec<Scheduled>,
    next_seq: u64,
}

impl<T: UiTree> Driver<T> {
    /// Initialize `page` and execute its startup commands.
    pub fn new(page: Page<T>) -> Self {
        let mut driver = Self {
            page,
            now_ms: 0.0,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            queue: Vec::new(),
            next_seq: 0,
        };
        let cmd = driver.page.init();
        driver.execute(cmd);
        driver
    }

    /// Change the frame interval. Non-positive values are ignored.
    #[must_use]
    pub fn with_frame_interval(mut self, interval_ms: f64) -> Self {
        if interval_ms > 0.0 {
            self.frame_interval_ms = interval_ms;
        }
        self
    }

    /// Current virtual time.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[must_use]
    pub fn page(&self) -> &Page<T> {
        &self.page
    }

    #[must_use]
    pub fn tree(&self) -> &T {
        self.page.tree()
    }

    pub fn tree_mut(&mut self) -> &mut T {
        self.page.tree_mut()
    }

    /// Number of frames and timers waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Deliver an input event now.
    ///
    /// Returns the outcome; `Consumed` is where a browser would call
    /// `preventDefault()`.
    pub fn dispatch(&mut self, event: Event) -> Outcome {
        let update = self.page.update(Msg::Input(event));
        self.execute(update.cmd);
        update.outcome
    }

    /// Move the clock forward by `ms`, firing everything due on the way.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&mut self, ms: f64) -> usize {
        let until = self.now_ms + ms.max(0.0);
        let mut fired = 0;
        while let Some(idx) = self.next_due(until) {
            self.fire(idx);
            fired += 1;
        }
        self.now_ms = until;
        fired
    }

    /// Fire the next `count` animation frames, skipping the clock ahead to
    /// each one. Timers due before a frame fire first.
    ///
    /// Returns the number of frames fired.
    pub fn run_frames(&mut self, count: usize) -> usize {
        let mut frames = 0;
        while frames < count {
            let Some(idx) = self.next_due(f64::INFINITY) else {
                break;
            };
            if matches!(self.queue[idx].callback, Callback::Frame(_)) {
                frames += 1;
            }
            self.fire(idx);
        }
        frames
    }

    /// Fire callbacks until none are left.
    ///
    /// Returns the number fired. Stops after a large fixed number of steps so
    /// a page that reschedules forever cannot hang the caller.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while fired < IDLE_STEP_LIMIT {
            let Some(idx) = self.next_due(f64::INFINITY) else {
                break;
            };
            self.fire(idx);
            fired += 1;
        }
        fired
    }

    /// Index of the earliest callback due at or before `until`.
    fn next_due(&self, until: f64) -> Option<usize> {
        self.queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= until)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)
    }

    fn fire(&mut self, idx: usize) {
        let scheduled = self.queue.swap_remove(idx);
        self.now_ms = self.now_ms.max(scheduled.due_ms);
        let msg = match scheduled.callback {
            Callback::Frame(token) => Msg::Frame {
                token,
                now_ms: self.now_ms,
            },
            Callback::Timer(task) => Msg::Timer(task),
        };
        trace!(now_ms = self.now_ms, ?msg, "driver callback");

        let before = self.page.tree().scroll_y();
        let update = self.page.update(msg);
        self.execute(update.cmd);
        if self.page.tree().scroll_y() != before {
            let update = self.page.update(Msg::Input(Event::Scroll));
            self.execute(update.cmd);
        }
    }

    fn execute(&mut self, cmd: Cmd) {
        for cmd in cmd.into_vec() {
            let (due_ms, callback) = match cmd {
                Cmd::RequestFrame(token) => (self.now_ms + self.frame_interval_ms, Callback::Frame(token)),
                Cmd::SetTimeout { delay_ms, task } => (self.now_ms + f64::from(delay_ms), Callback::Timer(task)),
                Cmd::None | Cmd::Batch(_) => continue,
            };
            self.queue.push(Scheduled {
                due_ms,
                seq: self.next_seq,
                callback,
            });
            self.next_seq += 1;
        }
    }
}
