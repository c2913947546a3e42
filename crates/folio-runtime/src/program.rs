#![forbid(unsafe_code)]

//! Messages into a page and commands out of it.

use folio_core::{Event, Outcome};
use folio_widgets::{RunToken, TrapToken};

/// Input to [`Page::update`](crate::Page::update).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Msg {
    /// A user or viewport event.
    Input(Event),
    /// An animation frame requested with [`Cmd::RequestFrame`].
    Frame {
        token: RunToken,
        /// Frame timestamp in milliseconds (`requestAnimationFrame` time).
        now_ms: f64,
    },
    /// A timer set with [`Cmd::SetTimeout`] has fired.
    Timer(TimerTask),
}

/// Work scheduled through a one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Arm the focus trap of a freshly opened modal.
    ArmFocusTrap(TrapToken),
}

/// Side effects the host performs on the page's behalf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    #[default]
    None,
    Batch(Vec<Cmd>),
    /// Deliver `Msg::Frame` with this token on the next animation frame.
    RequestFrame(RunToken),
    /// Deliver `Msg::Timer(task)` after `delay_ms`.
    SetTimeout { delay_ms: u32, task: TimerTask },
}

impl Cmd {
    /// Combine commands, dropping `None`s.
    #[must_use]
    pub fn batch(cmds: impl IntoIterator<Item = Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Flatten into leaf commands, in issue order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Cmd> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Cmd>) {
        match self {
            Self::None => {}
            Self::Batch(cmds) => {
                for cmd in cmds {
                    cmd.flatten_into(out);
                }
            }
            leaf => out.push(leaf),
        }
    }
}

/// Result of one [`Page::update`](crate::Page::update).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    /// `Consumed` asks the host to prevent the event's default action.
    pub outcome: Outcome,
    pub cmd: Cmd,
}

impl Update {
    #[must_use]
    pub fn new(outcome: Outcome, cmd: Cmd) -> Self {
        Self { outcome, cmd }
    }

    #[must_use]
    pub fn cmd(cmd: Cmd) -> Self {
        Self {
            outcome: Outcome::Ignored,
            cmd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(delay_ms: u32) -> Cmd {
        Cmd::SetTimeout {
            delay_ms,
            task: TimerTask::ArmFocusTrap(trap_token()),
        }
    }

    fn trap_token() -> TrapToken {
        use folio_core::{ElementSpec, MemoryTree, PageConfig};
        use folio_widgets::{ModalManager, ModalRegistry};

        let mut tree = MemoryTree::new();
        let body = tree.root();
        tree.append(body, ElementSpec::new("div").class("modal").id("m"));
        let cfg = PageConfig::default();
        let selectors = cfg.compile_selectors().unwrap();
        let registry = ModalRegistry::build(&tree, &selectors, &cfg.selectors);
        let mut manager = ModalManager::new(registry, 0);
        manager.open_by_id(&mut tree, "m").unwrap().token
    }

    #[test]
    fn batch_drops_none() {
        assert_eq!(Cmd::batch([Cmd::None, Cmd::None]), Cmd::None);
        assert_eq!(Cmd::batch([Cmd::None, timer(5)]), timer(5));
        assert!(matches!(
            Cmd::batch([timer(1), Cmd::None, timer(2)]),
            Cmd::Batch(v) if v.len() == 2
        ));
    }

    #[test]
    fn into_vec_flattens_in_order() {
        let nested = Cmd::Batch(vec![
            timer(1),
            Cmd::Batch(vec![Cmd::None, timer(2)]),
            timer(3),
        ]);
        let delays: Vec<u32> = nested
            .into_vec()
            .into_iter()
            .map(|c| match c {
                Cmd::SetTimeout { delay_ms, .. } => delay_ms,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(delays, vec![1, 2, 3]);
    }
}
