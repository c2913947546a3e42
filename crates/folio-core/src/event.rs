#![forbid(unsafe_code)]

//! Input events delivered to the page reactors.
//!
//! The browser adapter translates DOM events into these types; the headless
//! driver constructs them directly. Keyboard events carry no target: they are
//! routed to whatever element currently holds focus in the [`UiTree`].
//!
//! [`UiTree`]: crate::tree::UiTree

use bitflags::bitflags;

use crate::tree::NodeId;

/// A backend-neutral input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Keyboard input aimed at the focused element.
    Key(KeyEvent),
    /// Pointer activation on the innermost hit element.
    Click(ClickEvent),
    /// The viewport scroll offset changed.
    Scroll,
}

impl Event {
    /// Shorthand for a key press without modifiers.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }

    /// Shorthand for a click on `target`.
    #[must_use]
    pub const fn click(target: NodeId) -> Self {
        Self::Click(ClickEvent { target })
    }
}

/// Pointer activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Innermost element under the pointer (DOM `event.target`).
    pub target: NodeId,
}

/// Keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Logical key.
    pub code: KeyCode,
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// Press, repeat or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Replace the modifier set.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// `keydown` semantics: presses and auto-repeats both count.
    #[inline]
    #[must_use]
    pub fn is_down(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Forward Tab (no Shift).
    #[must_use]
    pub fn is_tab(&self) -> bool {
        self.code == KeyCode::Tab && !self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Shift+Tab, in either of its encodings.
    #[must_use]
    pub fn is_back_tab(&self) -> bool {
        self.code == KeyCode::BackTab
            || (self.code == KeyCode::Tab && self.modifiers.contains(Modifiers::SHIFT))
    }

    /// Enter or Space: the keys that activate a button-like element.
    #[must_use]
    pub fn is_activation(&self) -> bool {
        matches!(self.code, KeyCode::Enter | KeyCode::Char(' '))
    }
}

/// Logical key codes the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Enter,
    Escape,
    Tab,
    /// Shift+Tab as reported by backends that fold Shift into the code.
    BackTab,
    Char(char),
    /// Any key the page has no use for.
    Other,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` value.
    ///
    /// Legacy spellings (`"Esc"`, `"Spacebar"`) are normalized.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            " " | "Spacebar" => Self::Char(' '),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// Key event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Whether a reactor consumed an event.
///
/// `Consumed` tells the host to suppress the platform default action
/// (`preventDefault` in the browser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Ignored,
    Consumed,
}

impl Outcome {
    #[inline]
    #[must_use]
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }

    /// `Consumed` if either side is.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        if self.is_consumed() { self } else { other }
    }
}
