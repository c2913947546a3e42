#![forbid(unsafe_code)]

//! Stack of open modals with per-entry focus memory.
//!
//! The `ModalStack` records open modals in LIFO order. Each entry remembers
//! the element that held focus right before its modal opened, and whether
//! the modal's focus trap has been armed yet.
//!
//! # Invariants
//!
//! - A modal key appears at most once.
//! - Close ordering is LIFO by default; `pop_key()` removes from any position.
//! - Removing a lower entry hands its saved focus to the entry directly above
//!   it, so focus memory keeps pointing outside every still-open modal.
//! - Trap tokens are unique for the lifetime of the stack.
//!
//! # Failure Modes
//!
//! - `pop()` on an empty stack returns `None` (no panic).
//! - `pop_key()` for a key not on the stack returns `None`.
//! - `arm()` with a stale token returns `None`.

use folio_core::NodeId;

use super::registry::ModalKey;

/// Identifies one deferred focus-trap arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrapToken(u64);

impl TrapToken {
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Focus-trap state of a stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapState {
    /// Waiting for the arming timer identified by the token.
    Pending(TrapToken),
    Armed,
}

/// Result returned when a modal leaves the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedModal {
    pub key: ModalKey,
    /// Element to refocus. `None` when nothing was focused before the modal
    /// opened, or when the entry was not on top (its memory moved up).
    pub restore_focus: Option<NodeId>,
    /// Whether the entry was the topmost one.
    pub was_top: bool,
}

#[derive(Debug, Clone)]
struct StackEntry {
    key: ModalKey,
    restore_focus: Option<NodeId>,
    trap: TrapState,
}

/// Open modals, bottom to top.
#[derive(Debug, Clone)]
pub struct ModalStack {
    entries: Vec<StackEntry>,
    next_token: u64,
}

impl Default for ModalStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalStack {
    /// Create an empty modal stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_token: 1,
        }
    }

    // --- Stack Operations ---

    /// Push `key` with its focus memory and a pending trap.
    ///
    /// Returns `None` without changing anything if `key` is already open.
    pub fn push(&mut self, key: ModalKey, restore_focus: Option<NodeId>) -> Option<TrapToken> {
        if self.contains(key) {
            return None;
        }
        let token = TrapToken(self.next_token);
        self.next_token += 1;
        self.entries.push(StackEntry {
            key,
            restore_focus,
            trap: TrapState::Pending(token),
        });
        Some(token)
    }

    /// Push `key` with its trap already armed.
    ///
    /// Used for modals found open when the page is attached. Returns `false`
    /// if `key` is already open.
    pub fn push_armed(&mut self, key: ModalKey, restore_focus: Option<NodeId>) -> bool {
        if self.contains(key) {
            return false;
        }
        self.entries.push(StackEntry {
            key,
            restore_focus,
            trap: TrapState::Armed,
        });
        true
    }

    /// Pop the top modal.
    pub fn pop(&mut self) -> Option<ClosedModal> {
        self.entries.pop().map(|e| ClosedModal {
            key: e.key,
            restore_focus: e.restore_focus,
            was_top: true,
        })
    }

    /// Remove `key` from any position.
    pub fn pop_key(&mut self, key: ModalKey) -> Option<ClosedModal> {
        let idx = self.entries.iter().position(|e| e.key == key)?;
        let entry = self.entries.remove(idx);
        let was_top = idx == self.entries.len();
        if was_top {
            return Some(ClosedModal {
                key,
                restore_focus: entry.restore_focus,
                was_top,
            });
        }
        // The entry above was opened from inside this modal; point its
        // memory at what this one remembered instead.
        self.entries[idx].restore_focus = entry.restore_focus;
        Some(ClosedModal {
            key,
            restore_focus: None,
            was_top,
        })
    }

    /// Pop every modal, top first.
    pub fn pop_all(&mut self) -> Vec<ClosedModal> {
        let mut closed = Vec::with_capacity(self.entries.len());
        while let Some(c) = self.pop() {
            closed.push(c);
        }
        closed
    }

    /// Arm the trap whose pending token is `token`.
    ///
    /// Returns the modal it belongs to, or `None` for a stale token.
    pub fn arm(&mut self, token: TrapToken) -> Option<ModalKey> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.trap == TrapState::Pending(token))?;
        entry.trap = TrapState::Armed;
        Some(entry.key)
    }

    // --- State Queries ---

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains(&self, key: ModalKey) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    #[must_use]
    pub fn top(&self) -> Option<ModalKey> {
        self.entries.last().map(|e| e.key)
    }

    /// Trap state of `key`, if open.
    #[must_use]
    pub fn trap_state(&self, key: ModalKey) -> Option<TrapState> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.trap)
    }

    /// Top modal, if its trap is armed.
    #[must_use]
    pub fn armed_top(&self) -> Option<ModalKey> {
        self.entries
            .last()
            .filter(|e| e.trap == TrapState::Armed)
            .map(|e| e.key)
    }

    /// Open modals, bottom to top.
    pub fn keys(&self) -> impl Iterator<Item = ModalKey> + '_ {
        self.entries.iter().map(|e| e.key)
    }
}
