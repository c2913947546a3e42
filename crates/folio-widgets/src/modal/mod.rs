#![forbid(unsafe_code)]

//! Card-bound modal dialogs: registry, stack, focus trap, and manager.
//!
//! # State machine
//!
//! Each modal is either closed or open. [`ModalManager`] drives the
//! transitions:
//!
//! | From | To | Trigger |
//! |------|----|---------|
//! | closed | open | card click, Enter/Space on a focused card |
//! | open | closed | close-control click, backdrop click, Escape (closes all) |
//! | open | open | Tab / Shift+Tab wrap inside the armed top modal |
//!
//! # Focus Management
//!
//! - **Focus memory**: every stack entry remembers the element focused before
//!   its modal opened and gives focus back when that modal closes.
//! - **Deferred trap**: opening a modal yields an [`ArmRequest`]. When the host
//!   fires it after the configured delay, focus moves to the modal's first
//!   focusable descendant and Tab wrapping starts. A modal closed before its
//!   timer fires leaves the token stale.
//! - **Scroll lock**: held exactly while the stack is non-empty.
//!
//! # Invariants
//!
//! - For every registered modal, `active` class present ⇔ `aria-hidden="false"`.
//! - A modal appears on the stack at most once.

mod focus_trap;
mod manager;
mod registry;
mod stack;

pub use focus_trap::{focus_first, wrap_tab};
pub use manager::{ArmRequest, ModalAction, ModalManager, ModalResponse};
pub use registry::{CardBinding, ModalBinding, ModalKey, ModalRegistry};
pub use stack::{ClosedModal, ModalStack, TrapState, TrapToken};
