#![forbid(unsafe_code)]

//! Page reactors for Folio.
//!
//! - [`scroll`]: eased scroll-to-section animation and the scroll indicator.
//! - [`modal`]: card-bound modal dialogs with a focus-memory stack, scroll
//!   lock, and Tab focus trapping.
//! - [`bindings`]: the element registry both reactors are built from.
//!
//! Reactors never schedule anything themselves. They mutate the [`UiTree`]
//! and hand back tokens (a scroll [`RunToken`], a focus-trap [`TrapToken`])
//! that the host turns into animation frames and timers.
//!
//! [`UiTree`]: folio_core::UiTree
//! [`RunToken`]: scroll::RunToken
//! [`TrapToken`]: modal::TrapToken

pub mod bindings;
pub mod modal;
pub mod scroll;

pub use bindings::{PageBindings, ScrollBinding};
pub use modal::{
    ArmRequest, ModalAction, ModalKey, ModalManager, ModalRegistry, ModalResponse, TrapToken,
};
pub use scroll::{FrameOutcome, RunToken, ScrollAnimator, ScrollIndicator, ease_in_out_cubic};
