#![forbid(unsafe_code)]

//! Core types for the Folio page interaction layer.
//!
//! Everything here is backend-neutral. Reactors in `folio-widgets` talk to the
//! page only through the [`UiTree`] trait, so the same logic drives a live
//! browser document (`folio-web`) and the headless [`MemoryTree`] used in tests.

pub mod config;
pub mod event;
pub mod focusable;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod lookup;
pub mod memory;
pub mod selector;
pub mod tree;

pub use config::{CompiledSelectors, ConfigError, PageConfig};
pub use event::{ClickEvent, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, Outcome};
pub use lookup::LookupError;
pub use memory::{ElementSpec, MemoryTree};
pub use selector::Selector;
pub use tree::{NodeId, UiTree};
