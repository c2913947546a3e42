#![forbid(unsafe_code)]

//! Elm-style runtime for Folio pages.
//!
//! A [`Page`] owns the document and both reactors. Hosts feed it [`Msg`]s and
//! execute the [`Cmd`]s it returns:
//!
//! ```text
//! input event ──► Page::update ──► Cmd::RequestFrame ──► Msg::Frame ──┐
//!                      ▲          Cmd::SetTimeout   ──► Msg::Timer ──┤
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! The browser host lives in `folio-web`. [`Driver`] is the headless host:
//! a virtual millisecond clock that fires frames and timers deterministically.

pub mod driver;
pub mod page;
pub mod program;

pub use driver::Driver;
pub use page::Page;
pub use program::{Cmd, Msg, TimerTask, Update};
