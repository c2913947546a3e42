#![forbid(unsafe_code)]

//! Browser host for Folio pages.
//!
//! Call [`boot`] once the document has loaded:
//!
//! ```js
//! import init, { boot } from "./pkg/folio_web.js";
//! await init();
//! boot();
//! ```
//!
//! Configuration is read from `<body data-folio-config='{"timing": {...}}'>`
//! (JSON, every field optional) and the console log level from
//! `<body data-folio-log="debug">`.

pub mod console;
pub mod dom;
mod error;
mod host;

pub use dom::DomTree;
pub use error::DomError;
pub use host::{CONFIG_ATTRIBUTE, LOG_ATTRIBUTE};

use tracing::Level;
use wasm_bindgen::prelude::*;

/// Attach the page reactors to the current document.
///
/// # Errors
///
/// Fails only when there is no `window`, `document` or `<body>`. Missing page
/// elements just disable the reactor that needs them, and an unreadable
/// configuration falls back to the defaults.
#[wasm_bindgen]
pub fn boot() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or(DomError::NoWindow)?;
    let document = window.document().ok_or(DomError::NoDocument)?;
    let body = document.body().ok_or(DomError::NoBody)?;

    let level = body
        .get_attribute(LOG_ATTRIBUTE)
        .and_then(|raw| raw.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    console::init(level);

    let config = host::read_config(&body);
    host::start(window, document, &config)?;
    Ok(())
}
