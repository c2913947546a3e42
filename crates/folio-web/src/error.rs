#![forbid(unsafe_code)]

use folio_core::ConfigError;
use wasm_bindgen::JsValue;

/// Failures of the browser host.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("no global `window`")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A DOM call threw.
    #[error("javascript error: {0}")]
    Js(String),
}

impl DomError {
    pub(crate) fn js(value: &JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<DomError> for JsValue {
    fn from(err: DomError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
