#![forbid(unsafe_code)]

//! JSON structured logging for native hosts (feature `tracing-json`).
//!
//! The filter is read from `FOLIO_LOG` (standard `EnvFilter` syntax) and
//! defaults to `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "FOLIO_LOG";

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

/// Install a JSON `fmt` subscriber as the global default.
///
/// # Errors
///
/// Returns [`LoggingError`] if a global subscriber is already installed.
pub fn init_json() -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
        .map_err(|err| LoggingError(err.to_string()))
}
