#![forbid(unsafe_code)]

//! Page configuration as data.
//!
//! [`PageConfig`] holds the markup contract (selectors and attribute names),
//! animation timing, and scroll-indicator thresholds. Every field has a
//! default matching the stock portfolio template, so an empty TOML or JSON
//! document is a valid configuration.
//!
//! ```
//! use folio_core::PageConfig;
//!
//! let cfg = PageConfig::from_toml_str(
//!     r#"
//!     [timing]
//!     scroll_duration_ms = 800.0
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(cfg.timing.scroll_duration_ms, 800.0);
//! assert_eq!(cfg.timing.focus_trap_delay_ms, 250);
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Parse error | Malformed TOML/JSON, wrong field type | `ConfigError::Toml` / `ConfigError::Json` |
//! | Bad selector | Unsupported selector grammar | `ConfigError::Invalid` |
//! | Bad timing | Non-positive or non-finite duration | `ConfigError::Invalid` |

use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// Errors from loading or validating a [`PageConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Complete page configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub selectors: SelectorConfig,
    pub timing: TimingConfig,
    pub indicator: IndicatorConfig,
}

/// Markup contract: which elements play which role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub scroll_trigger: String,
    pub scroll_target: String,
    pub scroll_indicator: String,
    pub project_card: String,
    /// Region inside a card whose clicks must not open the modal
    /// (embedded video links).
    pub card_ignore: String,
    pub modal: String,
    pub close: String,
    /// Card attribute naming the modal id it opens.
    pub modal_attribute: String,
    /// Class marking a modal visible.
    pub active_class: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            scroll_trigger: ".scroll-button".into(),
            scroll_target: "#projects".into(),
            scroll_indicator: ".scroll-indicator".into(),
            project_card: ".project-card".into(),
            card_ignore: ".youtube-link".into(),
            modal: ".modal".into(),
            close: ".close-modal".into(),
            modal_attribute: "data-modal".into(),
            active_class: "active".into(),
        }
    }
}

/// Animation and deferral timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub scroll_duration_ms: f64,
    /// Delay between opening a modal and arming its focus trap.
    pub focus_trap_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scroll_duration_ms: 1200.0,
            focus_trap_delay_ms: 250,
        }
    }
}

/// Scroll-indicator dimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Scroll offset above which the indicator is hidden.
    pub threshold: f64,
    pub visible_opacity: String,
    pub hidden_opacity: String,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            visible_opacity: "0.5".into(),
            hidden_opacity: "0".into(),
        }
    }
}

/// Selectors parsed once from a [`SelectorConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSelectors {
    pub scroll_trigger: Selector,
    pub scroll_target: Selector,
    pub scroll_indicator: Selector,
    pub project_card: Selector,
    pub card_ignore: Selector,
    pub modal: Selector,
    pub close: Selector,
}

impl PageConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Toml`] on malformed input, [`ConfigError::Invalid`] when
    /// validation fails.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] on malformed input, [`ConfigError::Invalid`] when
    /// validation fails.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Compact JSON form, the same shape [`Self::from_json_str`] reads.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check timing ranges, selector grammar and attribute names.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let duration = self.timing.scroll_duration_ms;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "timing.scroll_duration_ms",
                reason: format!("must be a positive number, got {duration}"),
            });
        }
        let threshold = self.indicator.threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "indicator.threshold",
                reason: format!("must be a non-negative number, got {threshold}"),
            });
        }
        if self.selectors.modal_attribute.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "selectors.modal_attribute",
                reason: "must not be empty".into(),
            });
        }
        if self.selectors.active_class.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "selectors.active_class",
                reason: "must not be empty".into(),
            });
        }
        self.compile_selectors().map(drop)
    }

    /// Parse every selector string.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first selector that fails to parse.
    pub fn compile_selectors(&self) -> Result<CompiledSelectors, ConfigError> {
        let s = &self.selectors;
        Ok(CompiledSelectors {
            scroll_trigger: parse_field("selectors.scroll_trigger", &s.scroll_trigger)?,
            scroll_target: parse_field("selectors.scroll_target", &s.scroll_target)?,
            scroll_indicator: parse_field("selectors.scroll_indicator", &s.scroll_indicator)?,
            project_card: parse_field("selectors.project_card", &s.project_card)?,
            card_ignore: parse_field("selectors.card_ignore", &s.card_ignore)?,
            modal: parse_field("selectors.modal", &s.modal)?,
            close: parse_field("selectors.close", &s.close)?,
        })
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<Selector, ConfigError> {
    Selector::parse(raw).map_err(|err| ConfigError::Invalid {
        field,
        reason: err.to_string(),
    })
}
