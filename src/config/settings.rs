//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! section is optional; missing sections and fields take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use surebet::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use super::logging::LoggingConfig;
use crate::domain::{
    ConfidenceConfig, Detector, EngineConfig, SanityConfig, ScheduleConfig, SourcesConfig,
    MAX_GRACE_MINUTES,
};
use crate::error::{ConfigError, Result};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bankroll, minimum profit and market width.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Profit thresholds for warning levels.
    #[serde(default)]
    pub confidence: ConfidenceConfig,

    /// Price band and implied-probability floor.
    #[serde(default)]
    pub sanity: SanityConfig,

    /// Source whitelist.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Pre-match filtering.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load the file when it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for an existing file.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "level" }.into());
        }

        if self.engine.total_stake <= Decimal::ZERO {
            return Err(invalid("total_stake", "must be greater than 0"));
        }
        if self.engine.min_profit_pct < Decimal::ZERO {
            return Err(invalid("min_profit_pct", "must be 0 or greater"));
        }
        if self.engine.max_outcomes < 2 {
            return Err(invalid("max_outcomes", "must be at least 2"));
        }

        if !self.confidence.is_ordered() {
            return Err(invalid(
                "confidence",
                "thresholds must satisfy 0 <= verify_above <= moderate_above <= critical_above",
            ));
        }

        let sanity = &self.sanity;
        if sanity.min_price < Decimal::ONE {
            return Err(invalid("min_price", "must be 1.0 or greater"));
        }
        if sanity.max_price < sanity.min_price {
            return Err(invalid("max_price", "must be >= min_price"));
        }
        if sanity.min_implied_probability < Decimal::ZERO
            || sanity.min_implied_probability >= Decimal::ONE
        {
            return Err(invalid("min_implied_probability", "must be in [0, 1)"));
        }

        if self.sources.allowed.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid("allowed", "source names cannot be empty"));
        }

        if !(0..=MAX_GRACE_MINUTES).contains(&self.schedule.grace_minutes) {
            return Err(invalid("grace_minutes", "must be between 0 and 10080 (one week)"));
        }

        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Build a detector from the engine, confidence, sanity and source settings.
    #[must_use]
    pub fn detector(&self) -> Detector {
        Detector::new(self.engine.clone(), self.confidence.clone())
            .with_sanity(self.sanity.clone())
            .with_sources(self.sources.clone())
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
