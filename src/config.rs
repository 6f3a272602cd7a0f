//! Configuration loading and validation.
//!
//! - [`settings`] - The top-level [`Config`] and its validation
//! - [`logging`] - Tracing subscriber setup

pub mod logging;
pub mod settings;

pub use logging::{LogFormat, LoggingConfig};
pub use settings::{Config, DEFAULT_CONFIG_PATH};
