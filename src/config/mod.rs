//! Configuration management
//!
//! Settings are layered, lowest to highest priority:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//!
//! # Usage
//!
//! ```no_run
//! use webresource::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Allowed content types: {:?}", config.content.allowed_content_types);
//! ```
//!
//! # Environment Variables
//!
//! Overrides follow the pattern `WEBRESOURCE__<section>__<key>`:
//! - `WEBRESOURCE__HTTP__MAX_REDIRECTS=10`
//! - `WEBRESOURCE__CONTENT__ALLOW_UNKNOWN_RESOURCE_TYPES=false`
//! - `WEBRESOURCE__CONTENT__ALLOWED_CONTENT_TYPES=text/html,application/json`
//!
//! # Configuration File
//!
//! Loaded from `config/webresource.toml` unless `WEBRESOURCE_CONFIG` points elsewhere.

mod models;
mod sources;
mod validation;

pub use models::{ClientConfig, Config, ContentConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Re-check settings, e.g. after applying command-line overrides
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}
