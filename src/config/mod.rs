//! Configuration management for pdfdesk
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use pdfdesk::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Artifacts stored in: {}", config.storage.root_dir.display());
//! ```
//!
//! # Environment Variables
//!
//! Pattern: `PDFDESK__<section>__<key>`
//!
//! - `PDFDESK__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `PDFDESK__STORAGE__ROOT_DIR=/srv/pdfdesk/out`
//! - `PDFDESK__LEDGER__LOCK_TIMEOUT_MS=2000`
//!
//! # Configuration File
//!
//! Loaded from `config/pdfdesk.toml` unless `PDFDESK_CONFIG` points elsewhere.

mod models;
mod sources;
mod validation;

pub use models::{Config, LedgerConfig, OutputStoreConfig, ServerConfig};
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
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
