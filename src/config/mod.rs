//! Configuration management for the audio proxy
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use audioproxy::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `AUDIOPROXY__<section>__<key>`
//!
//! Examples:
//! - `AUDIOPROXY__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `AUDIOPROXY__PROXY__ALLOWED_ORIGINS=mp3d.jamendo.com,storage.jamendo.com`
//! - `AUDIOPROXY__STORAGE__PROVIDER=local`
//!
//! S3 credentials are read only from `S3_ACCESS_KEY` / `S3_SECRET_KEY`
//! (or the AWS-style names).
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/audioproxy.toml`.
//! This can be overridden using the `AUDIOPROXY_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{
    Config, DEFAULT_ALLOWED_ORIGINS, ProxyConfig, ServerConfig, StorageConfig, StorageProvider,
};
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
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`AUDIOPROXY__*`)
    /// 2. TOML file (default: `config/audioproxy.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (empty allow-list, missing S3 credentials, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, still honoring environment overrides
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load(Some(path))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Validate a configuration built in code
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }
}
