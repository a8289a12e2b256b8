//! Configuration management for the triage engine
//!
//! Supports loading configuration from:
//! - TOML/YAML files (`config/default`, `config/{env}`)
//! - Environment variables (`TRIAGE__` prefix, `__` separator)
//! - Built-in defaults from [`constants`]
//!
//! Provider API keys default to `GROQ_API_KEY` / `MINIMAX_API_KEY`.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, ClassificationConfig, DialogueConfig, ExtractionConfig,
    ObservabilityConfig, ProviderConfig, ProvidersConfig, RegistryConfig, RuntimeEnvironment,
    Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::MissingField(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

impl From<ConfigError> for triage_core::Error {
    fn from(err: ConfigError) -> Self {
        triage_core::Error::Config(err.to_string())
    }
}
