//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, merging or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A key was requested that neither the defaults nor the overrides define.
    #[error("Configuration key not found: {0}")]
    KeyNotFound(String),

    /// A configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not map to a known format.
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is present but violates a constraint.
    #[error("Invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Failed to load .env file: {0}")]
    Dotenv(String),
}

impl ConfigError {
    /// Shorthand for an [`ConfigError::InvalidValue`].
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
