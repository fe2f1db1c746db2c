//! Error types for the Tenantry CLI.

use std::fmt;
use tenantry::TenantryError;
use tenantry::config::ConfigError;
use tenantry::publish::PublishError;
use tenantry::tenancy::TenantError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation
    Config(ConfigError),

    /// Planning or copying failed
    Publish(PublishError),

    /// Resolver wiring failed
    Tenant(TenantError),

    /// Output could not be serialized
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Publish(e) => write!(f, "Publish error: {}", e),
            CliError::Tenant(e) => write!(f, "Tenancy error: {}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Publish(e) => Some(e),
            CliError::Tenant(e) => Some(e),
            CliError::Json(e) => Some(e),
        }
    }
}

impl From<TenantryError> for CliError {
    fn from(e: TenantryError) -> Self {
        match e {
            TenantryError::Config(e) => CliError::Config(e),
            TenantryError::Tenant(e) => CliError::Tenant(e),
            TenantryError::Publish(e) => CliError::Publish(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<PublishError> for CliError {
    fn from(e: PublishError) -> Self {
        CliError::Publish(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
