//! Top-level error type.

use thiserror::Error;

/// Result type for bootstrap operations.
pub type Result<T> = std::result::Result<T, TenantryError>;

/// Errors surfaced while wiring Tenantry into a host application.
#[derive(Debug, Error)]
pub enum TenantryError {
    #[error(transparent)]
    Config(#[from] tenantry_config::ConfigError),

    #[error(transparent)]
    Tenant(#[from] tenantry_tenancy::TenantError),

    #[error(transparent)]
    Publish(#[from] tenantry_publish::PublishError),
}
