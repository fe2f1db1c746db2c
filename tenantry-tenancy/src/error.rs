//! Tenant resolution errors.

/// Tenant resolution errors
///
/// Only [`TenantContextResolver::try_resolve`](crate::TenantContextResolver::try_resolve)
/// and configuration-time helpers surface these; request handling sees a
/// plain `Option<Tenant>`.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("Invalid tenant identifier: {0}")]
    Invalid(String),

    #[error("Tenant is inactive")]
    Inactive,

    /// The backing store did not answer the reachability probe.
    #[error("Tenant store unavailable: {0}")]
    StoreUnavailable(String),

    /// The tenant registry table has not been created yet.
    #[error("Tenant registry table `{0}` does not exist")]
    RegistryMissing(String),

    /// The configured strategy returned an error or panicked.
    #[error("Tenant resolver failed: {0}")]
    StrategyFailure(String),

    #[error("Unknown tenant resolver strategy: {0}")]
    UnknownStrategy(String),

    #[error("Tenant context already resolved for this request")]
    AlreadyResolved,
}
