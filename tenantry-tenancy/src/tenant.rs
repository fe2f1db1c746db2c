//! Tenant Context
//!
//! The tenant handle and the request-scoped, write-once cell that holds it.

use crate::TenantError;
use crate::context::TenantContextResolver;
use crate::request::TenantRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Tenant information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    /// Unique tenant identifier
    pub id: String,

    /// Tenant name/slug
    pub name: String,

    /// Host the tenant is served on
    pub domain: Option<String>,

    /// Whether tenant is active
    pub active: bool,

    /// Strategy-specific attributes
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Tenant {
    /// Create a new tenant
    ///
    /// # Examples
    ///
    /// ```
    /// use tenantry_tenancy::Tenant;
    ///
    /// let tenant = Tenant::new("tenant-123", "acme-corp");
    /// assert!(tenant.active);
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            domain: None,
            active: true,
            metadata: HashMap::new(),
        }
    }

    /// Set tenant domain (stored lower-cased)
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into().to_ascii_lowercase());
        self
    }

    /// Set active status
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The active tenant of one request.
///
/// A fresh context is created per request. It is written at most once; every
/// later read, including reads through clones, returns that same value.
/// "Resolved to no tenant" is a value like any other and is cached too.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    cell: Arc<OnceCell<Option<Tenant>>>,
}

impl TenantContext {
    /// Create an unresolved context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that is already resolved
    pub fn resolved(tenant: Option<Tenant>) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(tenant))),
        }
    }

    /// Resolve on first call; later calls return the cached result without
    /// running the resolver again.
    pub async fn resolve_with(
        &self,
        resolver: &TenantContextResolver,
        request: &TenantRequest,
    ) -> Option<&Tenant> {
        self.cell
            .get_or_init(|| resolver.resolve(request))
            .await
            .as_ref()
    }

    /// Bind the tenant directly
    ///
    /// Fails with [`TenantError::AlreadyResolved`] if a value is already bound.
    pub fn set(&self, tenant: Option<Tenant>) -> Result<(), TenantError> {
        self.cell
            .set(tenant)
            .map_err(|_| TenantError::AlreadyResolved)
    }

    /// Get tenant
    pub fn tenant(&self) -> Option<&Tenant> {
        self.cell.get().and_then(Option::as_ref)
    }

    /// Get tenant ID
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant().map(|t| t.id.as_str())
    }

    /// Check if tenant is set
    pub fn has_tenant(&self) -> bool {
        self.tenant().is_some()
    }

    /// Whether resolution has happened, whatever its outcome
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}
