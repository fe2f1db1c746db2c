//! Tenant Resolution
//!
//! Strategies for picking the tenant a request belongs to. Each strategy is a
//! [`TenantResolver`]; which one runs is chosen from configuration through the
//! [`ResolverRegistry`](crate::ResolverRegistry).

use crate::TenantError;
use crate::request::TenantRequest;
use crate::store::TenantStore;
use crate::tenant::Tenant;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;

/// Tenant resolver trait
///
/// Returns `Ok(None)` when the request names no tenant or the store has no
/// match. Errors are reserved for store failures and deactivated tenants.
#[async_trait]
pub trait TenantResolver: Send + Sync {
    /// Resolve tenant from request
    async fn resolve(&self, request: &TenantRequest) -> Result<Option<Tenant>, TenantError>;
}

fn ensure_active(tenant: Option<Tenant>) -> Result<Option<Tenant>, TenantError> {
    match tenant {
        Some(tenant) if !tenant.active => Err(TenantError::Inactive),
        other => Ok(other),
    }
}

/// Domain-based tenant resolver
///
/// Looks the full request host up as a tenant domain
/// (`acme.com` -> the tenant whose domain is `acme.com`).
pub struct DomainTenantResolver {
    store: Arc<dyn TenantStore>,
}

impl DomainTenantResolver {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TenantResolver for DomainTenantResolver {
    async fn resolve(&self, request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
        let Some(host) = request.host() else {
            return Ok(None);
        };

        ensure_active(self.store.find_by_domain(host).await?)
    }
}

/// Header-based tenant resolver
///
/// Resolves tenant from a request header (e.g., `X-Tenant-ID`).
pub struct HeaderTenantResolver {
    store: Arc<dyn TenantStore>,
    header_name: String,
}

impl HeaderTenantResolver {
    /// Create new header-based resolver
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use tenantry_tenancy::{HeaderTenantResolver, InMemoryTenantStore, TenantStore};
    ///
    /// let store: Arc<dyn TenantStore> = Arc::new(InMemoryTenantStore::new());
    /// let resolver = HeaderTenantResolver::new(store, "X-Tenant-ID");
    /// ```
    pub fn new(store: Arc<dyn TenantStore>, header_name: impl Into<String>) -> Self {
        Self {
            store,
            header_name: header_name.into(),
        }
    }
}

#[async_trait]
impl TenantResolver for HeaderTenantResolver {
    async fn resolve(&self, request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
        let tenant_id = match request.header(&self.header_name).map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };

        ensure_active(self.store.find_by_id(tenant_id).await?)
    }
}

/// Subdomain-based tenant resolver
///
/// Resolves tenant from subdomain (e.g., `acme.example.com` -> tenant "acme").
pub struct SubdomainTenantResolver {
    store: Arc<dyn TenantStore>,
    base_domain: String,
}

impl SubdomainTenantResolver {
    pub fn new(store: Arc<dyn TenantStore>, base_domain: impl Into<String>) -> Self {
        Self {
            store,
            base_domain: base_domain.into().to_ascii_lowercase(),
        }
    }

    /// Extract a single-label subdomain from a normalised host
    fn extract_subdomain<'a>(&self, host: &'a str) -> Option<&'a str> {
        let subdomain = host
            .strip_suffix(self.base_domain.as_str())?
            .strip_suffix('.')?;

        if subdomain.is_empty() || subdomain.contains('.') {
            None
        } else {
            Some(subdomain)
        }
    }
}

#[async_trait]
impl TenantResolver for SubdomainTenantResolver {
    async fn resolve(&self, request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
        let Some(subdomain) = request.host().and_then(|host| self.extract_subdomain(host)) else {
            return Ok(None);
        };

        ensure_active(self.store.find_by_name(subdomain).await?)
    }
}

/// Path-based tenant resolver
///
/// Resolves tenant from URL path (e.g., `/tenants/acme/users`).
pub struct PathTenantResolver {
    store: Arc<dyn TenantStore>,
    pattern: Regex,
    group_index: usize,
}

impl PathTenantResolver {
    /// Create new path-based resolver
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use tenantry_tenancy::{InMemoryTenantStore, PathTenantResolver, TenantStore};
    ///
    /// let store: Arc<dyn TenantStore> = Arc::new(InMemoryTenantStore::new());
    /// let resolver = PathTenantResolver::new(store, r"^/tenants/([^/]+)", 1).unwrap();
    /// ```
    pub fn new(
        store: Arc<dyn TenantStore>,
        pattern: &str,
        group_index: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            store,
            pattern: Regex::new(pattern)?,
            group_index,
        })
    }
}

#[async_trait]
impl TenantResolver for PathTenantResolver {
    async fn resolve(&self, request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
        let tenant_name = self
            .pattern
            .captures(&request.path)
            .and_then(|captures| captures.get(self.group_index))
            .map(|m| m.as_str());

        match tenant_name {
            Some(name) if !name.is_empty() => ensure_active(self.store.find_by_name(name).await?),
            _ => Ok(None),
        }
    }
}
