//! Active tenant resolution.
//!
//! [`TenantContextResolver`] decides the tenant of one request:
//!
//! 1. probe the backing store; unreachable means no tenant,
//! 2. hosts on the application's own domain list get no tenant,
//! 3. a missing registry table (not migrated yet) means no tenant,
//! 4. otherwise the configured strategy decides.
//!
//! Any failure along the way, panics included, also yields no tenant. This
//! keeps request handling alive while the application is half set up, e.g.
//! before a database has been configured at all.

use crate::TenantError;
use crate::request::{TenantRequest, normalize_host};
use crate::resolver::TenantResolver;
use crate::store::RegistryProbe;
use crate::tenant::Tenant;
use futures_util::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tenantry_config::TenancyConfig;
use tracing::debug;

/// Resolves the active tenant, never failing.
pub struct TenantContextResolver {
    domains: HashSet<String>,
    registry_table: String,
    probe: Arc<dyn RegistryProbe>,
    strategy: Arc<dyn TenantResolver>,
}

impl TenantContextResolver {
    /// Create a resolver with an empty domain list and the `tenants` table
    pub fn new(probe: Arc<dyn RegistryProbe>, strategy: Arc<dyn TenantResolver>) -> Self {
        Self {
            domains: HashSet::new(),
            registry_table: "tenants".to_string(),
            probe,
            strategy,
        }
    }

    /// Create from the `domains` and `tables.tenants` settings
    pub fn from_config(
        config: &TenancyConfig,
        probe: Arc<dyn RegistryProbe>,
        strategy: Arc<dyn TenantResolver>,
    ) -> Self {
        Self::new(probe, strategy)
            .with_domains(&config.domains)
            .with_registry_table(config.tables.tenants.clone())
    }

    /// Hosts that belong to the application itself
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.domains = domains
            .into_iter()
            .filter_map(|domain| normalize_host(domain.as_ref()))
            .collect();
        self
    }

    pub fn with_registry_table(mut self, table: impl Into<String>) -> Self {
        self.registry_table = table.into();
        self
    }

    /// Whether `host` is one of the application's own domains
    pub fn is_app_domain(&self, host: &str) -> bool {
        normalize_host(host).is_some_and(|host| self.domains.contains(&host))
    }

    /// Resolve the tenant, converting every failure into `None`.
    pub async fn resolve(&self, request: &TenantRequest) -> Option<Tenant> {
        let outcome = AssertUnwindSafe(self.try_resolve(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(TenantError::StrategyFailure(
                    "tenant resolution panicked".to_string(),
                ))
            });

        match outcome {
            Ok(tenant) => {
                debug!(
                    host = request.host().unwrap_or_default(),
                    tenant = tenant.as_ref().map(|t| t.id.as_str()).unwrap_or("none"),
                    "Resolved active tenant"
                );
                tenant
            }
            Err(error) => {
                debug!(
                    host = request.host().unwrap_or_default(),
                    %error,
                    "Tenant resolution fell back to none"
                );
                None
            }
        }
    }

    /// Resolve the tenant, reporting why no tenant was found.
    ///
    /// `Ok(None)` covers the application's own domains and strategies that
    /// find nothing; the error variants name the failed step.
    pub async fn try_resolve(&self, request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
        self.probe
            .ping()
            .await
            .map_err(|e| TenantError::StoreUnavailable(e.to_string()))?;

        if request.host().is_some_and(|host| self.is_app_domain(host)) {
            return Ok(None);
        }

        let has_registry = self
            .probe
            .has_table(&self.registry_table)
            .await
            .map_err(|e| TenantError::StoreUnavailable(e.to_string()))?;
        if !has_registry {
            return Err(TenantError::RegistryMissing(self.registry_table.clone()));
        }

        self.strategy
            .resolve(request)
            .await
            .map_err(|e| TenantError::StrategyFailure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTenantStore;
    use crate::tenant::TenantContext;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed result and counts invocations.
    struct StubResolver {
        result: Result<Option<Tenant>, String>,
        calls: AtomicUsize,
    }

    impl StubResolver {
        fn returning(tenant: Option<Tenant>) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(tenant),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TenantResolver for StubResolver {
        async fn resolve(&self, _request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(TenantError::StrategyFailure)
        }
    }

    struct PanickingResolver;

    #[async_trait]
    impl TenantResolver for PanickingResolver {
        async fn resolve(&self, _request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
            panic!("resolver exploded");
        }
    }

    fn acme() -> Tenant {
        Tenant::new("tenant-1", "acme")
    }

    fn migrated_store() -> Arc<InMemoryTenantStore> {
        Arc::new(InMemoryTenantStore::new().with_table("tenants"))
    }

    fn request(host: &str) -> TenantRequest {
        TenantRequest::new("GET", "/").with_host(host)
    }

    #[tokio::test]
    async fn test_strategy_result_is_taken_verbatim() {
        let strategy = StubResolver::returning(Some(acme()));
        let resolver = TenantContextResolver::new(migrated_store(), strategy.clone())
            .with_domains(["app.test"]);

        assert_eq!(resolver.resolve(&request("acme.test")).await, Some(acme()));

        let empty = StubResolver::returning(None);
        let resolver = TenantContextResolver::new(migrated_store(), empty);
        assert_eq!(resolver.resolve(&request("acme.test")).await, None);
        assert_eq!(strategy.calls(), 1);
    }

    #[tokio::test]
    async fn test_app_domains_never_resolve() {
        let strategy = StubResolver::returning(Some(acme()));
        let resolver = TenantContextResolver::new(migrated_store(), strategy.clone())
            .with_domains(["App.Test", "admin.test"]);

        for host in ["app.test", "APP.test:8080", "admin.test"] {
            assert_eq!(resolver.resolve(&request(host)).await, None, "{host}");
        }
        assert_eq!(strategy.calls(), 0);
        assert!(resolver.is_app_domain("app.test:443"));
        assert!(!resolver.is_app_domain("acme.test"));
    }

    #[tokio::test]
    async fn test_app_domains_ignore_registry_state() {
        let strategy = StubResolver::returning(Some(acme()));
        let resolver = TenantContextResolver::new(Arc::new(InMemoryTenantStore::new()), strategy)
            .with_domains(["app.test"]);

        assert!(matches!(resolver.try_resolve(&request("app.test")).await, Ok(None)));
    }

    #[tokio::test]
    async fn test_unreachable_store() {
        let store = migrated_store();
        store.set_available(false);
        let strategy = StubResolver::returning(Some(acme()));
        let resolver = TenantContextResolver::new(store, strategy.clone());

        assert_eq!(resolver.resolve(&request("acme.test")).await, None);
        assert!(matches!(
            resolver.try_resolve(&request("acme.test")).await,
            Err(TenantError::StoreUnavailable(_))
        ));
        assert_eq!(strategy.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_registry_table() {
        let store = Arc::new(InMemoryTenantStore::new().with_table("orgs"));
        let strategy = StubResolver::returning(Some(acme()));
        let resolver = TenantContextResolver::new(store.clone(), strategy.clone());

        assert_eq!(resolver.resolve(&request("acme.test")).await, None);
        assert!(matches!(
            resolver.try_resolve(&request("acme.test")).await,
            Err(TenantError::RegistryMissing(table)) if table == "tenants"
        ));

        let resolver = resolver.with_registry_table("orgs");
        assert_eq!(resolver.resolve(&request("acme.test")).await, Some(acme()));
    }

    #[tokio::test]
    async fn test_strategy_errors_are_swallowed() {
        let resolver =
            TenantContextResolver::new(migrated_store(), StubResolver::failing("db timeout"));

        assert_eq!(resolver.resolve(&request("acme.test")).await, None);
        assert!(matches!(
            resolver.try_resolve(&request("acme.test")).await,
            Err(TenantError::StrategyFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_strategy_panics_are_swallowed() {
        let resolver = TenantContextResolver::new(migrated_store(), Arc::new(PanickingResolver));
        assert_eq!(resolver.resolve(&request("acme.test")).await, None);
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = TenancyConfig {
            domains: vec!["app.test".to_string()],
            tables: tenantry_config::TableNames {
                tenants: "orgs".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let store = Arc::new(InMemoryTenantStore::new().with_table("orgs"));
        let resolver = TenantContextResolver::from_config(
            &config,
            store,
            StubResolver::returning(Some(acme())),
        );

        assert_eq!(resolver.resolve(&request("app.test")).await, None);
        assert_eq!(resolver.resolve(&request("acme.test")).await, Some(acme()));
    }

    #[tokio::test]
    async fn test_context_caches_per_request() {
        let strategy = StubResolver::returning(Some(acme()));
        let resolver = TenantContextResolver::new(migrated_store(), strategy.clone());
        let request = request("acme.test");

        let context = TenantContext::new();
        for _ in 0..3 {
            let tenant = context.resolve_with(&resolver, &request).await;
            assert_eq!(tenant.map(|t| t.id.as_str()), Some("tenant-1"));
        }
        assert_eq!(strategy.calls(), 1);

        let next_request = TenantContext::new();
        next_request.resolve_with(&resolver, &request).await;
        assert_eq!(strategy.calls(), 2);
    }

    #[tokio::test]
    async fn test_context_caches_none() {
        let store = migrated_store();
        store.set_available(false);
        let strategy = StubResolver::returning(Some(acme()));
        let resolver = TenantContextResolver::new(store.clone(), strategy.clone());
        let request = request("acme.test");

        let context = TenantContext::new();
        assert!(context.resolve_with(&resolver, &request).await.is_none());

        store.set_available(true);
        assert!(context.resolve_with(&resolver, &request).await.is_none());
        assert!(context.is_resolved());
        assert_eq!(strategy.calls(), 0);
    }
}
