//! Strategy registry.
//!
//! Maps the `resolver` configuration value to a factory producing the
//! matching [`TenantResolver`].

use crate::TenantError;
use crate::resolver::{
    DomainTenantResolver, HeaderTenantResolver, PathTenantResolver, SubdomainTenantResolver,
    TenantResolver,
};
use crate::store::TenantStore;
use std::collections::HashMap;
use std::sync::Arc;
use tenantry_config::TenancyConfig;

/// Builds a strategy from configuration and the host's tenant store.
pub type ResolverFactory = Arc<
    dyn Fn(&TenancyConfig, Arc<dyn TenantStore>) -> Result<Arc<dyn TenantResolver>, TenantError>
        + Send
        + Sync,
>;

/// Named strategy factories.
///
/// [`ResolverRegistry::default`] knows `domain`, `subdomain`, `header` and
/// `path`; hosts add their own with [`ResolverRegistry::register`].
///
/// ```
/// use std::sync::Arc;
/// use tenantry_config::TenancyConfig;
/// use tenantry_tenancy::{InMemoryTenantStore, ResolverRegistry};
///
/// let registry = ResolverRegistry::default();
/// let config = TenancyConfig::default();
/// let resolver = registry.build(&config, Arc::new(InMemoryTenantStore::new()));
/// assert!(resolver.is_ok());
/// ```
#[derive(Clone)]
pub struct ResolverRegistry {
    factories: HashMap<String, ResolverFactory>,
}

impl ResolverRegistry {
    /// A registry with no strategies
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the built-in strategies
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        registry
            .register("domain", |_, store| {
                Ok(Arc::new(DomainTenantResolver::new(store)) as Arc<dyn TenantResolver>)
            })
            .register("header", |config, store| {
                Ok(Arc::new(HeaderTenantResolver::new(
                    store,
                    config.resolver_header.clone(),
                )) as Arc<dyn TenantResolver>)
            })
            .register("subdomain", |config, store| {
                let base_domain = config.resolver_base_domain.clone().ok_or_else(|| {
                    TenantError::Invalid(
                        "subdomain resolver requires `resolver_base_domain`".to_string(),
                    )
                })?;
                Ok(Arc::new(SubdomainTenantResolver::new(store, base_domain))
                    as Arc<dyn TenantResolver>)
            })
            .register("path", |config, store| {
                let resolver = PathTenantResolver::new(
                    store,
                    &config.resolver_path_pattern,
                    config.resolver_path_group,
                )
                .map_err(|e| TenantError::Invalid(format!("resolver_path_pattern: {}", e)))?;
                Ok(Arc::new(resolver) as Arc<dyn TenantResolver>)
            });

        registry
    }

    /// Add or replace a strategy
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&TenancyConfig, Arc<dyn TenantStore>) -> Result<Arc<dyn TenantResolver>, TenantError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered strategy names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the strategy named by `config.resolver`
    pub fn build(
        &self,
        config: &TenancyConfig,
        store: Arc<dyn TenantStore>,
    ) -> Result<Arc<dyn TenantResolver>, TenantError> {
        let factory = self
            .factories
            .get(&config.resolver)
            .ok_or_else(|| TenantError::UnknownStrategy(config.resolver.clone()))?;

        tracing::debug!(strategy = %config.resolver, "Building tenant resolver");
        factory(config, store)
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
