//! Wires configuration into the resolver, middleware and publisher.

use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tenantry_config::{BUNDLED_CONFIG_PATH, ConfigService, TenancyConfig};
use tenantry_publish::{
    Filesystem, LocalFilesystem, MigrationPublishPlanner, PublishPlan, PublishRegistry,
};
use tenantry_tenancy::{
    RegistryProbe, ResolverRegistry, TenantContextResolver, TenantLayer, TenantStore,
};
use tracing::debug;

/// Directory holding the bundled `database/migrations` stubs.
///
/// This is the crate's source directory at build time. Installed binaries
/// should point [`TenancyBootstrap::with_stubs_dir`] at a shipped copy.
pub const BUNDLE_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Builds the tenancy components for one host application.
///
/// ```no_run
/// use tenantry::{ConfigService, TenancyBootstrap};
///
/// let config = ConfigService::builder().load_env().build()?;
/// let bootstrap = TenancyBootstrap::from_service(&config)?;
///
/// for path in bootstrap.migration_paths() {
///     println!("run migrations from {}", path.display());
/// }
/// # Ok::<(), tenantry::TenantryError>(())
/// ```
#[derive(Clone)]
pub struct TenancyBootstrap {
    config: TenancyConfig,
    bundle_root: PathBuf,
    stubs_override: Option<PathBuf>,
    config_source: PathBuf,
    project_root: PathBuf,
    fs: Arc<dyn Filesystem>,
}

impl TenancyBootstrap {
    pub fn new(config: TenancyConfig) -> Self {
        Self {
            config,
            bundle_root: PathBuf::from(BUNDLE_ROOT),
            stubs_override: None,
            config_source: PathBuf::from(BUNDLED_CONFIG_PATH),
            project_root: PathBuf::from("."),
            fs: Arc::new(LocalFilesystem),
        }
    }

    /// Read and validate the tenancy section of `service`.
    pub fn from_service(service: &ConfigService) -> Result<Self> {
        Ok(Self::new(service.tenancy()?))
    }

    /// Where stubs are looked up when `stubs_path` is relative.
    pub fn with_bundle_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.bundle_root = root.into();
        self
    }

    /// Read stubs from `dir` instead of the configured `stubs_path`.
    pub fn with_stubs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stubs_override = Some(dir.into());
        self
    }

    /// Configuration file copied by the config publish group.
    pub fn with_config_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config_source = source.into();
        self
    }

    /// Host project root; publish destinations are relative to it.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn Filesystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn config(&self) -> &TenancyConfig {
        &self.config
    }

    pub fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::clone(&self.fs)
    }

    pub fn stubs_dir(&self) -> PathBuf {
        match &self.stubs_override {
            Some(dir) => dir.clone(),
            None => self.config.stubs_dir(&self.bundle_root),
        }
    }

    /// `<project>/<database_path>/migrations/<namespace>`
    pub fn migrations_dir(&self) -> PathBuf {
        self.project_root.join(self.config.migrations_dir())
    }

    /// Destination of the published configuration file.
    pub fn config_destination(&self) -> PathBuf {
        let extension = self
            .config_source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml");
        self.project_root
            .join(self.config.published_config_path(extension))
    }

    pub fn migrations_tag(&self) -> String {
        format!("{}::migrations", self.config.namespace)
    }

    pub fn config_tag(&self) -> String {
        format!("{}::config", self.config.namespace)
    }

    pub fn planner(&self) -> MigrationPublishPlanner {
        MigrationPublishPlanner::new(self.filesystem(), self.stubs_dir(), self.migrations_dir())
            .with_extension(self.config.migration_extension.clone())
    }

    /// Plan the migration publish group against the current time.
    pub fn plan(&self) -> Result<PublishPlan> {
        Ok(self.planner().plan()?)
    }

    /// Publish groups for the config file and the migration stubs.
    ///
    /// The config group is registered only when the source file exists; the
    /// migration group is empty when there are no stubs.
    pub fn publishes(&self) -> Result<PublishRegistry> {
        self.publishes_with(self.plan()?)
    }

    /// Same as [`TenancyBootstrap::publishes`] with a precomputed plan.
    pub fn publishes_with(&self, plan: PublishPlan) -> Result<PublishRegistry> {
        let mut registry = PublishRegistry::new();

        if self.fs.exists(&self.config_source) {
            registry.publishes(
                self.config_tag(),
                [(self.config_source.clone(), self.config_destination())],
            );
        } else {
            debug!(source = %self.config_source.display(), "No config file to publish");
        }

        registry.publishes(self.migrations_tag(), plan.pairs());
        Ok(registry)
    }

    /// Directories the host migrator should load directly.
    ///
    /// Empty unless `autoload_migrations` is enabled.
    pub fn migration_paths(&self) -> Vec<PathBuf> {
        if self.config.autoload_migrations {
            vec![self.stubs_dir()]
        } else {
            Vec::new()
        }
    }

    /// Resolver using the configured built-in strategy.
    pub fn resolver(
        &self,
        store: Arc<dyn TenantStore>,
        probe: Arc<dyn RegistryProbe>,
    ) -> Result<TenantContextResolver> {
        self.resolver_with(&ResolverRegistry::default(), store, probe)
    }

    /// Resolver using a strategy from `registry`.
    pub fn resolver_with(
        &self,
        registry: &ResolverRegistry,
        store: Arc<dyn TenantStore>,
        probe: Arc<dyn RegistryProbe>,
    ) -> Result<TenantContextResolver> {
        let strategy = registry.build(&self.config, store)?;
        Ok(TenantContextResolver::from_config(
            &self.config,
            probe,
            strategy,
        ))
    }

    /// Middleware layer resolving the tenant of every request.
    pub fn layer(
        &self,
        store: Arc<dyn TenantStore>,
        probe: Arc<dyn RegistryProbe>,
    ) -> Result<TenantLayer> {
        Ok(TenantLayer::new(Arc::new(self.resolver(store, probe)?)))
    }
}
