//! Typed view of the tenancy configuration keys.

use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, ConfigManager, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Names of the tables backing the tenant registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub tenants: String,
    pub tenantables: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            tenants: "tenants".to_string(),
            tenantables: "tenantables".to_string(),
        }
    }
}

/// Tenancy settings.
///
/// Field names match the flat configuration keys one to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Hosts served by the application itself; never tenant-scoped.
    pub domains: Vec<String>,

    /// Name of the resolution strategy in the resolver registry.
    pub resolver: String,

    pub resolver_header: String,

    pub resolver_base_domain: Option<String>,

    pub resolver_path_pattern: String,

    pub resolver_path_group: usize,

    pub tables: TableNames,

    /// Hand the bundled stub directory to the host migrator as-is.
    pub autoload_migrations: bool,

    /// Publish namespace, e.g. `vendor/package`.
    pub namespace: String,

    /// Bundled stub directory, relative to the bundle root unless absolute.
    pub stubs_path: PathBuf,

    /// Host database directory; migrations land under `<database_path>/migrations`.
    pub database_path: PathBuf,

    /// Host configuration directory.
    pub config_path: PathBuf,

    /// Extension (without dot) of migration files.
    pub migration_extension: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            resolver: "domain".to_string(),
            resolver_header: "X-Tenant-ID".to_string(),
            resolver_base_domain: None,
            resolver_path_pattern: "^/tenants/([^/]+)".to_string(),
            resolver_path_group: 1,
            tables: TableNames::default(),
            autoload_migrations: false,
            namespace: "tenantry/tenants".to_string(),
            stubs_path: PathBuf::from("database/migrations"),
            database_path: PathBuf::from("database"),
            config_path: PathBuf::from("config"),
            migration_extension: "sql".to_string(),
        }
    }
}

impl TenancyConfig {
    /// Deserialize and validate from a populated manager.
    pub fn from_manager(manager: &ConfigManager) -> Result<Self> {
        manager.load_validated()
    }

    /// `<database_path>/migrations/<namespace>`
    pub fn migrations_dir(&self) -> PathBuf {
        self.database_path.join("migrations").join(&self.namespace)
    }

    /// Resolve the stub directory against the bundle root.
    pub fn stubs_dir(&self, bundle_root: &Path) -> PathBuf {
        if self.stubs_path.is_absolute() {
            self.stubs_path.clone()
        } else {
            bundle_root.join(&self.stubs_path)
        }
    }

    /// Destination of the published configuration file for `extension`.
    ///
    /// `acme/tenants` becomes `<config_path>/acme.tenants.<extension>`.
    pub fn published_config_path(&self, extension: &str) -> PathBuf {
        self.config_path
            .join(format!("{}.{}", self.namespace.replace('/', "."), extension))
    }
}

impl Validate for TenancyConfig {
    fn validate(&self) -> Result<()> {
        for domain in &self.domains {
            ConfigValidator::is_host(domain, "domains")?;
        }

        ConfigValidator::not_empty(&self.resolver, "resolver")?;
        ConfigValidator::not_empty(&self.tables.tenants, "tables.tenants")?;
        ConfigValidator::not_empty(&self.tables.tenantables, "tables.tenantables")?;
        ConfigValidator::is_namespace(&self.namespace, "namespace")?;
        ConfigValidator::not_empty(&self.migration_extension, "migration_extension")?;

        if self.migration_extension.starts_with('.') {
            return Err(ConfigError::invalid(
                "migration_extension",
                "must not start with a dot",
            ));
        }

        match self.resolver.as_str() {
            "header" => ConfigValidator::not_empty(&self.resolver_header, "resolver_header")?,
            "subdomain" => {
                let base = self.resolver_base_domain.as_deref().ok_or_else(|| {
                    ConfigError::invalid(
                        "resolver_base_domain",
                        "required by the subdomain resolver",
                    )
                })?;
                ConfigValidator::is_host(base, "resolver_base_domain")?;
            }
            "path" if self.resolver_path_group == 0 => {
                return Err(ConfigError::invalid(
                    "resolver_path_group",
                    "capture group 0 is the whole match; use 1 or higher",
                ));
            }
            _ => {}
        }

        Ok(())
    }
}
