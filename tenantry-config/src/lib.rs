//! Configuration management for Tenantry
//!
//! Configuration is a flat map of top-level keys. Values come from, in
//! increasing precedence:
//!
//! 1. the bundled defaults ([`BUNDLED_CONFIG`]),
//! 2. configuration files (JSON, TOML or `.env`),
//! 3. prefixed environment variables (`TENANTRY_RESOLVER=header`).
//!
//! Merging is a flat key copy: a key present in a higher layer replaces the
//! lower value wholesale.
//!
//! ```rust
//! use tenantry_config::{ConfigService, TenancyConfig};
//!
//! let service = ConfigService::builder().build().unwrap();
//! let config: TenancyConfig = service.tenancy().unwrap();
//! assert_eq!(config.resolver, "domain");
//! ```

pub mod config_service;
pub mod env;
pub mod error;
pub mod loader;
pub mod tenancy;
pub mod validation;

pub use config_service::{ConfigService, ConfigServiceBuilder};
pub use env::{DEFAULT_ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use tenancy::{TableNames, TenancyConfig};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Default configuration shipped with the crate.
pub const BUNDLED_CONFIG: &str = include_str!("../config/tenants.toml");

/// On-disk location of [`BUNDLED_CONFIG`], used as the source when the
/// configuration file is published into a host project.
pub const BUNDLED_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/tenants.toml");

/// Parse [`BUNDLED_CONFIG`] into a JSON object.
pub fn bundled_defaults() -> Result<Value> {
    ConfigLoader::new(FileFormat::Toml).parse(BUNDLED_CONFIG)
}

/// Main configuration manager
///
/// Environment loading only reads variables carrying the manager's prefix,
/// [`DEFAULT_ENV_PREFIX`] unless [`ConfigManager::with_prefix`] picks another.
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<BTreeMap<String, Value>>>,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::default(),
            env_prefix: prefix.into(),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) {
        self.load_env_from(std::env::vars());
    }

    /// Load prefixed variables from an explicit set of pairs
    pub fn load_env_from<I>(&self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let loader = EnvLoader::new(Some(self.env_prefix.clone()));
        let vars = loader.load_from(vars);
        tracing::debug!(
            prefix = %self.env_prefix,
            count = vars.len(),
            "Loaded configuration from environment"
        );

        self.config.write().extend(vars);
    }

    /// Load a `.env` file into the process environment, then read it back.
    ///
    /// Without an explicit path a missing `.env` is not an error.
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::Dotenv(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.load_env();
        Ok(())
    }

    /// Load configuration from file
    pub fn load_file(&self, path: &Path, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).load_file(path)?;
        tracing::debug!(path = %path.display(), ?format, "Loaded configuration file");
        self.merge_value(data, true)
    }

    /// Load configuration from file, picking the format by extension
    pub fn load_file_auto(&self, path: &Path) -> Result<()> {
        let format = ConfigLoader::auto(path)?.format();
        self.load_file(path, format)
    }

    /// Fill in every top-level key of `defaults` the manager does not have yet.
    pub fn merge_defaults(&self, defaults: Value) -> Result<()> {
        self.merge_value(defaults, false)
    }

    fn merge_value(&self, value: Value, overwrite: bool) -> Result<()> {
        let Value::Object(map) = value else {
            return Err(ConfigError::ParseError(
                "configuration root must be an object".to_string(),
            ));
        };

        let mut config = self.config.write();
        for (key, value) in map {
            if overwrite || !config.contains_key(&key) {
                config.insert(key, value);
            }
        }

        Ok(())
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.config.write().insert(key.to_string(), json_value);
        Ok(())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.config.read();

        let value = config
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::DeserializationError(format!("{}: {}", key, e)))
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.config.read().contains_key(key)
    }

    /// All values as a single JSON object
    pub fn snapshot(&self) -> Value {
        Value::Object(
            self.config
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Deserialize the whole map into `T` and validate it
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let validated: T = serde_json::from_value(self.snapshot())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let manager = ConfigManager::new();
        manager.set("resolver", "header").unwrap();

        let value: String = manager.get("resolver").unwrap();
        assert_eq!(value, "header");
    }

    #[test]
    fn test_missing_key() {
        let manager = ConfigManager::new();

        assert!(!manager.has("missing_key"));
        assert!(matches!(
            manager.get::<String>("missing_key"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_merge_defaults_keeps_existing_keys() {
        let manager = ConfigManager::new();
        manager.set("resolver", "path").unwrap();

        manager
            .merge_defaults(json!({"resolver": "domain", "autoload_migrations": false}))
            .unwrap();

        assert_eq!(manager.get::<String>("resolver").unwrap(), "path");
        assert!(!manager.get::<bool>("autoload_migrations").unwrap());
    }

    #[test]
    fn test_file_merge_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenants.json");
        std::fs::write(&path, r#"{"tables": {"tenants": "accounts"}}"#).unwrap();

        let manager = ConfigManager::new();
        manager
            .set("tables", json!({"tenants": "orgs", "tenantables": "org_links"}))
            .unwrap();
        manager.load_file_auto(&path).unwrap();

        assert_eq!(manager.get::<Value>("tables").unwrap(), json!({"tenants": "accounts"}));
    }

    #[test]
    fn test_merge_defaults_rejects_non_object() {
        let manager = ConfigManager::new();
        assert!(manager.merge_defaults(json!(["a"])).is_err());
    }

    #[test]
    fn test_load_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenants.json");
        std::fs::write(&path, r#"{"resolver": "subdomain"}"#).unwrap();

        let manager = ConfigManager::new();
        manager.set("resolver", "domain").unwrap();
        manager.load_file_auto(&path).unwrap();

        assert_eq!(manager.get::<String>("resolver").unwrap(), "subdomain");
    }

    #[test]
    fn test_bundled_defaults_parse() {
        let defaults = bundled_defaults().unwrap();
        assert_eq!(defaults["resolver"], "domain");
        assert_eq!(defaults["tables"]["tenants"], "tenants");
        assert!(Path::new(BUNDLED_CONFIG_PATH).exists());
    }

    #[test]
    fn test_env_layer_reads_only_prefixed_vars() {
        let manager = ConfigManager::new();
        manager.merge_defaults(bundled_defaults().unwrap()).unwrap();
        manager.load_env_from([
            ("DATABASE_PATH".to_string(), "/var/lib/postgres".to_string()),
            ("DOMAINS".to_string(), "app.example.com".to_string()),
            ("HOME".to_string(), "/root".to_string()),
            ("TENANTRY_RESOLVER".to_string(), "header".to_string()),
        ]);

        assert!(!manager.has("home"));
        let config = TenancyConfig::from_manager(&manager).unwrap();
        assert_eq!(config.database_path, Path::new("database"));
        assert!(config.domains.is_empty());
        assert_eq!(config.resolver, "header");
    }

    #[test]
    fn test_custom_env_prefix() {
        let manager = ConfigManager::with_prefix("ACME");
        manager.load_env_from([
            ("ACME_NAMESPACE".to_string(), "acme/tenants".to_string()),
            ("TENANTRY_NAMESPACE".to_string(), "ignored/tenants".to_string()),
        ]);

        assert_eq!(manager.get::<String>("namespace").unwrap(), "acme/tenants");
    }
}
