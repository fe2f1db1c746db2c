// ConfigService - layered configuration assembly

use crate::{ConfigManager, DEFAULT_ENV_PREFIX, Result, TenancyConfig, bundled_defaults};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

/// High-level configuration service
#[derive(Clone)]
pub struct ConfigService {
    manager: ConfigManager,
}

impl ConfigService {
    /// Create from an existing manager
    pub fn from_manager(manager: ConfigManager) -> Self {
        Self { manager }
    }

    /// Builder for creating configured service
    pub fn builder() -> ConfigServiceBuilder {
        ConfigServiceBuilder::new()
    }

    /// Get configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.manager.get(key)
    }

    /// Check if key exists
    pub fn has(&self, key: &str) -> bool {
        self.manager.has(key)
    }

    /// Typed, validated tenancy settings
    pub fn tenancy(&self) -> Result<TenancyConfig> {
        TenancyConfig::from_manager(&self.manager)
    }

    /// Get underlying manager
    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }
}

/// Builder for ConfigService
///
/// Layers are applied lowest first: defaults, files (in the order added),
/// `.env`, then the process environment. Only variables starting with the
/// prefix (`TENANTRY_` unless changed) are read from the environment.
pub struct ConfigServiceBuilder {
    prefix: String,
    defaults: Option<Value>,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    config_files: Vec<PathBuf>,
}

impl ConfigServiceBuilder {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_ENV_PREFIX.to_string(),
            defaults: None,
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
            config_files: Vec::new(),
        }
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace the bundled defaults
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Enable loading from .env file
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Add configuration file to load; the format follows the extension
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    /// Build the configuration service
    pub fn build(self) -> Result<ConfigService> {
        let manager = ConfigManager::with_prefix(self.prefix);

        for path in &self.config_files {
            manager.load_file_auto(path)?;
        }

        if self.load_dotenv {
            manager.load_dotenv(self.dotenv_path.as_deref())?;
        } else if self.load_env {
            manager.load_env();
        }

        let defaults = match self.defaults {
            Some(defaults) => defaults,
            None => bundled_defaults()?,
        };
        manager.merge_defaults(defaults)?;

        Ok(ConfigService::from_manager(manager))
    }
}

impl Default for ConfigServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
