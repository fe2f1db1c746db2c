// Environment variable loading

use crate::loader::parse_scalar;
use serde_json::Value;
use std::collections::HashMap;
use std::env;

/// Prefix used when none is configured: `TENANTRY_RESOLVER=header`.
pub const DEFAULT_ENV_PREFIX: &str = "TENANTRY";

/// Loads `PREFIX_KEY=value` pairs as lower-cased `key` entries.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load matching variables from the process environment
    pub fn load(&self) -> HashMap<String, Value> {
        self.load_from(env::vars())
    }

    /// Load matching variables from an explicit set of pairs
    pub fn load_from<I>(&self, vars: I) -> HashMap<String, Value>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| {
                let key = match &self.prefix {
                    Some(prefix) => key.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
                    None => key.as_str(),
                };
                if key.is_empty() {
                    return None;
                }
                Some((key.to_lowercase(), parse_scalar(&value)))
            })
            .collect()
    }

}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_ENV_PREFIX.to_string()))
    }
}
