// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::invalid(field, "cannot be empty"));
        }
        Ok(())
    }

    /// Validate a bare host name (no scheme, path or whitespace)
    pub fn is_host(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        if value.contains("://") || value.contains('/') || value.contains(char::is_whitespace) {
            return Err(ConfigError::invalid(
                field,
                format!("`{}` is not a bare host name", value),
            ));
        }
        Ok(())
    }

    /// Validate a relative namespace such as `vendor/package`
    pub fn is_namespace(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        if value.starts_with('/') || value.split('/').any(|segment| segment.is_empty() || segment == "..") {
            return Err(ConfigError::invalid(
                field,
                format!("`{}` is not a relative namespace", value),
            ));
        }
        Ok(())
    }
}
