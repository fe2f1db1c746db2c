//! Config command
//!
//! Prints the effective configuration after files, environment and defaults
//! are merged, and checks it the same way the library does at startup.

use crate::error::{CliError, CliResult};
use crate::success;
use serde_json::Value;
use tenantry::ConfigService;
use tenantry::tenancy::{ResolverRegistry, TenantError};

pub fn run(service: &ConfigService, key: Option<&str>) -> CliResult<()> {
    if let Some(key) = key {
        let value: Value = service.get(key)?;
        match value {
            Value::String(s) => println!("{}", s),
            other => println!("{}", serde_json::to_string_pretty(&other)?),
        }
        return Ok(());
    }

    let tenancy = service.tenancy()?;
    let registry = ResolverRegistry::default();
    if !registry.contains(&tenancy.resolver) {
        return Err(CliError::Tenant(TenantError::UnknownStrategy(
            tenancy.resolver,
        )));
    }

    println!("{}", serde_json::to_string_pretty(&service.manager().snapshot())?);
    success("Configuration is valid");
    Ok(())
}
