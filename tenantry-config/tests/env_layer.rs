//! Environment layer against the real process environment.
//!
//! Kept to a single test so no other thread reads the environment while it
//! is being modified.

use std::path::Path;
use tenantry_config::ConfigService;

#[test]
fn test_env_layer_ignores_unprefixed_variables() {
    // SAFETY: the only test in this binary, nothing else touches the environment.
    unsafe {
        std::env::set_var("DATABASE_PATH", "/var/lib/postgres");
        std::env::set_var("DOMAINS", "app.example.com");
        std::env::set_var("RESOLVER", "carrier-pigeon");
        std::env::set_var("TENANTRY_NAMESPACE", "acme/billing");
    }

    let service = ConfigService::builder().load_env().build().unwrap();
    let config = service.tenancy().unwrap();

    assert_eq!(config.database_path, Path::new("database"));
    assert!(config.domains.is_empty());
    assert_eq!(config.resolver, "domain");
    assert_eq!(config.namespace, "acme/billing");

    let scoped = ConfigService::builder()
        .with_prefix("ACME")
        .load_env()
        .build()
        .unwrap();
    assert_eq!(scoped.tenancy().unwrap().namespace, "tenantry/tenants");
}
