//! Tenantry - multi-tenancy for Rust web services
//!
//! Two independent pieces sit behind one configuration file:
//!
//! - **Tenant resolution**: a `tower` layer that decides once per request which
//!   tenant is active. Requests to the application's own domains, an
//!   unreachable database and a registry table that does not exist yet all
//!   result in "no tenant" rather than an error.
//! - **Migration publishing**: copies the bundled migration stubs into the host
//!   project, reusing the file names of stubs that were published before.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tenantry::prelude::*;
//!
//! let config = ConfigService::builder().load_dotenv(None).build()?;
//! let bootstrap = TenancyBootstrap::from_service(&config)?;
//!
//! let store = Arc::new(PgTenantStore::new(pool.clone()));
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(bootstrap.layer(store.clone(), store)?);
//! ```

pub mod bootstrap;
pub mod error;

pub use bootstrap::{BUNDLE_ROOT, TenancyBootstrap};
pub use error::{Result, TenantryError};

pub use tenantry_config::{ConfigManager, ConfigService, TenancyConfig};

pub use tenantry_config as config;
pub use tenantry_publish as publish;
pub use tenantry_tenancy as tenancy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bootstrap::TenancyBootstrap;
    pub use crate::error::TenantryError;
    pub use tenantry_config::{ConfigService, TenancyConfig};
    pub use tenantry_publish::{PublishRegistry, Publisher};
    pub use tenantry_tenancy::prelude::*;
}
