//! Active tenant resolution for Tenantry
//!
//! Decides, once per request, which tenant the request belongs to. Resolution
//! never fails: an unreachable store, a registry table that has not been
//! migrated yet or a misbehaving strategy all yield "no tenant", and handlers
//! treat that as an ordinary state.
//!
//! # Features
//!
//! - 🏢 **Request-scoped context** - write-once [`TenantContext`] per request
//! - 🔍 **Pluggable strategies** - domain, subdomain, header and path resolvers
//! - 🧩 **Registry** - pick the strategy by name from configuration
//! - 🚀 **Tower middleware** - [`TenantLayer`] resolves and attaches the tenant
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tenantry_tenancy::*;
//!
//! // Your database-backed implementations
//! let store: Arc<dyn TenantStore> = Arc::new(MyTenantStore::new(pool.clone()));
//! let probe: Arc<dyn RegistryProbe> = Arc::new(MyProbe::new(pool));
//!
//! let strategy = ResolverRegistry::default().build(&config, store)?;
//! let resolver = TenantContextResolver::from_config(&config, probe, strategy);
//!
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(TenantLayer::new(Arc::new(resolver)));
//!
//! async fn handler(req: Request<Body>) -> String {
//!     match get_tenant(&req) {
//!         Some(tenant) => format!("Hello {}", tenant.name),
//!         None => "Hello".to_string(),
//!     }
//! }
//! ```

pub mod context;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod store;
pub mod tenant;

pub use context::TenantContextResolver;
pub use error::TenantError;
pub use middleware::{TenantLayer, TenantService, get_tenant, get_tenant_id, get_tenant_name};
pub use registry::{ResolverFactory, ResolverRegistry};
pub use request::{TenantRequest, normalize_host};
pub use resolver::{
    DomainTenantResolver, HeaderTenantResolver, PathTenantResolver, SubdomainTenantResolver,
    TenantResolver,
};
pub use store::{InMemoryTenantStore, RegistryProbe, TenantStore};
pub use tenant::{Tenant, TenantContext};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::TenantContextResolver;
    pub use crate::middleware::{TenantLayer, get_tenant};
    pub use crate::registry::ResolverRegistry;
    pub use crate::resolver::TenantResolver;
    pub use crate::store::{RegistryProbe, TenantStore};
    pub use crate::tenant::{Tenant, TenantContext};
    pub use crate::TenantError;
}
