//! Tenant storage seams.
//!
//! The host application implements these traits over its own database; the
//! crate never talks to a database directly.

use crate::TenantError;
use crate::tenant::Tenant;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// Tenant store trait (implement with your database)
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Find tenant by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, TenantError>;

    /// Find tenant by name/slug
    async fn find_by_name(&self, name: &str) -> Result<Option<Tenant>, TenantError>;

    /// Find tenant by domain (already lower-cased, without port)
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, TenantError>;
}

/// Health checks run before any tenant lookup.
#[async_trait]
pub trait RegistryProbe: Send + Sync {
    /// Prove the backing store is reachable, e.g. by acquiring a connection.
    async fn ping(&self) -> Result<(), TenantError>;

    /// Whether `table` exists (it will not before the first migration run).
    async fn has_table(&self, table: &str) -> Result<bool, TenantError>;
}

/// In-process store, for tests and local tooling.
#[derive(Debug)]
pub struct InMemoryTenantStore {
    tenants: RwLock<HashMap<String, Tenant>>,
    tables: RwLock<HashSet<String>>,
    available: AtomicBool,
}

impl InMemoryTenantStore {
    /// An empty, reachable store with no tables
    pub fn new() -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
            tables: RwLock::new(HashSet::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Insert or replace a tenant, keyed by id
    pub fn insert(&self, tenant: Tenant) {
        self.tenants.write().insert(tenant.id.clone(), tenant);
    }

    pub fn with_tenant(self, tenant: Tenant) -> Self {
        self.insert(tenant);
        self
    }

    /// Mark a table as existing
    pub fn create_table(&self, table: impl Into<String>) {
        self.tables.write().insert(table.into());
    }

    pub fn with_table(self, table: impl Into<String>) -> Self {
        self.create_table(table);
        self
    }

    /// Simulate the store going down or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), TenantError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TenantError::StoreUnavailable(
                "in-memory store is offline".to_string(),
            ))
        }
    }

    fn find(&self, predicate: impl Fn(&Tenant) -> bool) -> Result<Option<Tenant>, TenantError> {
        self.ensure_available()?;
        Ok(self.tenants.read().values().find(|t| predicate(t)).cloned())
    }
}

impl Default for InMemoryTenantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, TenantError> {
        self.ensure_available()?;
        Ok(self.tenants.read().get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tenant>, TenantError> {
        self.find(|t| t.name == name)
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, TenantError> {
        self.find(|t| t.domain.as_deref() == Some(domain))
    }
}

#[async_trait]
impl RegistryProbe for InMemoryTenantStore {
    async fn ping(&self) -> Result<(), TenantError> {
        self.ensure_available()
    }

    async fn has_table(&self, table: &str) -> Result<bool, TenantError> {
        self.ensure_available()?;
        Ok(self.tables.read().contains(table))
    }
}
