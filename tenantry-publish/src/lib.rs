//! Migration stub publishing for Tenantry
//!
//! Copies the bundled migration stubs and default configuration into a host
//! project. Re-publishing is idempotent: a stub that was published before keeps
//! its existing file name instead of getting a fresh timestamp.
//!
//! ```
//! use std::sync::Arc;
//! use tenantry_publish::{MemoryFilesystem, MigrationPublishPlanner, Publisher};
//!
//! let fs = Arc::new(
//!     MemoryFilesystem::new()
//!         .with_file("stubs/2020_01_01_000001_create_tenants_table.sql", "create table tenants;"),
//! );
//! let planner = MigrationPublishPlanner::new(fs.clone(), "stubs", "database/migrations/app");
//! let plan = planner.plan().unwrap();
//!
//! let report = Publisher::new(fs.clone()).publish(&plan.pairs()).unwrap();
//! assert_eq!(report.copied.len(), 1);
//!
//! // A second run finds the published file and leaves it alone.
//! let again = planner.plan().unwrap();
//! assert_eq!(again.matched().count(), 1);
//! assert_eq!(again.pairs(), plan.pairs());
//! ```

pub mod error;
pub mod filename;
pub mod fs;
pub mod planner;
pub mod publisher;

pub use error::{PublishError, Result};
pub use filename::{MigrationFile, SEQUENCE_FORMAT, SEQUENCE_LEN, sequence_token};
pub use fs::{Filesystem, LocalFilesystem, MemoryFilesystem};
pub use planner::{MigrationPublishPlanner, PlanEntry, PublishPlan, plan_publish};
pub use publisher::{PublishRegistry, PublishReport, Publisher};
