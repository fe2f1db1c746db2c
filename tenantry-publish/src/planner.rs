//! Migration publish planning.
//!
//! Publishing the same stubs twice must not produce a second copy under a new
//! timestamp. Each stub is matched against the already published migrations
//! by its descriptor; a match keeps the published file name, otherwise a new
//! sequence token is synthesized from the current time plus the stub's offset.

use crate::error::Result;
use crate::filename::{MigrationFile, sequence_token};
use crate::fs::Filesystem;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// One stub and where it will be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Destination reuses an already published file name.
    pub matched: bool,
}

impl PlanEntry {
    /// File name part of the destination.
    pub fn file_name(&self) -> &str {
        self.destination
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}

/// Ordered publish plan, one entry per stub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishPlan {
    entries: Vec<PlanEntry>,
}

impl PublishPlan {
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Destination of the stub at `source`.
    pub fn destination_of(&self, source: &Path) -> Option<&Path> {
        self.entries
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| entry.destination.as_path())
    }

    /// `(source, destination)` pairs for a publish group.
    pub fn pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.entries
            .iter()
            .map(|entry| (entry.source.clone(), entry.destination.clone()))
            .collect()
    }

    pub fn matched(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|entry| entry.matched)
    }

    pub fn synthesized(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|entry| !entry.matched)
    }
}

impl IntoIterator for PublishPlan {
    type Item = PlanEntry;
    type IntoIter = std::vec::IntoIter<PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Plan the publication of `stubs` into `destination_dir`.
///
/// `existing` is the current content of `destination_dir` in listing order;
/// when several published files contain a stub's descriptor the first one
/// wins. Synthesized tokens increase strictly in stub order.
pub fn plan_publish(
    stubs: &[MigrationFile],
    existing: &[MigrationFile],
    destination_dir: &Path,
    now: DateTime<Utc>,
) -> PublishPlan {
    let now = now.trunc_subsecs(0);
    let mut previous: Option<DateTime<Utc>> = None;
    let mut entries = Vec::with_capacity(stubs.len());

    for stub in stubs {
        let descriptor = stub.descriptor();
        let published = existing
            .iter()
            .find(|record| record.file_name().contains(descriptor));

        let (file_name, matched) = match published {
            Some(record) => (record.file_name().to_string(), true),
            None => {
                let offset_time = now + Duration::seconds(stub.offset_seconds());
                let time = previous.map_or(offset_time, |previous| {
                    offset_time.max(previous + Duration::seconds(1))
                });
                previous = Some(time);
                (format!("{}{}", sequence_token(time), descriptor), false)
            }
        };

        entries.push(PlanEntry {
            source: stub.path().to_path_buf(),
            destination: destination_dir.join(file_name),
            matched,
        });
    }

    PublishPlan { entries }
}

/// Lists stubs and published migrations and plans between them.
pub struct MigrationPublishPlanner {
    fs: Arc<dyn Filesystem>,
    stubs_dir: PathBuf,
    destination_dir: PathBuf,
    extension: String,
}

impl MigrationPublishPlanner {
    pub fn new(
        fs: Arc<dyn Filesystem>,
        stubs_dir: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            stubs_dir: stubs_dir.into(),
            destination_dir: destination_dir.into(),
            extension: "sql".to_string(),
        }
    }

    /// Only files with this extension are treated as migrations.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn stubs_dir(&self) -> &Path {
        &self.stubs_dir
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Plan against the current time.
    pub fn plan(&self) -> Result<PublishPlan> {
        self.plan_at(Utc::now())
    }

    /// Plan against a fixed time.
    pub fn plan_at(&self, now: DateTime<Utc>) -> Result<PublishPlan> {
        if !self.fs.is_dir(&self.stubs_dir) {
            warn!(dir = %self.stubs_dir.display(), "Stub directory not found, nothing to publish");
            return Ok(PublishPlan::default());
        }

        let stubs: Vec<MigrationFile> = self
            .fs
            .list(&self.stubs_dir, &self.extension)?
            .into_iter()
            .filter_map(|path| match MigrationFile::parse(path) {
                Ok(file) => Some(file),
                Err(error) => {
                    warn!(%error, "Skipping stub");
                    None
                }
            })
            .collect();

        let existing: Vec<MigrationFile> = if self.fs.is_dir(&self.destination_dir) {
            self.fs
                .list(&self.destination_dir, &self.extension)?
                .into_iter()
                .filter_map(|path| MigrationFile::parse(path).ok())
                .collect()
        } else {
            Vec::new()
        };

        let plan = plan_publish(&stubs, &existing, &self.destination_dir, now);
        debug!(
            stubs = plan.len(),
            matched = plan.matched().count(),
            destination = %self.destination_dir.display(),
            "Planned migration publish"
        );
        Ok(plan)
    }
}
