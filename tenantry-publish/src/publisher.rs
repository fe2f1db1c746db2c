//! Tagged publish groups and the copier that applies them.

use crate::error::{PublishError, Result};
use crate::fs::Filesystem;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Publish groups keyed by tag, e.g. `tenantry/tenants::migrations`.
#[derive(Debug, Clone, Default)]
pub struct PublishRegistry {
    groups: BTreeMap<String, Vec<(PathBuf, PathBuf)>>,
}

impl PublishRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `(source, destination)` pairs under `tag`.
    ///
    /// Pairs registered under an existing tag are appended.
    pub fn publishes<I>(&mut self, tag: impl Into<String>, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (PathBuf, PathBuf)>,
    {
        self.groups.entry(tag.into()).or_default().extend(pairs);
        self
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    pub fn group(&self, tag: &str) -> Option<&[(PathBuf, PathBuf)]> {
        self.groups.get(tag).map(Vec::as_slice)
    }
}

/// Outcome of a publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl PublishReport {
    fn absorb(&mut self, other: PublishReport) {
        self.copied.extend(other.copied);
        self.skipped.extend(other.skipped);
    }
}

/// Copies publish groups into the host project.
pub struct Publisher {
    fs: Arc<dyn Filesystem>,
    force: bool,
}

impl Publisher {
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs, force: false }
    }

    /// Overwrite destinations that already exist.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Copy every pair. Sources must exist.
    pub fn publish(&self, pairs: &[(PathBuf, PathBuf)]) -> Result<PublishReport> {
        let mut report = PublishReport::default();

        for (source, destination) in pairs {
            if !self.fs.exists(source) {
                return Err(PublishError::MissingSource(source.clone()));
            }

            if self.fs.exists(destination) && !self.force {
                debug!(destination = %destination.display(), "Already published, skipping");
                report.skipped.push(destination.clone());
                continue;
            }

            if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
                self.fs.create_dir_all(parent)?;
            }
            self.fs.copy(source, destination)?;

            info!(
                source = %source.display(),
                destination = %destination.display(),
                "Published"
            );
            report.copied.push(destination.clone());
        }

        Ok(report)
    }

    /// Publish one tagged group.
    pub fn publish_tag(&self, registry: &PublishRegistry, tag: &str) -> Result<PublishReport> {
        let group = registry
            .group(tag)
            .ok_or_else(|| PublishError::UnknownTag(tag.to_string()))?;
        self.publish(group)
    }

    /// Publish every group in tag order.
    pub fn publish_all(&self, registry: &PublishRegistry) -> Result<PublishReport> {
        let mut report = PublishReport::default();
        for tag in registry.tags() {
            report.absorb(self.publish_tag(registry, tag)?);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFilesystem;
    use std::path::Path;

    fn pair(source: &str, destination: &str) -> (PathBuf, PathBuf) {
        (PathBuf::from(source), PathBuf::from(destination))
    }

    #[test]
    fn test_registry_tags_and_groups() {
        let mut registry = PublishRegistry::new();
        registry
            .publishes("app::migrations", [pair("s/a.sql", "d/a.sql")])
            .publishes("app::config", [pair("c.toml", "config/app.toml")])
            .publishes("app::migrations", [pair("s/b.sql", "d/b.sql")]);

        assert_eq!(registry.tags(), ["app::config", "app::migrations"]);
        assert_eq!(registry.group("app::migrations").unwrap().len(), 2);
        assert_eq!(registry.group("app::config").unwrap().len(), 1);
        assert!(registry.group("app::seeds").is_none());
    }

    #[test]
    fn test_publish_copies_and_skips() {
        let fs = Arc::new(
            MemoryFilesystem::new()
                .with_file("stubs/a.sql", "new a")
                .with_file("stubs/b.sql", "new b")
                .with_file("db/b.sql", "old b"),
        );
        let publisher = Publisher::new(fs.clone());

        let report = publisher
            .publish(&[pair("stubs/a.sql", "db/a.sql"), pair("stubs/b.sql", "db/b.sql")])
            .unwrap();

        assert_eq!(report.copied, [PathBuf::from("db/a.sql")]);
        assert_eq!(report.skipped, [PathBuf::from("db/b.sql")]);
        assert_eq!(fs.read(Path::new("db/b.sql")).unwrap(), b"old b");
    }

    #[test]
    fn test_force_overwrites() {
        let fs = Arc::new(
            MemoryFilesystem::new()
                .with_file("stubs/b.sql", "new b")
                .with_file("db/b.sql", "old b"),
        );
        let report = Publisher::new(fs.clone())
            .force(true)
            .publish(&[pair("stubs/b.sql", "db/b.sql")])
            .unwrap();

        assert_eq!(report.copied.len(), 1);
        assert_eq!(fs.read(Path::new("db/b.sql")).unwrap(), b"new b");
    }

    #[test]
    fn test_missing_source_and_unknown_tag() {
        let fs = Arc::new(MemoryFilesystem::new());
        let publisher = Publisher::new(fs);

        assert!(matches!(
            publisher.publish(&[pair("nope.sql", "db/nope.sql")]),
            Err(PublishError::MissingSource(_))
        ));
        assert!(matches!(
            publisher.publish_tag(&PublishRegistry::new(), "x::config"),
            Err(PublishError::UnknownTag(tag)) if tag == "x::config"
        ));
    }

    #[test]
    fn test_publish_all_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tenants.toml");
        std::fs::write(&source, "domains = []").unwrap();
        let destination = dir.path().join("config/acme.tenants.toml");

        let mut registry = PublishRegistry::new();
        registry.publishes("acme/tenants::config", [(source, destination.clone())]);

        let publisher = Publisher::new(Arc::new(crate::fs::LocalFilesystem));
        let first = publisher.publish_all(&registry).unwrap();
        let second = publisher.publish_all(&registry).unwrap();

        assert_eq!(first.copied, [destination.clone()]);
        assert_eq!(second.skipped, [destination.clone()]);
        assert_eq!(std::fs::read_to_string(destination).unwrap(), "domains = []");
    }
}
