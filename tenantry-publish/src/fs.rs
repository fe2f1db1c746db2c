//! Filesystem access used by the planner and publisher.

use crate::error::{PublishError, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

/// Minimal filesystem surface needed to plan and publish.
pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir` with the given extension, sorted by file name.
    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy `from` over `to`, replacing any existing file.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(extension)
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| PublishError::io(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PublishError::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| PublishError::io(entry.path(), e))?;
            let path = entry.path();
            if file_type.is_file() && has_extension(&path, extension) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| PublishError::io(path, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|source| PublishError::Copy {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
    }
}

/// In-memory [`Filesystem`] for tests and dry runs.
///
/// Directories exist when created explicitly or when they contain a file.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous contents.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), contents.into());
    }

    /// Builder form of [`MemoryFilesystem::insert`].
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn read(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().get(path).cloned()
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        if self.dirs.read().iter().any(|dir| dir.starts_with(path)) {
            return true;
        }
        self.files
            .read()
            .keys()
            .any(|file| file.parent().is_some_and(|parent| parent.starts_with(path)))
    }

    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        if !self.is_dir(dir) {
            return Err(PublishError::io(
                dir,
                io::Error::new(io::ErrorKind::NotFound, "directory not found"),
            ));
        }

        // BTreeMap order is path order, which within one directory is file name order.
        Ok(self
            .files
            .read()
            .keys()
            .filter(|file| file.parent() == Some(dir) && has_extension(file, extension))
            .cloned()
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.dirs.write().insert(path.to_path_buf());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let contents = self.read(from).ok_or_else(|| PublishError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "source not found"),
        })?;
        self.insert(to, contents);
        Ok(())
    }
}
