//! Publish error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Planning and publishing errors.
#[derive(Debug, Error)]
pub enum PublishError {
    /// I/O error.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be copied.
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file name does not start with a sequence token followed by a descriptor.
    #[error("Invalid migration file name: {0}")]
    InvalidFileName(String),

    /// A publish source does not exist.
    #[error("Publish source not found: {0}")]
    MissingSource(PathBuf),

    /// No group is registered under this tag.
    #[error("Unknown publish tag: {0}")]
    UnknownTag(String),
}

impl PublishError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
