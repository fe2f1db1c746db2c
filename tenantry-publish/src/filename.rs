//! Migration file names.
//!
//! A migration file name is a 17 character sequence token (`YYYY_MM_DD_HHMMSS`)
//! followed by a descriptor such as `_create_tenants_table.sql`.

use crate::error::{PublishError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Length of the leading sequence token, in characters.
pub const SEQUENCE_LEN: usize = 17;

/// `strftime` format of the sequence token.
pub const SEQUENCE_FORMAT: &str = "%Y_%m_%d_%H%M%S";

/// Number of trailing token characters read as a seconds offset.
const OFFSET_LEN: usize = 6;

/// A migration file split into its sequence token and descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    path: PathBuf,
    file_name: String,
    split: usize,
}

impl MigrationFile {
    /// Parse the file name of `path`.
    ///
    /// Fails when the name is not UTF-8 or has nothing after the sequence token.
    pub fn parse(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PublishError::InvalidFileName(path.display().to_string()))?
            .to_string();

        let split = file_name
            .char_indices()
            .nth(SEQUENCE_LEN)
            .map(|(index, _)| index)
            .ok_or_else(|| PublishError::InvalidFileName(file_name.clone()))?;

        Ok(Self {
            path,
            file_name,
            split,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The leading sequence token.
    pub fn sequence(&self) -> &str {
        &self.file_name[..self.split]
    }

    /// Everything after the sequence token, leading `_` included.
    pub fn descriptor(&self) -> &str {
        &self.file_name[self.split..]
    }

    /// Seconds encoded in the last six characters of the sequence token.
    ///
    /// Leading digits are read; a tail without any yields `0`.
    pub fn offset_seconds(&self) -> i64 {
        let sequence = self.sequence();
        let start = sequence
            .char_indices()
            .rev()
            .nth(OFFSET_LEN - 1)
            .map(|(index, _)| index)
            .unwrap_or(0);
        let tail = &sequence[start..];

        let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            tracing::warn!(
                file = %self.file_name,
                tail = %tail,
                "Sequence token has no numeric offset, using 0"
            );
            return 0;
        }
        digits.parse().unwrap_or(0)
    }
}

/// Format `time` as a sequence token.
pub fn sequence_token(time: DateTime<Utc>) -> String {
    time.format(SEQUENCE_FORMAT).to_string()
}
