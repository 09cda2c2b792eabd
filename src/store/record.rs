//! Hash record definitions.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::StoreError;

/// Number of digest characters shown in short previews.
pub const PREVIEW_LEN: usize = 8;

/// A tracked file: its content digest and canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashRecord {
    /// Lowercase hex BLAKE3 digest
    pub digest: String,
    /// Absolute, symlink-resolved path
    pub path: PathBuf,
}

impl HashRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(digest: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            digest: digest.into(),
            path: path.into(),
        }
    }

    /// First characters of the digest, for display.
    #[must_use]
    pub fn preview(&self) -> &str {
        preview(&self.digest)
    }

    /// Check that a path can be written to the line-oriented store format.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnrepresentablePath`] for non-UTF-8 paths and
    /// paths containing a tab, carriage return or newline.
    pub fn check_path(path: &Path) -> Result<&str, StoreError> {
        match path.to_str() {
            Some(s) if !s.contains(['\t', '\n', '\r']) => Ok(s),
            _ => Err(StoreError::UnrepresentablePath(path.to_path_buf())),
        }
    }
}

/// First [`PREVIEW_LEN`] characters of a digest.
#[must_use]
pub fn preview(digest: &str) -> &str {
    digest.get(..PREVIEW_LEN).unwrap_or(digest)
}
