//! On-disk format, loading and atomic persistence of the hash store.
//!
//! # Format
//!
//! One record per line, digest and path separated by a single tab:
//!
//! ```text
//! 3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b	/etc/hosts
//! ```
//!
//! There is no header and no version field. Blank lines are ignored.
//!
//! # Malformed content
//!
//! A line without a tab, with a digest that is not 64 lowercase hex
//! characters, with an empty or relative path, or repeating an earlier path
//! rejects the whole load with [`StoreError::Corrupt`]. Writing back a
//! partially understood store would silently drop records, so nothing is
//! skipped.

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{HashRecord, HashStore, StoreError};
use crate::scanner::hex_to_hash;

/// Separator between digest and path.
pub const FIELD_SEPARATOR: char = '\t';

impl HashStore {
    /// Parse store content.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] naming the first malformed line.
    pub fn parse(content: &str) -> Result<Self, StoreError> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_line(line).map_err(|reason| StoreError::Corrupt {
                line: index + 1,
                reason,
            })?;
            if !seen.insert(record.path.clone()) {
                return Err(StoreError::Corrupt {
                    line: index + 1,
                    reason: format!("duplicate record for {}", record.path.display()),
                });
            }
            records.push(record);
        }

        Ok(Self::from_records(records))
    }

    /// Serialize all records, one `digest<TAB>path` line each.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnrepresentablePath`] if a record's path cannot
    /// be written as a single line.
    pub fn serialize(&self) -> Result<String, StoreError> {
        let mut out = String::with_capacity(self.len() * 96);
        for record in self {
            let path = HashRecord::check_path(&record.path)?;
            out.push_str(&record.digest);
            out.push(FIELD_SEPARATOR);
            out.push_str(path);
            out.push('\n');
        }
        Ok(out)
    }

    /// Load the store from a file.
    ///
    /// A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file exists but cannot be read and
    /// [`StoreError::Corrupt`] if its content is malformed or not UTF-8.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No hash store at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let store = decode(bytes)
            .and_then(|content| Self::parse(&content))
            .inspect_err(|e| {
                log::error!("Refusing to use hash store {}: {}", path.display(), e);
            })?;
        log::debug!("Loaded {} records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Write the store to a file, replacing its previous content atomically.
    ///
    /// The content is fully serialized first, written to a temporary file in
    /// the destination directory, synced, and renamed over the destination.
    /// On failure the previous file is left untouched. Missing parent
    /// directories are created.
    ///
    /// An existing store keeps its permissions, and a symlinked store path
    /// keeps the link: the file it points to is replaced. A new store is
    /// created readable by its owner only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] on any I/O failure, or
    /// [`StoreError::UnrepresentablePath`] from serialization.
    pub fn persist(&self, path: &Path) -> Result<(), StoreError> {
        let content = self.serialize()?;
        let write_error = |source: std::io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let (target, existing) = match fs::canonicalize(path) {
            Ok(target) => {
                let metadata = fs::metadata(&target).map_err(write_error)?;
                (target, Some(metadata.permissions()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => (path.to_path_buf(), None),
            Err(e) => return Err(write_error(e)),
        };

        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(write_error)?;

        let mut tmp = NamedTempFile::new_in(&parent).map_err(write_error)?;
        if let Some(permissions) = existing {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(write_error)?;
        }
        tmp.write_all(content.as_bytes()).map_err(write_error)?;
        tmp.as_file().sync_all().map_err(write_error)?;
        tmp.persist(&target).map_err(|e| write_error(e.error))?;

        log::debug!("Persisted {} records to {}", self.len(), target.display());
        Ok(())
    }
}

/// Decode store bytes, naming the first line that is not UTF-8.
fn decode(bytes: Vec<u8>) -> Result<String, StoreError> {
    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        StoreError::Corrupt {
            line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
            reason: "not valid UTF-8".to_string(),
        }
    })
}

fn parse_line(line: &str) -> Result<HashRecord, String> {
    let (digest, path) = line
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| "missing tab separator".to_string())?;

    if digest.is_empty() {
        return Err("empty digest".to_string());
    }
    if hex_to_hash(digest).is_none() {
        return Err(format!("invalid digest '{digest}'"));
    }
    if path.is_empty() {
        return Err("empty path".to_string());
    }
    let path = PathBuf::from(path);
    if !path.is_absolute() {
        return Err(format!("path is not absolute: {}", path.display()));
    }

    Ok(HashRecord::new(digest, path))
}
