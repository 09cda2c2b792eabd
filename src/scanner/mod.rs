//! Scanner module for target enumeration and file hashing.
//!
//! This module provides functionality for:
//! - Resolving a target path into the regular files it denotes
//! - Content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Target resolution and recursive directory traversal
//! - [`hasher`]: BLAKE3 whole-file digests (streaming or memory-mapped)
//!
//! # Example
//!
//! ```no_run
//! use fintc::scanner::{Hasher, Walker};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! for entry in Walker::new(Path::new("/etc")).walk()? {
//!     match entry {
//!         Ok(path) => println!("{}  {}", hasher.digest_file(&path)?, path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{digest_bytes, hash_to_hex, hex_to_hash, Hash, Hasher, DIGEST_HEX_LEN};
pub use walker::{Walk, Walker};

/// Errors that can occur while enumerating a target.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The target is neither an existing regular file nor a directory.
    #[error("Not a file or directory: {0}")]
    NotFoundOrUnsupported(PathBuf),

    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Following a symbolic link would revisit one of its own ancestors.
    #[error("Symlink loop: {path} points back to {ancestor}")]
    SymlinkLoop {
        /// Path of the offending link
        path: PathBuf,
        /// Ancestor directory the link resolves to
        ancestor: PathBuf,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFoundOrUnsupported(path) | Self::PermissionDenied(path) => path,
            Self::SymlinkLoop { path, .. } | Self::Io { path, .. } => path,
        }
    }

    /// Whether this error marks an entry that was skipped rather than failed.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::SymlinkLoop { .. })
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
