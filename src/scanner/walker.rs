//! Target resolution and directory traversal using walkdir.
//!
//! # Overview
//!
//! [`Walker`] turns a target path into the regular files it denotes:
//!
//! - a regular file yields itself,
//! - a directory yields every regular file beneath it, recursively,
//! - anything else fails with [`ScanError::NotFoundOrUnsupported`] before a
//!   single entry is produced.
//!
//! Every yielded path is canonical (absolute, symlinks resolved), which is the
//! identity the hash store matches on. Symbolic links are followed. walkdir
//! checks each followed directory link against its ancestors, so a link
//! pointing back up the tree surfaces as [`ScanError::SymlinkLoop`] instead of
//! recursing forever. A file reachable through several links is yielded once.
//!
//! Directory entries are visited in file-name order so results are
//! reproducible between runs.
//!
//! # Example
//!
//! ```no_run
//! use fintc::scanner::Walker;
//! use std::path::Path;
//!
//! let files = Walker::new(Path::new("/usr/local/bin")).enumerate().unwrap();
//! println!("Found {} files", files.len());
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ScanError;

/// Resolves a target path into regular files.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Target as given by the caller
    target: PathBuf,
}

impl Walker {
    /// Create a walker for the given target.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            target: path.to_path_buf(),
        }
    }

    /// Start walking.
    ///
    /// The target itself is validated and canonicalized eagerly; errors below
    /// it are yielded by the returned iterator so callers can carry on.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFoundOrUnsupported`] when the target is neither
    /// a regular file nor a directory, or another [`ScanError`] when it
    /// cannot be inspected.
    pub fn walk(&self) -> Result<Walk, ScanError> {
        let metadata = fs::metadata(&self.target).map_err(|e| self.root_error(e))?;
        if !metadata.is_file() && !metadata.is_dir() {
            return Err(ScanError::NotFoundOrUnsupported(self.target.clone()));
        }

        let root = fs::canonicalize(&self.target).map_err(|e| self.root_error(e))?;
        log::debug!("Resolved {} to {}", self.target.display(), root.display());

        let source = if metadata.is_dir() {
            Source::Tree(
                WalkDir::new(&root)
                    .follow_links(true)
                    .sort_by_file_name()
                    .into_iter(),
            )
        } else {
            Source::Single(Some(root.clone()))
        };

        Ok(Walk {
            root,
            source,
            seen: HashSet::new(),
        })
    }

    /// Collect every file the target denotes.
    ///
    /// Unlike [`Walker::walk`] this is all-or-nothing: the first error
    /// anywhere in the tree is returned.
    ///
    /// # Errors
    ///
    /// Any [`ScanError`] raised for the target or an entry beneath it.
    pub fn enumerate(&self) -> Result<Vec<PathBuf>, ScanError> {
        self.walk()?.collect()
    }

    fn root_error(&self, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => ScanError::NotFoundOrUnsupported(self.target.clone()),
            ErrorKind::PermissionDenied => ScanError::PermissionDenied(self.target.clone()),
            _ => ScanError::Io {
                path: self.target.clone(),
                source: error,
            },
        }
    }
}

enum Source {
    Single(Option<PathBuf>),
    Tree(walkdir::IntoIter),
}

/// Iterator over the canonical file paths of one target.
pub struct Walk {
    root: PathBuf,
    source: Source,
    seen: HashSet<PathBuf>,
}

impl Walk {
    /// Canonical form of the walked target.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the target is a directory.
    #[must_use]
    pub fn is_tree(&self) -> bool {
        matches!(self.source, Source::Tree(_))
    }
}

impl std::fmt::Debug for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("root", &self.root)
            .field("is_tree", &self.is_tree())
            .field("seen", &self.seen.len())
            .finish()
    }
}

impl Iterator for Walk {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = match &mut self.source {
            Source::Single(path) => return path.take().map(Ok),
            Source::Tree(entries) => entries,
        };

        loop {
            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(convert_walkdir_error(&self.root, e))),
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                log::trace!("Skipping non-regular file: {}", entry.path().display());
                continue;
            }

            let path = match fs::canonicalize(entry.path()) {
                Ok(path) => path,
                Err(e) => return Some(Err(entry_error(entry.path(), e))),
            };

            if !self.seen.insert(path.clone()) {
                log::trace!(
                    "Skipping {} (already visited as {})",
                    entry.path().display(),
                    path.display()
                );
                continue;
            }

            return Some(Ok(path));
        }
    }
}

fn entry_error(path: &Path, error: std::io::Error) -> ScanError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        log::warn!("Permission denied: {}", path.display());
        ScanError::PermissionDenied(path.to_path_buf())
    } else {
        log::warn!("I/O error for {}: {}", path.display(), error);
        ScanError::Io {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

fn convert_walkdir_error(root: &Path, error: walkdir::Error) -> ScanError {
    let path = error.path().unwrap_or(root).to_path_buf();

    if let Some(ancestor) = error.loop_ancestor() {
        log::warn!(
            "Not following symlink loop: {} -> {}",
            path.display(),
            ancestor.display()
        );
        return ScanError::SymlinkLoop {
            ancestor: ancestor.to_path_buf(),
            path,
        };
    }

    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory traversal failed"));
    entry_error(&path, source)
}
