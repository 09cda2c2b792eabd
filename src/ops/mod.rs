//! Operation dispatch: init, verify, update and delete over a target.
//!
//! # Overview
//!
//! [`Dispatcher`] walks a target with [`Walker`] and applies one
//! [`Operation`] to every file it yields, against a borrowed [`HashStore`]:
//!
//! | Operation | Tracked file             | Untracked file         |
//! |-----------|--------------------------|------------------------|
//! | init      | `AlreadyTracked`         | hash, insert           |
//! | verify    | `Match` / `Mismatch`     | `NotTracked`           |
//! | update    | `Unchanged` / `Updated`  | `NotTracked`           |
//! | delete    | remove, `Deleted`        | `NotTracked`           |
//!
//! Files are processed independently. A file that cannot be read becomes a
//! `Failed` entry and the walk continues. Only an unusable target (or store)
//! aborts the operation.
//!
//! The dispatcher never touches the store file. [`run_operation`] is the
//! single place that loads it and, for mutating operations that changed
//! something, persists it once after the whole walk.
//!
//! # Example
//!
//! ```no_run
//! use fintc::config::Config;
//! use fintc::ops::{run_operation, Operation};
//! use std::path::Path;
//!
//! let config = Config::with_home("/var/lib/fintc");
//! let report = run_operation(&config, Operation::Verify, Path::new("/usr/bin")).unwrap();
//! println!("{:?}", report.counts());
//! ```

pub mod outcome;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::config::Config;
use crate::scanner::{Hasher, ScanError, Walker};
use crate::store::{HashRecord, HashStore, StoreError};

pub use outcome::{FileReport, Outcome, OutcomeCounts, Report};

/// The four operations on tracked files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Record digests for untracked files.
    Init,
    /// Compare current digests with recorded ones.
    Verify,
    /// Refresh recorded digests of tracked files.
    Update,
    /// Forget tracked files.
    Delete,
}

impl Operation {
    /// All operations, in help order.
    pub const ALL: [Operation; 4] = [Self::Init, Self::Verify, Self::Update, Self::Delete];

    /// Command name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Verify => "verify",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Whether the operation can change the store.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Verify)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = OpError;

    /// Parse a command name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| OpError::UnknownCommand(s.to_string()))
    }
}

/// Errors that abort an operation as a whole.
#[derive(thiserror::Error, Debug)]
pub enum OpError {
    /// The operation name is not recognized.
    #[error("Unknown command '{0}' (expected one of: init, verify, update, delete)")]
    UnknownCommand(String),

    /// The target could not be enumerated.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The store could not be loaded or persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies operations to targets against a borrowed store.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    store: &'a mut HashStore,
    hasher: Hasher,
    excluded: HashSet<PathBuf>,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher over a store.
    #[must_use]
    pub fn new(store: &'a mut HashStore, hasher: Hasher) -> Self {
        Self {
            store,
            hasher,
            excluded: HashSet::new(),
        }
    }

    /// Never process the given canonical path (e.g. the store file itself).
    #[must_use]
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.insert(path.into());
        self
    }

    /// Apply `operation` to every file under `target`.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::Scan`] if the target is neither a file nor a
    /// directory. The store is untouched in that case. Per-file problems are
    /// reported in the returned [`Report`] instead.
    pub fn run(&mut self, operation: Operation, target: &Path) -> Result<Report, OpError> {
        let walk = Walker::new(target).walk()?;
        let root = walk.root().to_path_buf();
        let is_tree = walk.is_tree();
        let mut report = Report::new(operation, target);
        let mut visited = HashSet::new();

        log::info!("{} {}", operation, root.display());

        for item in walk {
            match item {
                Ok(path) => {
                    let outcome = if self.excluded.contains(&path) {
                        Outcome::Skipped {
                            reason: "hash store file".to_string(),
                        }
                    } else {
                        self.apply(operation, &path)
                    };
                    log::debug!("{} {}: {}", operation, path.display(), outcome.label());
                    visited.insert(path.clone());
                    report.push(path, outcome);
                }
                Err(err) if err.is_skip() => {
                    let reason = err.to_string();
                    report.push(err.path().to_path_buf(), Outcome::Skipped { reason });
                }
                Err(err) => {
                    let error = err.to_string();
                    report.push(err.path().to_path_buf(), Outcome::Failed { error });
                }
            }
        }

        if operation == Operation::Verify && is_tree {
            for record in self.store.iter() {
                if record.path.starts_with(&root)
                    && !visited.contains(&record.path)
                    && is_gone(&record.path)
                {
                    log::debug!("verify {}: MISSING", record.path.display());
                    report.push(record.path.clone(), Outcome::Missing);
                }
            }
        }

        Ok(report)
    }

    fn apply(&mut self, operation: Operation, path: &Path) -> Outcome {
        match operation {
            Operation::Init => self.init(path),
            Operation::Verify => self.verify(path),
            Operation::Update => self.update(path),
            Operation::Delete => self.delete(path),
        }
    }

    fn init(&mut self, path: &Path) -> Outcome {
        if self.store.contains(path) {
            return Outcome::AlreadyTracked;
        }
        if let Err(e) = HashRecord::check_path(path) {
            return failed(e);
        }
        match self.hasher.digest_file(path) {
            Ok(digest) => {
                self.store.insert(digest.clone(), path);
                Outcome::Initialized { digest }
            }
            Err(e) => failed(e),
        }
    }

    fn verify(&self, path: &Path) -> Outcome {
        let Some(record) = self.store.lookup(path) else {
            return Outcome::NotTracked;
        };
        match self.hasher.digest_file(path) {
            Ok(actual) if actual == record.digest => Outcome::Match,
            Ok(actual) => Outcome::Mismatch {
                expected: record.digest.clone(),
                actual,
            },
            Err(e) => failed(e),
        }
    }

    fn update(&mut self, path: &Path) -> Outcome {
        let Some(previous) = self.store.lookup(path).map(|r| r.digest.clone()) else {
            return Outcome::NotTracked;
        };
        match self.hasher.digest_file(path) {
            Ok(digest) if digest == previous => Outcome::Unchanged,
            Ok(digest) => {
                self.store.replace(path, digest.clone());
                Outcome::Updated { previous, digest }
            }
            Err(e) => failed(e),
        }
    }

    fn delete(&mut self, path: &Path) -> Outcome {
        match self.store.remove(path) {
            Some(_) => Outcome::Deleted,
            None => Outcome::NotTracked,
        }
    }
}

/// Whether nothing exists at `path` any more.
///
/// Records the walk could not reach (behind an unreadable directory, say)
/// are not gone; their directory is already reported as failed.
fn is_gone(path: &Path) -> bool {
    matches!(
        std::fs::symlink_metadata(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound
    )
}

fn failed(error: impl std::error::Error) -> Outcome {
    log::warn!("{}", error);
    Outcome::Failed {
        error: error.to_string(),
    }
}

/// Load the store, apply one operation, and persist if needed.
///
/// The store is written exactly once, after all files were processed, and
/// only when the operation is mutating and at least one record changed.
/// `verify` never writes.
///
/// # Errors
///
/// Fatal errors only: an unusable target, or a store that cannot be read,
/// parsed or written. Nothing is persisted in any of those cases.
pub fn run_operation(
    config: &Config,
    operation: Operation,
    target: &Path,
) -> Result<Report, OpError> {
    let store_path = config.store_path();
    let mut store = HashStore::load(&store_path)?;

    let hasher = Hasher::new().with_mmap_threshold(config.mmap_threshold);
    let mut dispatcher = Dispatcher::new(&mut store, hasher);
    if let Ok(canonical) = std::fs::canonicalize(&store_path) {
        dispatcher = dispatcher.exclude(canonical);
    }
    let report = dispatcher.run(operation, target)?;

    if operation.is_mutating() && report.is_modified() {
        store.persist(&store_path)?;
        log::info!(
            "Saved {} records to {}",
            store.len(),
            store_path.display()
        );
    }

    Ok(report)
}
