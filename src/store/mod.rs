//! Hash record store.
//!
//! The store is an ordered list of [`HashRecord`]s backed by a single text
//! file. It is loaded once per invocation, mutated in memory and written back
//! in one atomic step by mutating operations.
//!
//! # Architecture
//!
//! * [`record`]: The record type and path representability checks.
//! * [`io`]: The on-disk format (`digest<TAB>path` lines), loading and
//!   atomic persistence. Operation logic never touches the format directly.
//!
//! # Matching
//!
//! Every lookup compares the canonical path for exact equality, so
//! `/a/foo.txt` and `/a/barfoo.txt` are always distinct records.
//!
//! # Concurrency
//!
//! There is no locking. Two processes updating the same store file race and
//! the last one to persist wins; records added by the other are lost.

pub mod io;
pub mod record;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use record::{preview, HashRecord, PREVIEW_LEN};

/// Errors raised while reading, parsing or writing the store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The store file exists but could not be read.
    #[error("Failed to read hash store {path}: {source}")]
    Read {
        /// Store file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The store file could not be written.
    #[error("Failed to write hash store {path}: {source}")]
    Write {
        /// Store file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The store content is malformed.
    #[error("Corrupt hash store at line {line}: {reason}")]
    Corrupt {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// The path cannot be encoded as a store line.
    #[error("Path cannot be recorded (non-UTF-8 or contains a tab/newline): {0}")]
    UnrepresentablePath(PathBuf),
}

/// Ordered collection of hash records.
///
/// Records keep their insertion order for persistence. A path index makes
/// every lookup, replacement and removal constant time, so checking a large
/// tree against a large store stays bounded by hashing I/O.
#[derive(Debug, Clone, Default)]
pub struct HashStore {
    /// Insertion-ordered slots; removed records leave a `None` behind
    slots: Vec<Option<HashRecord>>,
    /// Path to slot position
    index: HashMap<PathBuf, usize>,
}

impl HashStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, keeping their order.
    ///
    /// A repeated path overwrites the digest of its first occurrence.
    #[must_use]
    pub fn from_records(records: Vec<HashRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            if !store.replace(&record.path, record.digest.clone()) {
                store.push(record);
            }
        }
        store
    }

    /// Find the record for a path.
    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<&HashRecord> {
        let slot = *self.index.get(path)?;
        self.slots[slot].as_ref()
    }

    /// Whether a path is tracked.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    /// Append a record.
    ///
    /// The caller must have checked that `path` is not tracked yet.
    pub fn insert(&mut self, digest: impl Into<String>, path: impl Into<PathBuf>) {
        let record = HashRecord::new(digest, path);
        debug_assert!(
            !self.contains(&record.path),
            "duplicate record for {}",
            record.path.display()
        );
        self.push(record);
    }

    /// Overwrite the digest of a tracked path in place.
    ///
    /// Returns `false` if the path is not tracked.
    pub fn replace(&mut self, path: &Path, digest: impl Into<String>) -> bool {
        let Some(&slot) = self.index.get(path) else {
            return false;
        };
        match self.slots[slot].as_mut() {
            Some(record) => {
                record.digest = digest.into();
                true
            }
            None => false,
        }
    }

    /// Remove the record for a path.
    pub fn remove(&mut self, path: &Path) -> Option<HashRecord> {
        let slot = self.index.remove(path)?;
        self.slots[slot].take()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate over records in store order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    fn push(&mut self, record: HashRecord) {
        self.index.insert(record.path.clone(), self.slots.len());
        self.slots.push(Some(record));
    }
}

impl PartialEq for HashStore {
    /// Stores are equal when they hold the same records in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for HashStore {}

/// Iterator over the records of a [`HashStore`] in store order.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    slots: std::slice::Iter<'a, Option<HashRecord>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a HashRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().find_map(Option::as_ref)
    }
}

impl<'a> IntoIterator for &'a HashStore {
    type Item = &'a HashRecord;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
