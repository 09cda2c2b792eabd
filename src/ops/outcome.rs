//! Per-file outcomes and the aggregate report of one operation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::Operation;
use crate::error::ExitCode;

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// `init` recorded a new digest.
    Initialized {
        /// Recorded digest
        digest: String,
    },
    /// `init` found an existing record and left it alone.
    AlreadyTracked,
    /// `verify` recomputed the digest and it matches the record.
    Match,
    /// `verify` recomputed the digest and it differs from the record.
    Mismatch {
        /// Recorded digest
        expected: String,
        /// Current digest
        actual: String,
    },
    /// A record exists under a verified directory but its file is gone.
    Missing,
    /// `update` replaced a stale digest.
    Updated {
        /// Digest before the update
        previous: String,
        /// Digest after the update
        digest: String,
    },
    /// `update` found the recorded digest still current.
    Unchanged,
    /// `delete` removed the record.
    Deleted,
    /// `verify`, `update` or `delete` found no record for the file.
    NotTracked,
    /// The entry was deliberately not processed.
    Skipped {
        /// Why it was skipped
        reason: String,
    },
    /// The file could not be processed.
    Failed {
        /// Error message
        error: String,
    },
}

impl Outcome {
    /// Short uppercase label for display.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "ADDED",
            Self::AlreadyTracked => "TRACKED",
            Self::Match => "OK",
            Self::Mismatch { .. } => "MISMATCH",
            Self::Missing => "MISSING",
            Self::Updated { .. } => "UPDATED",
            Self::Unchanged => "UNCHANGED",
            Self::Deleted => "DELETED",
            Self::NotTracked => "UNTRACKED",
            Self::Skipped { .. } => "SKIPPED",
            Self::Failed { .. } => "ERROR",
        }
    }

    /// Whether this outcome changed the store.
    #[must_use]
    pub fn modifies_store(&self) -> bool {
        matches!(
            self,
            Self::Initialized { .. } | Self::Updated { .. } | Self::Deleted
        )
    }

    /// Whether the file could not be processed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Canonical path, or the path an error was raised for
    pub path: PathBuf,
    /// What happened
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Tally of outcomes by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    /// Files newly recorded by `init`
    pub initialized: usize,
    /// Files `init` left alone because they were already recorded
    pub already_tracked: usize,
    /// Files whose digest equals the recorded one
    pub matched: usize,
    /// Files whose digest differs from the recorded one
    pub mismatched: usize,
    /// Recorded paths that no longer exist
    pub missing: usize,
    /// Records `update` rewrote with a new digest
    pub updated: usize,
    /// Records `update` found already current
    pub unchanged: usize,
    /// Records removed by `delete`
    pub deleted: usize,
    /// Files with no record, for `verify`, `update` and `delete`
    pub not_tracked: usize,
    /// Entries that are not regular files
    pub skipped: usize,
    /// Entries that could not be read or hashed
    pub failed: usize,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: &Outcome) {
        let slot = match outcome {
            Outcome::Initialized { .. } => &mut self.initialized,
            Outcome::AlreadyTracked => &mut self.already_tracked,
            Outcome::Match => &mut self.matched,
            Outcome::Mismatch { .. } => &mut self.mismatched,
            Outcome::Missing => &mut self.missing,
            Outcome::Updated { .. } => &mut self.updated,
            Outcome::Unchanged => &mut self.unchanged,
            Outcome::Deleted => &mut self.deleted,
            Outcome::NotTracked => &mut self.not_tracked,
            Outcome::Skipped { .. } => &mut self.skipped,
            Outcome::Failed { .. } => &mut self.failed,
        };
        *slot += 1;
    }

    /// Non-zero counts as `(label, count)` pairs, in a fixed order.
    #[must_use]
    pub fn non_zero(&self) -> Vec<(&'static str, usize)> {
        [
            ("added", self.initialized),
            ("already tracked", self.already_tracked),
            ("ok", self.matched),
            ("mismatched", self.mismatched),
            ("missing", self.missing),
            ("updated", self.updated),
            ("unchanged", self.unchanged),
            ("deleted", self.deleted),
            ("untracked", self.not_tracked),
            ("skipped", self.skipped),
            ("failed", self.failed),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

/// Result of applying one operation to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// The operation applied
    pub operation: Operation,
    /// The target as given by the caller
    pub root: PathBuf,
    /// Per-file outcomes in processing order
    pub entries: Vec<FileReport>,
}

impl Report {
    /// Create an empty report.
    #[must_use]
    pub fn new(operation: Operation, root: impl Into<PathBuf>) -> Self {
        Self {
            operation,
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Append an outcome.
    pub fn push(&mut self, path: impl Into<PathBuf>, outcome: Outcome) {
        self.entries.push(FileReport {
            path: path.into(),
            outcome,
        });
    }

    /// Outcome recorded for a path, if any.
    #[must_use]
    pub fn outcome_for(&self, path: &Path) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| &e.outcome)
    }

    /// Tally outcomes by kind.
    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for entry in &self.entries {
            counts.record(&entry.outcome);
        }
        counts
    }

    /// Whether any file failed to process.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| e.outcome.is_failure())
    }

    /// Whether verify found content that cannot be vouched for.
    ///
    /// Mismatched, untracked and missing files all count. Always `false` for
    /// the other operations.
    #[must_use]
    pub fn has_integrity_failures(&self) -> bool {
        self.operation == Operation::Verify
            && self.entries.iter().any(|e| {
                matches!(
                    e.outcome,
                    Outcome::Mismatch { .. } | Outcome::NotTracked | Outcome::Missing
                )
            })
    }

    /// Whether any record was inserted, replaced or removed.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.entries.iter().any(|e| e.outcome.modifies_store())
    }

    /// Process exit code for this report.
    ///
    /// Integrity failures take precedence over I/O failures.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.has_integrity_failures() {
            ExitCode::IntegrityFailure
        } else if self.has_failures() {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}
