//! JSON output formatter for operation reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "operation": "verify",
//!   "root": "/etc",
//!   "files": [
//!     { "path": "/etc/hosts", "status": "match" },
//!     { "path": "/etc/motd", "status": "mismatch", "expected": "…", "actual": "…" }
//!   ],
//!   "summary": {
//!     "total_files": 2,
//!     "counts": { "matched": 1, "mismatched": 1, "...": 0 },
//!     "exit_code": 3,
//!     "exit_code_name": "FI003"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ExitCode;
use crate::ops::{FileReport, Operation, OutcomeCounts, Report};

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of per-file entries
    pub total_files: usize,
    /// Entries by outcome
    pub counts: OutcomeCounts,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FI000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// The operation applied
    pub operation: Operation,
    /// The target as given
    pub root: &'a PathBuf,
    /// Per-file results
    pub files: &'a [FileReport],
    /// Aggregate counts and exit status
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create JSON output for a report.
    #[must_use]
    pub fn new(report: &'a Report, exit_code: ExitCode) -> Self {
        Self {
            operation: report.operation,
            root: &report.root,
            files: &report.entries,
            summary: JsonSummary {
                total_files: report.entries.len(),
                counts: report.counts(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing JSON: {0}")]
    Io(#[from] std::io::Error),
}
