//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for fintc.
///
/// - 0: Success (every file processed, verify found nothing wrong)
/// - 1: General error (unknown target, unreadable or corrupt store, config)
/// - 2: Usage error, reported by the argument parser before any work
/// - 3: Integrity failure (verify saw a mismatch, untracked or missing file)
/// - 4: Partial success (completed, but some files could not be processed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: The operation completed without per-file failures.
    Success = 0,
    /// General error: A fatal error stopped the operation.
    GeneralError = 1,
    /// Usage error: Wrong arguments or unknown command.
    Usage = 2,
    /// Integrity failure: Verify found content that does not match its record.
    IntegrityFailure = 3,
    /// Partial success: Some files failed with I/O errors.
    PartialSuccess = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FI000",
            Self::GeneralError => "FI001",
            Self::Usage => "FI002",
            Self::IntegrityFailure => "FI003",
            Self::PartialSuccess => "FI004",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FI001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
