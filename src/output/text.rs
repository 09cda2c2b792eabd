//! Human-readable report output.
//!
//! ```text
//! ADDED     /etc/hosts (3a7bd3e2)
//! TRACKED   /etc/passwd
//! init /etc: 2 files (1 added, 1 already tracked)
//! ```

use std::io::{self, Write};

use yansi::{Color, Paint};

use crate::ops::{Outcome, Report};
use crate::store::preview;

/// Width of the status label column.
const LABEL_WIDTH: usize = 9;

/// Plain text formatter for a [`Report`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a Report,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter with color enabled.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self {
            report,
            color: true,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write every entry and the summary line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for entry in &self.report.entries {
            writeln!(
                writer,
                "{} {}{}",
                self.label(&entry.outcome),
                entry.path.display(),
                detail(&entry.outcome)
            )?;
        }
        writeln!(writer, "{}", self.summary())
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Summary line, e.g. `verify /etc: 3 files (2 ok, 1 mismatched)`.
    #[must_use]
    pub fn summary(&self) -> String {
        let counts = self.report.counts();
        let parts: Vec<String> = counts
            .non_zero()
            .into_iter()
            .map(|(label, n)| format!("{n} {label}"))
            .collect();
        let total = self.report.entries.len();
        let noun = if total == 1 { "file" } else { "files" };

        if parts.is_empty() {
            format!(
                "{} {}: {total} {noun}",
                self.report.operation,
                self.report.root.display()
            )
        } else {
            format!(
                "{} {}: {total} {noun} ({})",
                self.report.operation,
                self.report.root.display(),
                parts.join(", ")
            )
        }
    }

    fn label(&self, outcome: &Outcome) -> String {
        let padded = format!("{:<width$}", outcome.label(), width = LABEL_WIDTH);
        if !self.color {
            return padded;
        }
        let color = match outcome {
            Outcome::Initialized { .. } | Outcome::Match | Outcome::Updated { .. } => Color::Green,
            Outcome::Deleted => Color::Cyan,
            Outcome::Mismatch { .. } | Outcome::Missing | Outcome::Failed { .. } => Color::Red,
            Outcome::NotTracked | Outcome::Skipped { .. } => Color::Yellow,
            Outcome::AlreadyTracked | Outcome::Unchanged => Color::Primary,
        };
        padded.fg(color).bold().to_string()
    }
}

fn detail(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Initialized { digest } => format!(" ({})", preview(digest)),
        Outcome::Mismatch { expected, actual } => format!(
            " (expected {}, found {})",
            preview(expected),
            preview(actual)
        ),
        Outcome::Updated { previous, digest } => {
            format!(" ({} -> {})", preview(previous), preview(digest))
        }
        Outcome::Skipped { reason } => format!(": {reason}"),
        Outcome::Failed { error } => format!(": {error}"),
        _ => String::new(),
    }
}
