//! fintc - File Integrity Tracker
//!
//! Records a BLAKE3 digest for every tracked file in a plain text store and
//! later detects whether the file's content has changed. Targets can be single
//! files or whole directory trees.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod ops;
pub mod output;
pub mod scanner;
pub mod store;

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};

/// Run the application for parsed command-line arguments.
///
/// Returns the exit code to use for a completed operation; fatal errors are
/// returned as `Err`.
///
/// # Errors
///
/// Configuration errors, an unusable target, an unreadable/corrupt/unwritable
/// store, or a failure to write the report.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load()?;
    if let Some(store) = &cli.store {
        config = config.with_store_path(store);
    }

    let operation = cli.command.operation();
    let target = cli.command.target();
    let report = ops::run_operation(&config, operation, target)
        .with_context(|| format!("{} {} failed", operation, target.display()))?;
    let exit_code = report.exit_code();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            let color = !cli.no_color && stdout.is_terminal();
            TextOutput::new(&report)
                .with_color(color)
                .write_to(&mut out)
                .context("Failed to write report")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&report, exit_code)
                .write_to(&mut out, true)
                .context("Failed to write report")?;
        }
    }
    out.flush().context("Failed to write report")?;

    Ok(exit_code)
}
