//! Command-line interface definitions for fintc.
//!
//! Every command takes exactly one file or directory. clap rejects a missing
//! or extra argument and any unknown command with a usage error (exit status
//! 2) before the store or the filesystem is touched. `fintc help` prints the
//! command list. Command names are matched ignoring ASCII case, so
//! `fintc VERIFY /etc` works too.
//!
//! # Example
//!
//! ```bash
//! # Record digests for everything under /usr/local/bin
//! fintc init /usr/local/bin
//!
//! # Check them later (non-zero exit on any mismatch)
//! fintc verify /usr/local/bin
//!
//! # Accept an intentional change
//! fintc update /usr/local/bin/tool
//!
//! # Stop tracking a file, using a store outside FINTC_HOME
//! fintc --store ./hashes delete /etc/motd
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::ops::Operation;

/// File integrity tracker.
///
/// Records BLAKE3 digests of files and detects when their content changes.
/// Digests are kept in $FINTC_HOME/hashes (default /var/lib/fintc/hashes).
#[derive(Debug, Parser)]
#[command(name = "fintc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Output format for per-file results
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Hash store file to use instead of $FINTC_HOME/hashes
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse the process arguments, accepting command names in any case.
    ///
    /// Exits with a usage error on invalid arguments.
    #[must_use]
    pub fn parse_any_case() -> Self {
        Self::parse_from(normalize_command_case(std::env::args_os()))
    }

    /// Like [`Cli::parse_any_case`] but for explicit arguments, returning the
    /// parse error instead of exiting.
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_any_case<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_command_case(args))
    }
}

/// Lowercase the command name if it matches a known command ignoring case.
///
/// Global flags may precede the command; values of flags that take one are
/// skipped so `--store INIT` is left alone.
fn normalize_command_case<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut command = Cli::command();
    command.build();
    let value_args: Vec<&clap::Arg> = command
        .get_arguments()
        .filter(|arg| arg.get_action().takes_values())
        .collect();
    let long_flags: Vec<String> = value_args
        .iter()
        .filter_map(|arg| arg.get_long())
        .map(|long| format!("--{long}"))
        .collect();
    let short_flags: Vec<char> = value_args.iter().filter_map(|arg| arg.get_short()).collect();
    let names: Vec<&str> = command
        .get_subcommands()
        .map(clap::Command::get_name)
        .chain(["help"])
        .collect();

    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args[i].to_str() else {
            break;
        };
        if arg == "--" {
            break;
        }
        if arg.starts_with("--") {
            i += if long_flags.iter().any(|flag| flag == arg) { 2 } else { 1 };
            continue;
        }
        if let Some(cluster) = arg.strip_prefix('-').filter(|c| !c.is_empty()) {
            // -o json takes the next argument, -ojson and -vo json are clusters
            let value_follows = cluster
                .char_indices()
                .find(|(_, c)| short_flags.contains(c))
                .is_some_and(|(at, c)| at + c.len_utf8() == cluster.len());
            i += if value_follows { 2 } else { 1 };
            continue;
        }
        if let Some(name) = names.iter().find(|name| name.eq_ignore_ascii_case(arg)) {
            args[i] = OsString::from(*name);
        }
        break;
    }
    args
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize the integrity hash(es) of the given file/directory
    Init(TargetArgs),
    /// Verify the integrity of the given file/directory
    Verify(TargetArgs),
    /// Update the hash(es) of the given file/directory
    Update(TargetArgs),
    /// Delete the hash(es) of the given file/directory
    Delete(TargetArgs),
}

impl Commands {
    /// The operation this command runs.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Init(_) => Operation::Init,
            Self::Verify(_) => Operation::Verify,
            Self::Update(_) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }

    /// The file or directory the command applies to.
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            Self::Init(args) | Self::Verify(args) | Self::Update(args) | Self::Delete(args) => {
                &args.path
            }
        }
    }
}

/// The single path argument shared by all commands.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// File or directory
    #[arg(value_name = "FILE/DIR")]
    pub path: PathBuf,
}

/// Output format for per-file results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per file plus a summary
    Text,
    /// A single JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
