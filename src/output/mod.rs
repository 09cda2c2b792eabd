//! Report formatters.
//!
//! - [`text`]: one line per file plus a summary, optionally colored
//! - [`json`]: a single JSON document for scripting
//!
//! # Example
//!
//! ```no_run
//! use fintc::config::Config;
//! use fintc::ops::{run_operation, Operation};
//! use fintc::output::TextOutput;
//! use std::path::Path;
//!
//! let report = run_operation(&Config::default(), Operation::Verify, Path::new("/etc")).unwrap();
//! TextOutput::new(&report)
//!     .with_color(false)
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
