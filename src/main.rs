//! fintc - File Integrity Tracker
//!
//! Entry point for the fintc CLI application.

use fintc::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    // Usage errors exit here with status 2, before any filesystem access
    let cli = Cli::parse_any_case();
    let json_errors = cli.json_errors;

    match fintc::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
