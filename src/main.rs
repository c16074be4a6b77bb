//! acmco: exclusive checkout and check-in of shared ACM databases.
//!
//! This is the main entry point for the `acmco` CLI. It parses arguments,
//! installs stderr logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

mod cli;
mod commands;
pub mod audit;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod exit_codes;
pub mod fs;
pub mod identity;
pub mod locks;
pub mod logging;
pub mod machine;
pub mod record;
pub mod request;
pub mod response;
pub mod store;
pub mod token;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    match commands::dispatch(cli.command, cli.root.as_deref()) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
