//! `haulbook` operator CLI.
//!
//! # Responsibility
//! - Expose core listing, detail, registration and wipe use-cases from a
//!   terminal.
//! - Keep stdout machine-readable (JSON); errors go to stderr.

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match commands::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
