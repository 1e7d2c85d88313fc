//! Paramgate CLI - validate raw request parameters against declared models
//!
//! Binary name: `paramgate`
//!
//! Exit codes:
//! - 0: success
//! - 1: input rejected by validation
//! - 2: configuration, IO or parse error
//! - 3: field access or service error

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod input;
mod output;
mod setup;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if let Err(err) = setup::init_tracing() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Warning: {err}");
        }
    }

    match commands::run(&cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            output::error(cli.json, &err);
            ExitCode::from(output::exit_code(&err))
        }
    }
}
