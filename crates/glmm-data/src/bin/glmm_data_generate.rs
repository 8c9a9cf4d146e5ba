//! Scenario dataset generator.
//!
//! This binary delegates to `glmm_data::generate_cli` for parsing and
//! generation, keeping the CLI behaviour testable without spawning a process.
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use glmm_data::generate_cli::{CliError, ParseOutcome, parse_args, run, success_message};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        drop(writeln!(io::stderr().lock(), "tracing init failed: {err}"));
    }
}

fn run_cli() -> Result<(), CliError> {
    match parse_args(env::args().skip(1))? {
        ParseOutcome::Help(text) => {
            write_stdout(&text);
            Ok(())
        }
        ParseOutcome::Options(options) => {
            for outcome in run(&options)? {
                write_stdout(&success_message(&outcome, options.out_dir()));
            }
            Ok(())
        }
    }
}

fn write_stdout(message: &str) {
    if let Err(err) = writeln!(io::stdout().lock(), "{}", message.trim_end()) {
        drop(err);
    }
}
