//! Luaform CLI
//!
//! Headless host for the luaform transformation engine.

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{init::run_init, process::run_process, rules::run_rules};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the program.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(failed) => {
            if failed {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

/// Runs the selected command. `Ok(true)` means the transformation failed.
fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Commands::Process {
            input,
            strict,
            lenient,
            mode,
            format,
            output,
        } => run_process(
            cli,
            input,
            commands::process::Overrides {
                strict: *strict,
                lenient: *lenient,
                mode: mode.as_deref(),
            },
            format,
            output.as_deref(),
        ),
        Commands::Rules => run_rules().map(|_| false),
        Commands::Init { force } => run_init(*force).map(|_| false),
    }
}
