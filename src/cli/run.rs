//! CLI entry point and dispatch

use clap::Parser;
use netbound_config::Config;
use netbound_utils::logging::{init_tracing, init_tracing_json};
use netbound_utils::{ExitCode, NetboundError};

use super::args::Cli;
use super::commands;
use super::render::OutputMode;
use crate::bootstrap;

/// Main CLI execution function.
///
/// Prints all output, including errors, and returns the exit code to use on
/// failure. main.rs only maps the error to the process exit status.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let logging = if cli.json {
        init_tracing_json()
    } else {
        init_tracing(cli.verbose)
    };
    if let Err(e) = logging {
        eprintln!("warning: logging disabled: {e}");
    }

    let config = Config::discover(cli.config.as_deref()).map_err(|e| report(e.into()))?;
    let repository = bootstrap::open_repository(&config, cli.offline).map_err(report)?;

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let operation = cli.command.operation();

    rt.block_on(async {
        let handle = match commands::start(cli.command, &repository) {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("error: {operation}: {e:#}");
                return Err(ExitCode::INVALID_INPUT);
            }
        };
        commands::observe(handle, &repository, mode).await
    })
}

fn report(err: NetboundError) -> ExitCode {
    eprintln!("{}", err.display_for_user());
    ExitCode::from(&err)
}
