mod cli;
mod commands;
mod error;
mod registry;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use error::JnError;

/// Entry point (spec.md §6.1): parse the subcommand, then race it against
/// `SIGINT` the same way `gauss-server` races its shutdown signal against
/// in-flight work, except `jn` has nothing to reload and nothing left
/// running once the race is decided — it exits 130 outright rather than
/// looping back for more signals.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let run = tokio::task::spawn_blocking(move || run_command(cli));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("SIGINT received");
            ExitCode::from(130)
        }
        outcome = run => match outcome {
            Ok(Ok(code)) => ExitCode::from(code as u8),
            Ok(Err(err)) => {
                eprintln!("jn: {err}");
                ExitCode::from(err.exit_code() as u8)
            }
            Err(join_err) => {
                eprintln!("jn: {join_err}");
                ExitCode::from(1)
            }
        },
    }
}

/// Pipeline orchestration is synchronous (`jn-pipeline` blocks on
/// `spawn`/`wait`, per its own module doc), so the whole command body runs
/// on a blocking thread; only the signal race at the top is async.
fn run_command(cli: Cli) -> Result<i32, JnError> {
    let registry = registry::discover()?;
    let timeout = cli.timeout.map(std::time::Duration::from_secs);
    match cli.command {
        Command::Cat { sources } => commands::cat(&sources, &registry, timeout),
        Command::Put { sink } => commands::put(&sink, &registry, timeout),
        Command::Filter { expr } => commands::filter(&expr, &registry, timeout),
        Command::Merge { sources } => commands::merge(&sources, &registry, timeout),
        Command::Resolve { addr, mode } => commands::resolve_dry_run(&addr, &mode, &registry),
    }
}
