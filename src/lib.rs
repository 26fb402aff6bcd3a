// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod request;
pub mod supervisor;
pub mod worker;

use std::io::Read;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, WorkerArgs};
use crate::config::loader::{from_worker_payload, resolve_config_path};
use crate::config::load_and_validate;
use crate::console::{Console, ConsoleExit};
use crate::engine::ResticCli;
use crate::errors::{Result, ResticonError};
use crate::request::{CommandName, CommandRequest};
use crate::supervisor::{SelfExecLauncher, Supervisor};

/// Console entry point used by `main.rs`.
///
/// This wires together:
/// - one-time config loading (fatal on failure)
/// - the supervisor with the self-exec worker launcher
/// - the console loop over stdin/stdout
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<ConsoleExit> {
    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_and_validate(&config_path)?;
    info!(path = %config_path.display(), repository = %config.repository(), "config loaded");

    let launcher = SelfExecLauncher::current(args.log_level)?;
    let mut console = Console::new(Supervisor::new(launcher), config);

    let mut stdout = std::io::stdout();
    console.print_banner(&mut stdout)?;

    let input = BufReader::new(tokio::io::stdin());
    let exit = console.run(input, &mut stdout, interrupt_signal()).await?;
    info!(?exit, "console finished");
    Ok(exit)
}

/// Worker entry point: `resticon worker <command> -- <args>`.
///
/// Reads the config payload from stdin, runs the one operation, and returns.
/// Operational failures are printed by the worker itself; only a broken
/// handshake with the console surfaces as an error here.
pub async fn run_worker(args: WorkerArgs) -> Result<()> {
    let name = match args.command.parse::<CommandName>() {
        Ok(name) if name.is_worker_command() => name,
        _ => {
            return Err(ResticonError::Other(anyhow::anyhow!(
                "`{}` is not a worker command",
                args.command
            )));
        }
    };

    let mut payload = String::new();
    std::io::stdin()
        .read_to_string(&mut payload)
        .context("reading config payload from console")?;
    let config = from_worker_payload(&payload)?;

    let request = CommandRequest::new(name, args.args);
    let engine = ResticCli::from_config(&config);
    let mut stdout = std::io::stdout();

    let outcome = worker::run_request(&request, &config, &engine, &mut stdout).await?;
    debug!(command = %name, ?outcome, "worker finished");
    Ok(())
}

/// Resolves on the first Ctrl-C; never resolves if the handler cannot be
/// installed.
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
