// src/worker/mod.rs

//! Worker side: executes exactly one operator request and reports on it.
//!
//! A worker runs inside its own process (see [`crate::supervisor`]), so the
//! console is never affected by anything that happens here, including being
//! killed mid-operation. Every failure is caught and printed once; nothing
//! is retried and nothing is reported back to the console except the text
//! written to `out`.
//!
//! - [`listing`] implements `ls`.
//! - [`tags`] builds the backup tag set.

pub mod listing;
pub mod tags;

use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{Config, Credential};
use crate::engine::{BackupArgs, BackupEngine};
use crate::errors::{Result, ResticonError};
use crate::request::{CommandName, CommandRequest};

pub use listing::{list_directory, Listing};
pub use tags::backup_tags_now;

/// How a single worker run ended. Purely informational: the process exits
/// normally in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Operation ran and its result was printed.
    Completed,
    /// Operation could not run or failed; a diagnostic was printed.
    Diagnosed,
    /// Engine operation refused because only an inline password is configured.
    Refused,
}

/// Dispatch one request.
///
/// The returned error covers only failures to write to `out`; every
/// operational failure is printed and reported as an outcome instead.
pub async fn run_request<E, W>(
    request: &CommandRequest,
    config: &Config,
    engine: &E,
    out: &mut W,
) -> Result<WorkerOutcome>
where
    E: BackupEngine + ?Sized,
    W: Write,
{
    info!(command = %request.name, args = ?request.args, "worker dispatch");

    if request.name.uses_engine() && config.credential() == Credential::InlineOnly {
        warn!(command = %request.name, "refusing engine command: inline password without password_file");
        writeln!(
            out,
            "[!] warning: the backup engine needs a password_file, not an inline password"
        )?;
        writeln!(out, "[!] set `password_file` in the config file to a file holding the password")?;
        return Ok(WorkerOutcome::Refused);
    }

    let outcome = match request.name {
        CommandName::Ls => run_ls(request, config, out)?,
        CommandName::Backup => {
            let tags = backup_tags_now(&request.args);
            writeln!(
                out,
                "[*] starting backup of {}, tags: {:?}...",
                config.target_path().display(),
                tags
            )?;
            let args = BackupArgs {
                paths: vec![config.target_path().to_path_buf()],
                tags,
                exclude_patterns: config.exclude_patterns().to_vec(),
            };
            report(request.name, engine.backup(args).await, "backup succeeded", out)?
        }
        CommandName::Check => {
            writeln!(out, "[*] running repository consistency check...")?;
            report(request.name, engine.check().await, "check finished", out)?
        }
        CommandName::Snapshots => {
            writeln!(out, "[*] fetching snapshot list...")?;
            report(request.name, engine.snapshots().await, "snapshots", out)?
        }
        CommandName::Halt | CommandName::Stop => {
            // Intercepted by the console; reaching here is a routing bug.
            warn!(command = %request.name, "control command reached a worker; ignoring");
            writeln!(out, "[?] `{}` is handled by the console, not a worker", request.name)?;
            WorkerOutcome::Diagnosed
        }
    };

    out.flush()?;
    Ok(outcome)
}

fn run_ls<W: Write>(request: &CommandRequest, config: &Config, out: &mut W) -> Result<WorkerOutcome> {
    let dir = request
        .args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.target_path().to_path_buf());

    let listing = list_directory(&dir);
    writeln!(out, "{listing}")?;

    Ok(if listing.is_diagnostic() {
        WorkerOutcome::Diagnosed
    } else {
        WorkerOutcome::Completed
    })
}

fn report<W: Write>(
    command: CommandName,
    result: Result<String>,
    success_header: &str,
    out: &mut W,
) -> Result<WorkerOutcome> {
    match result {
        Ok(text) => {
            writeln!(out, "[+] {success_header}:\n{}", text.trim_end())?;
            Ok(WorkerOutcome::Completed)
        }
        Err(err) => {
            warn!(%command, error = %err, "engine operation failed");
            let message = match err {
                ResticonError::Engine(msg) => msg,
                other => other.to_string(),
            };
            writeln!(out, "[!] error while running {command}: {message}")?;
            Ok(WorkerOutcome::Diagnosed)
        }
    }
}
