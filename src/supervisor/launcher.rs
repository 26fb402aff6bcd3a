// src/supervisor/launcher.rs

//! How a worker process gets started.
//!
//! The supervisor only needs "give me a running child for this request";
//! [`WorkerLauncher`] is that seam. Production uses [`SelfExecLauncher`],
//! tests can launch plain shell scripts instead.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::cli::LogLevel;
use crate::config::loader::to_worker_payload;
use crate::config::Config;
use crate::errors::Result;
use crate::request::CommandRequest;

pub type LaunchFuture<'a> = Pin<Box<dyn Future<Output = Result<Child>> + Send + 'a>>;

/// Starts one isolated worker for a request.
///
/// The returned child must already be running and must lead its own process
/// group (`process_group(0)`): the supervisor kills workers by group. The
/// launcher must not set `kill_on_drop`: whether a worker outlives its handle
/// is the supervisor's decision.
pub trait WorkerLauncher: Send + Sync {
    fn launch<'a>(&'a self, request: &'a CommandRequest, config: &'a Config) -> LaunchFuture<'a>;
}

/// Re-executes the current binary as `resticon worker <command> -- <args>`.
///
/// The validated config is written to the child's stdin as TOML and the pipe
/// is closed, so the worker never re-reads the config file. Stdout and stderr
/// are inherited: worker output goes straight to the operator console.
#[derive(Debug, Clone)]
pub struct SelfExecLauncher {
    exe: PathBuf,
    log_level: Option<LogLevel>,
}

impl SelfExecLauncher {
    pub fn new(exe: impl Into<PathBuf>, log_level: Option<LogLevel>) -> Self {
        Self {
            exe: exe.into(),
            log_level,
        }
    }

    /// Launcher for the binary that is currently running.
    pub fn current(log_level: Option<LogLevel>) -> Result<Self> {
        let exe = std::env::current_exe().context("locating the resticon executable")?;
        Ok(Self::new(exe, log_level))
    }

    /// Arguments passed to the re-executed binary.
    pub fn worker_args(&self, request: &CommandRequest) -> Vec<String> {
        let mut args = Vec::with_capacity(request.args.len() + 5);
        if let Some(level) = self.log_level {
            args.push("--log-level".to_string());
            args.push(level.as_str().to_string());
        }
        args.push("worker".to_string());
        args.push(request.name.as_str().to_string());
        args.push("--".to_string());
        args.extend(request.args.iter().cloned());
        args
    }
}

impl WorkerLauncher for SelfExecLauncher {
    fn launch<'a>(&'a self, request: &'a CommandRequest, config: &'a Config) -> LaunchFuture<'a> {
        Box::pin(async move {
            let payload = to_worker_payload(config)?;
            let args = self.worker_args(request);
            debug!(exe = %self.exe.display(), ?args, "spawning worker process");

            let mut child = Command::new(&self.exe)
                .args(&args)
                .stdin(Stdio::piped())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .process_group(0)
                .spawn()
                .with_context(|| format!("spawning worker for `{}`", request.name))?;

            if let Some(mut stdin) = child.stdin.take() {
                if let Err(e) = stdin.write_all(payload.as_bytes()).await {
                    // A worker without its config is useless.
                    let _ = child.start_kill();
                    return Err(anyhow::Error::new(e).context("sending config to worker").into());
                }
                // Dropping closes the pipe; the worker reads until EOF.
                drop(stdin);
            }

            Ok(child)
        })
    }
}
