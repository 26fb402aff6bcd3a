// src/engine/restic.rs

//! `restic` command-line engine.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::ResticonError;

use super::{BackupArgs, BackupEngine, EngineFuture};

/// Runs `restic --repo <repo> [--password-file <file>] <op> ...` and returns
/// its stdout.
///
/// A non-zero exit is turned into [`ResticonError::Engine`] carrying the
/// trimmed stderr (or the exit status if stderr was empty).
#[derive(Debug, Clone)]
pub struct ResticCli {
    binary: String,
    repository: String,
    password_file: Option<PathBuf>,
}

impl ResticCli {
    pub fn new(
        binary: impl Into<String>,
        repository: impl Into<String>,
        password_file: Option<PathBuf>,
    ) -> Self {
        Self {
            binary: binary.into(),
            repository: repository.into(),
            password_file,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.restic_binary(),
            config.repository(),
            config.password_file().map(|p| p.to_path_buf()),
        )
    }

    /// Full argument vector for an operation, global flags first.
    pub fn command_args(&self, op: &str, op_args: Vec<String>) -> Vec<String> {
        let mut args = vec!["--repo".to_string(), self.repository.clone()];
        if let Some(file) = &self.password_file {
            args.push("--password-file".to_string());
            args.push(file.display().to_string());
        }
        args.push(op.to_string());
        args.extend(op_args);
        args
    }

    fn run(&self, op: &'static str, op_args: Vec<String>) -> EngineFuture<'_> {
        let args = self.command_args(op, op_args);
        Box::pin(async move {
            info!(binary = %self.binary, op, "invoking backup engine");
            debug!(?args, "engine arguments");

            let output = Command::new(&self.binary)
                .args(&args)
                .stdin(Stdio::null())
                .output()
                .await
                .with_context(|| format!("running `{} {op}`", self.binary))?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if output.status.success() {
                debug!(op, bytes = stdout.len(), "engine finished");
                return Ok(stdout);
            }

            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("`{} {op}` exited with {}", self.binary, output.status)
            } else {
                stderr
            };
            Err(ResticonError::Engine(message))
        })
    }
}

/// `backup` operation arguments: paths, then one `--tag` / `--exclude` per
/// value.
fn backup_op_args(args: BackupArgs) -> Vec<String> {
    let mut out: Vec<String> = args
        .paths
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    for tag in args.tags {
        out.push("--tag".to_string());
        out.push(tag);
    }
    for pattern in args.exclude_patterns {
        out.push("--exclude".to_string());
        out.push(pattern);
    }
    out
}

impl BackupEngine for ResticCli {
    fn backup(&self, args: BackupArgs) -> EngineFuture<'_> {
        self.run("backup", backup_op_args(args))
    }

    fn check(&self) -> EngineFuture<'_> {
        self.run("check", Vec::new())
    }

    fn snapshots(&self) -> EngineFuture<'_> {
        self.run("snapshots", Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_precede_operation() {
        let cli = ResticCli::new("restic", "/srv/repo", Some(PathBuf::from("/run/pw")));
        assert_eq!(
            cli.command_args("check", Vec::new()),
            ["--repo", "/srv/repo", "--password-file", "/run/pw", "check"]
        );
    }

    #[test]
    fn password_file_flag_omitted_when_unset() {
        let cli = ResticCli::new("restic", "/srv/repo", None);
        assert_eq!(cli.command_args("snapshots", Vec::new()), ["--repo", "/srv/repo", "snapshots"]);
    }

    #[test]
    fn backup_args_expand_tags_and_excludes() {
        let args = backup_op_args(BackupArgs {
            paths: vec![PathBuf::from("/data")],
            tags: vec!["nightly".into(), "20260101000000".into()],
            exclude_patterns: vec!["*.tmp".into()],
        });
        assert_eq!(
            args,
            ["/data", "--tag", "nightly", "--tag", "20260101000000", "--exclude", "*.tmp"]
        );
    }

    #[tokio::test]
    async fn engine_stdout_is_returned_on_success() {
        // `echo` stands in for restic and simply prints its arguments.
        let cli = ResticCli::new("echo", "/srv/repo", None);
        let out = cli.snapshots().await.unwrap();
        assert_eq!(out.trim(), "--repo /srv/repo snapshots");
    }

    #[tokio::test]
    async fn non_zero_exit_becomes_engine_error() {
        let cli = ResticCli::new("false", "/srv/repo", None);
        let err = cli.check().await.unwrap_err();
        assert!(matches!(err, ResticonError::Engine(msg) if msg.contains("exited with")));
    }

    #[tokio::test]
    async fn missing_binary_is_an_error_not_a_panic() {
        let cli = ResticCli::new("/definitely/not/restic", "/srv/repo", None);
        assert!(cli.check().await.is_err());
    }
}
