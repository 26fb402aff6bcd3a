// src/supervisor/mod.rs

//! Single-slot job supervisor.
//!
//! Owns at most one running worker process (the job handle) and is the only
//! place that creates, polls, kills, or forgets it. Killing a worker kills
//! its whole process group, so nothing the worker started outlives it. All operations take
//! `&mut self`, and the console loop owns the supervisor outright, so
//! `is_busy`, `submit`, and `halt` can never interleave: there is no window
//! in which two submissions both see an empty slot.
//!
//! - [`launcher`] abstracts how a worker process is started.

pub mod launcher;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::Result;
use crate::request::{CommandName, CommandRequest};

pub use launcher::{LaunchFuture, SelfExecLauncher, WorkerLauncher};

/// The supervisor's reference to the running worker.
#[derive(Debug)]
struct JobHandle {
    command: CommandName,
    pid: Option<u32>,
    child: Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started { pid: Option<u32> },
    /// A worker is already running; nothing was started.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltOutcome {
    /// A worker was killed and fully reaped.
    Stopped { command: CommandName },
    NoJob,
}

#[derive(Debug)]
pub struct Supervisor<L: WorkerLauncher> {
    launcher: L,
    job: Option<JobHandle>,
}

impl<L: WorkerLauncher> Supervisor<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            job: None,
        }
    }

    /// Whether a worker is still running.
    ///
    /// A worker that exited on its own is reaped here and the slot freed.
    pub fn is_busy(&mut self) -> bool {
        self.reap_finished();
        self.job.is_some()
    }

    /// Start a worker for `request` unless one is already running.
    ///
    /// Returns as soon as the process is spawned; completion is never awaited.
    /// A launch failure is an error and leaves the slot empty.
    pub async fn submit(&mut self, request: &CommandRequest, config: &Config) -> Result<SubmitOutcome> {
        if self.is_busy() {
            debug!(command = %request.name, "submit rejected; worker slot occupied");
            return Ok(SubmitOutcome::Rejected);
        }

        let child = self.launcher.launch(request, config).await?;
        let pid = child.id();
        info!(command = %request.name, ?pid, args = ?request.args, "worker started");

        self.job = Some(JobHandle {
            command: request.name,
            pid,
            child,
        });
        Ok(SubmitOutcome::Started { pid })
    }

    /// Kill the running worker and wait until it has been reaped.
    ///
    /// The slot is empty when this returns, whatever the kill reported.
    pub async fn halt(&mut self) -> Result<HaltOutcome> {
        if !self.is_busy() {
            return Ok(HaltOutcome::NoJob);
        }
        let Some(mut job) = self.job.take() else {
            return Ok(HaltOutcome::NoJob);
        };

        info!(command = %job.command, pid = ?job.pid, "halting worker");
        kill_process_group(&job);
        if let Err(e) = job.child.kill().await {
            // The kill can fail if the process exited in the meantime; make
            // sure it is reaped either way.
            warn!(pid = ?job.pid, error = %e, "kill failed; waiting for worker instead");
            job.child.wait().await?;
        }
        info!(command = %job.command, pid = ?job.pid, "worker halted and reaped");

        Ok(HaltOutcome::Stopped {
            command: job.command,
        })
    }

    /// Start killing the running worker without waiting for it.
    ///
    /// Only for console exit. Returns the command that was killed, if any.
    pub fn shutdown(&mut self) -> Option<CommandName> {
        self.reap_finished();
        let mut job = self.job.take()?;

        info!(command = %job.command, pid = ?job.pid, "killing worker on shutdown");
        kill_process_group(&job);
        if let Err(e) = job.child.start_kill() {
            warn!(pid = ?job.pid, error = %e, "failed to signal worker on shutdown");
        }
        Some(job.command)
    }

    fn reap_finished(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };

        match job.child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                info!(
                    command = %job.command,
                    pid = ?job.pid,
                    exit_code = ?status.code(),
                    success = status.success(),
                    "worker exited"
                );
                self.job = None;
            }
            Err(e) => {
                // The process can no longer be observed; treat the slot as free.
                warn!(command = %job.command, pid = ?job.pid, error = %e, "failed to poll worker; dropping handle");
                self.job = None;
            }
        }
    }
}

/// SIGKILL every process in the worker's group, engine processes included.
///
/// The worker leads its own group (see [`WorkerLauncher`]) and has not been
/// reaped yet, so its pid still names that group.
fn kill_process_group(job: &JobHandle) {
    let Some(pgid) = job.pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) => debug!(command = %job.command, pgid, "worker process group killed"),
        Err(Errno::ESRCH) => debug!(command = %job.command, pgid, "worker process group already gone"),
        Err(e) => warn!(command = %job.command, pgid, error = %e, "failed to kill worker process group"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use std::process::Stdio;
    use std::time::Duration;
    use tokio::process::Command;

    /// Runs `sh -c <script>` for every request.
    struct Sh(&'static str);

    impl WorkerLauncher for Sh {
        fn launch<'a>(&'a self, _request: &'a CommandRequest, _config: &'a Config) -> LaunchFuture<'a> {
            Box::pin(async move {
                let child = Command::new("sh")
                    .arg("-c")
                    .arg(self.0)
                    .stdin(Stdio::null())
                    .process_group(0)
                    .spawn()?;
                Ok(child)
            })
        }
    }

    fn config() -> Config {
        Config::try_from(RawConfig {
            repository: Some("/repo".into()),
            target_path: Some("/data".into()),
            ..RawConfig::default()
        })
        .unwrap()
    }

    fn ls() -> CommandRequest {
        CommandRequest::new(CommandName::Ls, vec![])
    }

    #[tokio::test]
    async fn second_submit_is_rejected_while_busy() {
        let mut sup = Supervisor::new(Sh("sleep 30"));
        let cfg = config();
        assert!(matches!(sup.submit(&ls(), &cfg).await.unwrap(), SubmitOutcome::Started { .. }));
        assert_eq!(sup.submit(&ls(), &cfg).await.unwrap(), SubmitOutcome::Rejected);
        assert!(matches!(sup.halt().await.unwrap(), HaltOutcome::Stopped { .. }));
    }

    #[tokio::test]
    async fn halt_without_job_is_no_job() {
        let mut sup = Supervisor::new(Sh("sleep 30"));
        assert_eq!(sup.halt().await.unwrap(), HaltOutcome::NoJob);
        assert!(!sup.is_busy());
    }

    #[tokio::test]
    async fn halt_clears_slot_and_allows_new_submit() {
        let mut sup = Supervisor::new(Sh("sleep 30"));
        let cfg = config();
        sup.submit(&ls(), &cfg).await.unwrap();
        assert_eq!(
            sup.halt().await.unwrap(),
            HaltOutcome::Stopped {
                command: CommandName::Ls
            }
        );
        assert!(!sup.is_busy());
        assert!(matches!(sup.submit(&ls(), &cfg).await.unwrap(), SubmitOutcome::Started { .. }));
        assert_eq!(sup.shutdown(), Some(CommandName::Ls));
        assert!(!sup.is_busy());
    }

    #[tokio::test]
    async fn finished_worker_frees_the_slot() {
        let mut sup = Supervisor::new(Sh("true"));
        sup.submit(&ls(), &config()).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while sup.is_busy() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("worker never finished");

        assert_eq!(sup.halt().await.unwrap(), HaltOutcome::NoJob);
    }

    #[tokio::test]
    async fn shutdown_without_job_is_noop() {
        let mut sup = Supervisor::new(Sh("sleep 30"));
        assert_eq!(sup.shutdown(), None);
    }
}
