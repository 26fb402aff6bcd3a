// src/console.rs

//! Operator console: the read-eval loop in front of the supervisor.
//!
//! One line in, at most one action out. Routing order matters:
//! `halt` and `stop` are always honoured, then a busy supervisor rejects
//! anything else, and only then are worker commands submitted or unknown
//! names reported.

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::Result;
use crate::request::{parse_line, CommandName, CommandRequest, ParsedLine};
use crate::supervisor::{HaltOutcome, SubmitOutcome, Supervisor, WorkerLauncher};

/// Why the console loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// Operator typed `stop`; any worker was killed.
    Stopped,
    /// Input stream closed; a running worker is left alone.
    EndOfInput,
    /// Interrupt signal; any worker was killed.
    Interrupted,
}

pub const BUSY_WARNING: &str =
    "[!] warning: the previous task is still running. Wait for it to finish or type 'halt' to abort it.";
pub const NO_TASK_NOTICE: &str = "[?] no task is currently running.";
pub const FAREWELL: &str = "resticon exited.";

pub struct Console<L: WorkerLauncher> {
    supervisor: Supervisor<L>,
    config: Config,
}

impl<L: WorkerLauncher> Console<L> {
    pub fn new(supervisor: Supervisor<L>, config: Config) -> Self {
        Self { supervisor, config }
    }

    pub fn supervisor(&mut self) -> &mut Supervisor<L> {
        &mut self.supervisor
    }

    /// Banner printed once before the first command is read.
    pub fn print_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "=== resticon console ===")?;
        writeln!(out, "repository: {}", self.config.repository())?;
        writeln!(out, "target directory: {}", self.config.target_path().display())?;
        writeln!(out, "commands: backup [tags...], check, snapshots, ls [path], halt, stop")?;
        writeln!(out, "----------------------------")?;
        out.flush()?;
        Ok(())
    }

    /// Read and handle lines until `stop`, end of input, or `interrupt`
    /// resolves.
    pub async fn run<R, W, I>(&mut self, input: R, out: &mut W, interrupt: I) -> Result<ConsoleExit>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        I: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(interrupt);

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = &mut interrupt => {
                    info!("interrupt received; shutting down console");
                    self.supervisor.shutdown();
                    writeln!(out)?;
                    writeln!(out, "{FAREWELL}")?;
                    out.flush()?;
                    return Ok(ConsoleExit::Interrupted);
                }
            };

            let Some(line) = line else {
                info!("input closed; leaving console");
                return Ok(ConsoleExit::EndOfInput);
            };

            if let Some(exit) = self.handle_line(&line, out).await? {
                return Ok(exit);
            }
        }
    }

    /// Handle one input line. `Some` means the loop must end.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Option<ConsoleExit>> {
        let parsed = parse_line(line);
        debug!(?parsed, "console input");

        match parsed {
            ParsedLine::Empty => return Ok(None),
            ParsedLine::Request(CommandRequest {
                name: CommandName::Halt,
                ..
            }) => self.halt(out).await?,
            ParsedLine::Request(CommandRequest {
                name: CommandName::Stop,
                ..
            }) => {
                self.supervisor.shutdown();
                writeln!(out, "{FAREWELL}")?;
                out.flush()?;
                return Ok(Some(ConsoleExit::Stopped));
            }
            routed => {
                if self.supervisor.is_busy() {
                    writeln!(out, "{BUSY_WARNING}")?;
                } else {
                    match routed {
                        ParsedLine::Request(request) => self.submit(&request, out).await?,
                        ParsedLine::Unknown(name) => writeln!(out, "[?] unknown command: {name}")?,
                        ParsedLine::Empty => {}
                    }
                }
            }
        }

        out.flush()?;
        Ok(None)
    }

    async fn halt<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.supervisor.is_busy() {
            writeln!(out, "[!] halt received, aborting the current operation...")?;
            out.flush()?;
        }
        match self.supervisor.halt().await {
            Ok(HaltOutcome::Stopped { command }) => {
                writeln!(out, "[-] `{command}` was forcibly stopped.")?;
            }
            Ok(HaltOutcome::NoJob) => writeln!(out, "{NO_TASK_NOTICE}")?,
            Err(e) => {
                warn!(error = %e, "halt did not complete cleanly");
                writeln!(out, "[!] halt failed: {e}")?;
            }
        }
        Ok(())
    }

    async fn submit<W: Write>(&mut self, request: &CommandRequest, out: &mut W) -> Result<()> {
        match self.supervisor.submit(request, &self.config).await {
            Ok(SubmitOutcome::Started { pid }) => {
                debug!(command = %request.name, ?pid, "request dispatched");
            }
            Ok(SubmitOutcome::Rejected) => writeln!(out, "{BUSY_WARNING}")?,
            Err(e) => {
                warn!(command = %request.name, error = %e, "failed to start worker");
                writeln!(out, "[!] could not start `{}`: {e}", request.name)?;
            }
        }
        Ok(())
    }
}
