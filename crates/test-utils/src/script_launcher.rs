use std::fs;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use resticon::config::Config;
use resticon::request::{CommandName, CommandRequest};
use resticon::supervisor::{LaunchFuture, WorkerLauncher};
use tokio::process::Command;

/// Stand-in for the self-exec launcher: every request becomes `sh -c <script>`.
///
/// Clones share their launch log, so a test can keep one clone while the
/// supervisor owns the other.
#[derive(Debug, Clone)]
pub struct ScriptLauncher {
    script: String,
    launched: Arc<Mutex<Vec<(CommandName, u32)>>>,
}

impl ScriptLauncher {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A worker that outlives any test unless it is killed.
    pub fn long_running() -> Self {
        Self::new("exec sleep 30")
    }

    /// Like [`ScriptLauncher::long_running`], but the worker waits on a child
    /// of its own, the way a real worker waits on the engine.
    pub fn with_child() -> Self {
        Self::new("sleep 30 & wait")
    }

    pub fn launched(&self) -> Vec<(CommandName, u32)> {
        self.launched.lock().unwrap().clone()
    }

    /// Launched pids whose process still exists and is not a zombie.
    pub fn live_pids(&self) -> Vec<u32> {
        self.launched()
            .into_iter()
            .map(|(_, pid)| pid)
            .filter(|pid| process_is_running(*pid))
            .collect()
    }

    /// Running processes left behind by workers that are gone: members of a
    /// launched worker's process group whose leader is no longer running.
    pub fn stray_processes(&self) -> Vec<u32> {
        self.launched()
            .into_iter()
            .map(|(_, pid)| pid)
            .filter(|pid| !process_is_running(*pid))
            .flat_map(group_members)
            .collect()
    }
}

impl WorkerLauncher for ScriptLauncher {
    fn launch<'a>(&'a self, request: &'a CommandRequest, _config: &'a Config) -> LaunchFuture<'a> {
        Box::pin(async move {
            let child = Command::new("sh")
                .arg("-c")
                .arg(&self.script)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .process_group(0)
                .spawn()?;
            if let Some(pid) = child.id() {
                self.launched.lock().unwrap().push((request.name, pid));
            }
            Ok(child)
        })
    }
}

/// State and process group of `pid` from `/proc/<pid>/stat` (Linux only).
fn stat(pid: u32) -> Option<(char, u32)> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    // Fields after the parenthesised command name: state, ppid, pgrp, ...
    let (_, rest) = stat.rsplit_once(')')?;
    let mut fields = rest.split_whitespace();
    let state = fields.next()?.chars().next()?;
    let pgrp = fields.nth(1)?.parse().ok()?;
    Some((state, pgrp))
}

fn is_running_state(state: char) -> bool {
    state != 'Z' && state != 'X'
}

/// Whether `pid` exists and is not a zombie.
pub fn process_is_running(pid: u32) -> bool {
    stat(pid).is_some_and(|(state, _)| is_running_state(state))
}

/// Running processes whose process group is `pgid`.
pub fn group_members(pgid: u32) -> Vec<u32> {
    let Ok(entries) = fs::read_dir("/proc") else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| stat(*pid).is_some_and(|(state, pgrp)| pgrp == pgid && is_running_state(state)))
        .collect()
}
