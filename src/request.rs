// src/request.rs

//! Operator input: command names and line tokenizing.

use std::fmt;
use std::str::FromStr;

/// Every name the console understands.
///
/// `Halt` and `Stop` are control commands handled by the console itself and
/// never reach a worker; the rest are worker operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Backup,
    Check,
    Snapshots,
    Ls,
    Halt,
    Stop,
}

impl CommandName {
    /// Names that are dispatched to a worker process.
    pub const WORKER_COMMANDS: [CommandName; 4] = [
        CommandName::Backup,
        CommandName::Check,
        CommandName::Snapshots,
        CommandName::Ls,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandName::Backup => "backup",
            CommandName::Check => "check",
            CommandName::Snapshots => "snapshots",
            CommandName::Ls => "ls",
            CommandName::Halt => "halt",
            CommandName::Stop => "stop",
        }
    }

    pub fn is_worker_command(self) -> bool {
        !matches!(self, CommandName::Halt | CommandName::Stop)
    }

    /// Whether this command talks to the backup engine.
    pub fn uses_engine(self) -> bool {
        matches!(
            self,
            CommandName::Backup | CommandName::Check | CommandName::Snapshots
        )
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backup" => Ok(CommandName::Backup),
            "check" => Ok(CommandName::Check),
            "snapshots" => Ok(CommandName::Snapshots),
            "ls" => Ok(CommandName::Ls),
            "halt" => Ok(CommandName::Halt),
            "stop" => Ok(CommandName::Stop),
            other => Err(other.to_string()),
        }
    }
}

/// One parsed operator command with its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub name: CommandName,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: CommandName, args: Vec<String>) -> Self {
        Self { name, args }
    }
}

/// Result of tokenizing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Blank or whitespace-only line.
    Empty,
    Request(CommandRequest),
    /// First token did not name a known command (already lower-cased).
    Unknown(String),
}

/// Split a line on whitespace; the first token, lower-cased, is the command.
///
/// There is no quoting and no flag parsing: `ls "my dir"` yields the two
/// arguments `"my` and `dir"`.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return ParsedLine::Empty;
    };
    let args: Vec<String> = tokens.map(str::to_string).collect();

    match first.parse::<CommandName>() {
        Ok(name) => ParsedLine::Request(CommandRequest::new(name, args)),
        Err(unknown) => ParsedLine::Unknown(unknown),
    }
}
