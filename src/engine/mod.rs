// src/engine/mod.rs

//! Boundary to the external backup engine.
//!
//! Workers talk to a [`BackupEngine`] instead of spawning `restic` directly,
//! so tests can swap in a recording fake. The engine is opaque: it gets the
//! inputs and hands back text (or error text), which the worker prints as-is.
//!
//! - [`restic`] provides [`ResticCli`], the production implementation that
//!   shells out to the `restic` binary.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;

pub mod restic;

pub use restic::ResticCli;

/// Future returned by every engine operation.
pub type EngineFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Arguments for a single backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArgs {
    pub paths: Vec<PathBuf>,
    pub tags: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

/// The three engine operations a worker may invoke.
///
/// Repository location and password file are engine-wide settings fixed when
/// the implementation is constructed, before any operation is called.
pub trait BackupEngine: Send + Sync {
    fn backup(&self, args: BackupArgs) -> EngineFuture<'_>;

    fn check(&self) -> EngineFuture<'_>;

    fn snapshots(&self) -> EngineFuture<'_>;
}
