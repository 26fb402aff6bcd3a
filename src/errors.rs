// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResticonError {
    #[error("config file not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("failed to parse config file {}: {message}", .path.display())]
    ConfigMalformed { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("backup engine error: {0}")]
    Engine(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ResticonError>;
