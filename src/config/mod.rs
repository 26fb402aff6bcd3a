// src/config/mod.rs

//! Configuration loading and validation for resticon.
//!
//! Responsibilities:
//! - Define the serde-backed data model (`model.rs`).
//! - Load a config file from disk, TOML or YAML (`loader.rs`).
//! - Validate required fields and resolve the credential (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, ConfigFormat, DEFAULT_CONFIG_PATH};
pub use model::{Config, Credential, RawConfig};
