// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{Config, RawConfig, DEFAULT_RESTIC_BINARY};
use crate::errors::{Result, ResticonError};

impl TryFrom<RawConfig> for Config {
    type Error = crate::errors::ResticonError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        let repository = required(raw.repository, "repository")?;
        let target_path = required(raw.target_path, "target_path")?;
        let password_file = non_empty(raw.password_file).map(PathBuf::from);
        let inline_password = raw.password.is_some();
        let restic_binary =
            non_empty(raw.restic_binary).unwrap_or_else(|| DEFAULT_RESTIC_BINARY.to_string());

        let exclude_patterns = raw
            .exclude_patterns
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();

        Ok(Config::new_unchecked(
            repository,
            PathBuf::from(target_path),
            password_file,
            inline_password,
            exclude_patterns,
            restic_binary,
        ))
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| {
        ResticonError::ConfigInvalid(format!("`{key}` is required and must not be empty"))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
