#![allow(dead_code)]

use resticon::config::{Config, RawConfig};

/// Builder for `Config` to simplify test setup.
///
/// Starts from a minimal valid config (`/repo` backed up from `/data`).
pub struct ConfigBuilder {
    raw: RawConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawConfig {
                repository: Some("/repo".to_string()),
                target_path: Some("/data".to_string()),
                ..RawConfig::default()
            },
        }
    }

    pub fn repository(mut self, repo: &str) -> Self {
        self.raw.repository = Some(repo.to_string());
        self
    }

    pub fn target_path(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.raw.target_path = Some(path.as_ref().display().to_string());
        self
    }

    pub fn password_file(mut self, path: &str) -> Self {
        self.raw.password_file = Some(path.to_string());
        self
    }

    pub fn inline_password(mut self, secret: &str) -> Self {
        self.raw.password = Some(secret.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.raw.exclude_patterns.push(pattern.to_string());
        self
    }

    pub fn build(self) -> Config {
        Config::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
