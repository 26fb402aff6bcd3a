// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Configuration exactly as read from disk.
///
/// ```yaml
/// repository: /srv/restic-repo
/// target_path: /home/container/data
/// password_file: /home/container/.restic-pass
/// exclude_patterns:
///   - "*.tmp"
///   - cache/
/// ```
///
/// The same keys work in a TOML file. `repository` and `target_path` are
/// optional here so that a missing key is reported by validation with a
/// readable message instead of a serde error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub target_path: Option<String>,

    /// Path to a file holding the repository password.
    #[serde(default)]
    pub password_file: Option<String>,

    /// Inline password. Never forwarded to the engine; only the presence of
    /// the key matters (see [`Credential::InlineOnly`]), so `password:` with
    /// no value still counts.
    #[serde(default, deserialize_with = "key_present")]
    pub password: Option<String>,

    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Engine executable, `restic` on `$PATH` when unset.
    #[serde(default)]
    pub restic_binary: Option<String>,
}

/// `Some` for any value under the key, including null. Non-string values
/// become an empty string.
fn key_present<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnyValue {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(Some(match AnyValue::deserialize(deserializer)? {
        AnyValue::Text(text) => text,
        AnyValue::Other(_) => String::new(),
    }))
}

/// Validated, immutable configuration shared by the console and every worker.
///
/// Built only through `TryFrom<RawConfig>`. It is also the payload handed to
/// worker processes, which is why it is `Serialize`: the literal password
/// has already been dropped at that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    repository: String,
    target_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_file: Option<PathBuf>,
    #[serde(default)]
    inline_password: bool,
    #[serde(default)]
    exclude_patterns: Vec<String>,
    restic_binary: String,
}

/// How the engine is expected to authenticate against the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    /// A password file reference; the only form the engine accepts.
    File(&'a Path),
    /// An inline password is configured but no password file.
    InlineOnly,
    /// Nothing configured; the engine falls back to its own environment.
    Unset,
}

pub const DEFAULT_RESTIC_BINARY: &str = "restic";

impl Config {
    pub(crate) fn new_unchecked(
        repository: String,
        target_path: PathBuf,
        password_file: Option<PathBuf>,
        inline_password: bool,
        exclude_patterns: Vec<String>,
        restic_binary: String,
    ) -> Self {
        Self {
            repository,
            target_path,
            password_file,
            inline_password,
            exclude_patterns,
            restic_binary,
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn password_file(&self) -> Option<&Path> {
        self.password_file.as_deref()
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn restic_binary(&self) -> &str {
        &self.restic_binary
    }

    pub fn credential(&self) -> Credential<'_> {
        match (&self.password_file, self.inline_password) {
            (Some(file), _) => Credential::File(file),
            (None, true) => Credential::InlineOnly,
            (None, false) => Credential::Unset,
        }
    }
}
