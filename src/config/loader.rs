// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::{Config, RawConfig};
use crate::errors::{Result, ResticonError};

/// Where the console looks for its configuration when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/home/container/config.yml";

/// On-disk syntax of a config file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.yml` / `.yaml` are YAML; everything else is treated as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yml") | Some("yaml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Read and deserialize a config file without semantic validation.
///
/// A missing file maps to [`ResticonError::ConfigMissing`], a syntax or type
/// error to [`ResticonError::ConfigMalformed`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ResticonError::ConfigMissing(path.to_path_buf()),
        _ => ResticonError::IoError(e),
    })?;

    parse_str(&contents, ConfigFormat::from_path(path)).map_err(|message| {
        ResticonError::ConfigMalformed {
            path: path.to_path_buf(),
            message,
        }
    })
}

/// Load a config file and validate it.
///
/// This is the only way the console obtains a [`Config`]; it runs exactly
/// once at startup.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let raw = load_from_path(&path)?;
    Config::try_from(raw)
}

fn parse_str(contents: &str, format: ConfigFormat) -> std::result::Result<RawConfig, String> {
    match format {
        // An empty YAML document deserializes to unit, not a map.
        ConfigFormat::Yaml if contents.trim().is_empty() => Ok(RawConfig::default()),
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
    }
}

/// Serialize an already validated config for a worker process.
pub fn to_worker_payload(config: &Config) -> Result<String> {
    let payload = toml::to_string(config).context("serializing config for worker")?;
    Ok(payload)
}

/// Inverse of [`to_worker_payload`], used on the worker side.
pub fn from_worker_payload(payload: &str) -> Result<Config> {
    let config = toml::from_str(payload).context("decoding config payload from console")?;
    Ok(config)
}

/// Resolve the config path from an optional CLI value.
pub fn resolve_config_path(cli_value: Option<&str>) -> PathBuf {
    cli_value
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{body}").unwrap();
        file
    }

    #[test]
    fn format_is_picked_by_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/config.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.YAML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Toml);
    }

    #[test]
    fn yaml_config_loads() {
        let file = write_temp(
            ".yml",
            "repository: /srv/repo\ntarget_path: /data\npassword_file: /run/pw\nexclude_patterns:\n  - '*.tmp'\n",
        );
        let cfg = load_and_validate(file.path()).unwrap();
        assert_eq!(cfg.repository(), "/srv/repo");
        assert_eq!(cfg.target_path(), Path::new("/data"));
        assert_eq!(cfg.exclude_patterns(), ["*.tmp".to_string()]);
    }

    #[test]
    fn toml_config_loads() {
        let file = write_temp(
            ".toml",
            "repository = \"s3:bucket/repo\"\ntarget_path = \"/data\"\nrestic_binary = \"/usr/local/bin/restic\"\n",
        );
        let cfg = load_and_validate(file.path()).unwrap();
        assert_eq!(cfg.repository(), "s3:bucket/repo");
        assert_eq!(cfg.restic_binary(), "/usr/local/bin/restic");
    }

    #[test]
    fn missing_file_is_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_and_validate(dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ResticonError::ConfigMissing(_)));
    }

    #[test]
    fn broken_yaml_is_config_malformed() {
        let file = write_temp(".yaml", "repository: [unclosed\n");
        let err = load_and_validate(file.path()).unwrap_err();
        assert!(matches!(err, ResticonError::ConfigMalformed { .. }));
    }

    #[test]
    fn empty_yaml_reports_missing_keys() {
        let file = write_temp(".yml", "");
        let err = load_and_validate(file.path()).unwrap_err();
        assert!(matches!(err, ResticonError::ConfigInvalid(_)));
    }

    #[test]
    fn worker_payload_preserves_config_without_secret() {
        let file = write_temp(
            ".yml",
            "repository: /repo\ntarget_path: /data\npassword: hunter2\nexclude_patterns: [a, b]\n",
        );
        let cfg = load_and_validate(file.path()).unwrap();
        let payload = to_worker_payload(&cfg).unwrap();
        assert!(!payload.contains("hunter2"));
        assert_eq!(from_worker_payload(&payload).unwrap(), cfg);
    }

    #[test]
    fn password_key_without_value_still_counts_as_inline() {
        for body in ["password:\n", "password: ~\n", "password: 1234\n"] {
            let file = write_temp(".yml", &format!("repository: /repo\ntarget_path: /data\n{body}"));
            let cfg = load_and_validate(file.path()).unwrap();
            assert_eq!(cfg.credential(), Credential::InlineOnly, "config body: {body:?}");
        }
    }

    #[test]
    fn default_path_used_without_flag() {
        assert_eq!(resolve_config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(resolve_config_path(Some("x.toml")), PathBuf::from("x.toml"));
    }
}
