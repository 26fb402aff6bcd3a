// tests/config_errors.rs

use std::io::Write;
use tempfile::Builder;
use resticon::config::{load_and_validate, Credential};
use resticon::errors::ResticonError;

fn config_file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{body}").unwrap();
    file
}

#[test]
fn test_missing_target_path_is_structured_error() {
    let file = config_file(".yml", "repository: /srv/repo\n");

    match load_and_validate(file.path()) {
        Err(ResticonError::ConfigInvalid(msg)) => assert!(msg.contains("target_path")),
        Err(e) => panic!("Expected ConfigInvalid, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_wrong_type_is_malformed() {
    let file = config_file(
        ".toml",
        r#"
repository = "/srv/repo"
target_path = "/data"
exclude_patterns = "*.tmp"
"#,
    );

    match load_and_validate(file.path()) {
        Err(ResticonError::ConfigMalformed { path, message }) => {
            assert_eq!(path, file.path());
            assert!(message.contains("exclude_patterns"), "message: {message}");
        }
        Err(e) => panic!("Expected ConfigMalformed, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_keys_are_ignored() {
    let file = config_file(
        ".yaml",
        "repository: /srv/repo\ntarget_path: /data\nretention: 7d\n",
    );
    let cfg = load_and_validate(file.path()).expect("config should load");
    assert_eq!(cfg.credential(), Credential::Unset);
}

#[test]
fn test_missing_file_message_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");
    let err = load_and_validate(&path).unwrap_err();
    assert!(err.to_string().contains(&path.display().to_string()));
}
