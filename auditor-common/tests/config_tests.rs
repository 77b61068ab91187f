//! Tests for configuration loading and resolution priority
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests
//! that touch AUDITOR_ROOT_FOLDER or AUDITOR_AI_API_KEY are marked #[serial].

use auditor_common::config::{
    load_toml_config, resolve_ai_api_key, resolve_root_folder, write_toml_config, AiConfig,
    LoggingConfig, TomlConfig, AI_API_KEY_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn config_with_root(root: &str) -> TomlConfig {
    TomlConfig {
        root_folder: Some(PathBuf::from(root)),
        ..Default::default()
    }
}

#[test]
fn test_missing_toml_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_toml_config(&temp_dir.path().join("does-not-exist.toml"));

    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.audit.top_issues, 25);
}

#[test]
fn test_malformed_toml_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "this is [not valid toml").unwrap();

    let config = load_toml_config(&path);
    assert!(config.root_folder.is_none());
    assert_eq!(config.audit.fallback_max, 15);
}

#[test]
fn test_written_config_is_read_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.toml");

    let mut config = config_with_root("/var/audits");
    config.logging = LoggingConfig {
        level: "debug".to_string(),
        file: None,
    };
    config.audit.top_issues = 40;

    write_toml_config(&config, &path).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = load_toml_config(&path);
    assert_eq!(loaded.root_folder, Some(PathBuf::from("/var/audits")));
    assert_eq!(loaded.logging.level, "debug");
    assert_eq!(loaded.audit.top_issues, 40);
}

#[test]
#[serial]
fn test_root_folder_cli_arg_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let config = config_with_root("/tmp/from-toml");

    let resolved = resolve_root_folder(Some(Path::new("/tmp/from-cli")), &config);
    assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let config = config_with_root("/tmp/from-toml");

    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/tmp/from-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = config_with_root("/tmp/from-toml");
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/tmp/from-toml"));

    let resolved = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(resolved, auditor_common::config::default_root_folder());
}

#[test]
#[serial]
fn test_ai_key_priority() {
    env::remove_var(AI_API_KEY_ENV);

    let mut config = TomlConfig::default();
    assert_eq!(resolve_ai_api_key(&config), None);

    config.ai = AiConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };
    assert_eq!(resolve_ai_api_key(&config), Some("toml-key".to_string()));

    env::set_var(AI_API_KEY_ENV, "env-key");
    assert_eq!(resolve_ai_api_key(&config), Some("env-key".to_string()));

    // Whitespace-only keys are treated as absent
    env::set_var(AI_API_KEY_ENV, "   ");
    assert_eq!(resolve_ai_api_key(&config), Some("toml-key".to_string()));

    env::remove_var(AI_API_KEY_ENV);
}
