//! Tests for tracing initialisation
//!
//! The global subscriber can be installed once per process, so the whole
//! sequence lives in a single test.

use auditor_common::config::LoggingConfig;
use auditor_common::logging::init_tracing;
use auditor_common::Error;
use tempfile::TempDir;

#[test]
fn test_init_tracing_installs_once() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("logs").join("auditor.log");
    let config = LoggingConfig {
        level: "debug".to_string(),
        file: Some(log_file.clone()),
    };

    init_tracing(&config).expect("first initialisation should succeed");
    assert!(log_file.exists(), "log file and parent directory are created");

    let second = init_tracing(&LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}
