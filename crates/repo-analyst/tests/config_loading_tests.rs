//! Loading configuration files from disk.

use std::path::PathBuf;

use repo_analyst::config::{load_config, load_config_from_str};
use repo_analyst::{ConfigError, FileFailurePolicy, PipelineConfig};

fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("analyst.json");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_config_file_with_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "version": "1.0",
            "worker_count": 3,
            "workspace_root": "/var/tmp/analyst",
            "selection": { "max_files": 2, "extensions": [".rs"] },
            "summarizer": { "api_key_env_var": "MY_KEY", "max_content_chars": 500 },
            "fetch": { "git_binary": "/usr/bin/git", "timeout_secs": null },
            "pipeline": { "on_file_error": "inline", "store_retry_attempts": 5 }
        }"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(config.worker_count, 3);
    assert_eq!(config.selection.max_files, 2);
    assert_eq!(config.summarizer.api_key_env_var, "MY_KEY");
    assert_eq!(config.fetch.git_binary, "/usr/bin/git");
    assert_eq!(config.fetch.timeout_secs, None);

    let pipeline = PipelineConfig::from_config(&config);
    assert_eq!(pipeline.workspace_root, PathBuf::from("/var/tmp/analyst"));
    assert_eq!(pipeline.on_file_error, FileFailurePolicy::Inline);
    assert_eq!(pipeline.store_retry_attempts, 5);
}

#[test]
fn test_missing_version_is_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, r#"{ "worker_count": 2 }"#);
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::SchemaValidation { .. }));
}

#[test]
fn test_zero_workers_rejected() {
    let err = load_config_from_str(r#"{ "version": "1.0", "worker_count": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::SchemaValidation { .. }));
}

#[test]
fn test_unknown_policy_rejected() {
    let err = load_config_from_str(
        r#"{ "version": "1.0", "pipeline": { "on_file_error": "skip" } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::SchemaValidation { .. }));
}

#[test]
fn test_nonexistent_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}
