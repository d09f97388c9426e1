use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

use repo_medal::config::{DEFAULT_COMPLETION_BASE_URL, DEFAULT_GITHUB_API};
use repo_medal::load_config::{load_config, load_config_from_env, read_config_file, API_KEY_VAR};

/// A static config file plus the env secret produces a complete AppConfig.
#[test]
#[serial]
fn test_load_config_success_injects_env_key() {
    let config_yaml = r#"
github:
  timeout_secs: 5
completion:
  base_url: "https://api.openai.com/v1"
  model: gpt-4o-mini
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::set_var(API_KEY_VAR, "top-secret-test-key");

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.completion.base_url, "https://api.openai.com/v1");
    assert_eq!(config.completion.model, "gpt-4o-mini");
    assert_eq!(config.completion.api_key, "top-secret-test-key");
    assert_eq!(config.github.timeout_secs, 5);
    assert_eq!(config.github.api_base, DEFAULT_GITHUB_API);
}

/// The API key in a file is ignored; only the environment provides it.
#[test]
#[serial]
fn test_api_key_is_never_read_from_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "completion:\n  api_key: from-file\n").unwrap();
    env::set_var(API_KEY_VAR, "from-env");

    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config.completion.api_key, "from-env");
}

#[test]
#[serial]
fn test_load_config_errors_on_missing_env() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "completion:\n  model: gpt-4o-mini\n").unwrap();
    env::remove_var(API_KEY_VAR);

    let msg = load_config(config_file.path()).unwrap_err().to_string();
    assert!(msg.contains(API_KEY_VAR), "Must error for missing env var, got: {msg}");

    let msg = load_config_from_env().unwrap_err().to_string();
    assert!(msg.contains(API_KEY_VAR), "Must error for missing env var, got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();
    env::set_var(API_KEY_VAR, "present");

    let msg = load_config(config_file.path()).unwrap_err().to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_defaults_from_env_and_keyless_file_read() {
    env::set_var(API_KEY_VAR, "k");
    let config = load_config_from_env().expect("defaults should load");
    assert_eq!(config.completion.base_url, DEFAULT_COMPLETION_BASE_URL);

    env::remove_var(API_KEY_VAR);
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "github:\n  api_base: http://localhost:9999\n").unwrap();
    let config = read_config_file(config_file.path()).expect("no secret needed");
    assert_eq!(config.github.api_base, "http://localhost:9999");
    assert!(config.completion.api_key.is_empty());
}
