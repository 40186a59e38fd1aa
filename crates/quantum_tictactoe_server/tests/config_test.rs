//! Tests for session configuration loading.

use quantum_tictactoe::SeedStrategy;
use quantum_tictactoe_server::{ConfigError, GameConfig, ServerError};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = GameConfig::default();
    assert_eq!(config.measurement_url(), &None);
    assert_eq!(config.measurement_timeout(), Duration::from_secs(5));
    assert_eq!(config.engine_settings().seed(), &SeedStrategy::Clock);
    assert_eq!(config.engine_settings().fallback_seed(), &None);
}

#[test]
fn test_from_file() {
    let file = write_config(
        r#"
measurement_url = "http://127.0.0.1:8080"
measurement_timeout_ms = 250
seed = 10
fallback_seed = 3
"#,
    );
    let config = GameConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config.measurement_url().as_deref(),
        Some("http://127.0.0.1:8080")
    );

    let settings = config.engine_settings();
    assert_eq!(settings.seed(), &SeedStrategy::Fixed(10));
    assert_eq!(settings.fallback_seed(), &Some(3));
    assert_eq!(settings.measurement_timeout(), &Duration::from_millis(250));
}

#[test]
fn test_partial_file_uses_defaults() {
    let file = write_config("seed = 5\n");
    let config = GameConfig::from_file(file.path()).unwrap();
    assert_eq!(config.seed(), &Some(5));
    assert_eq!(config.measurement_timeout_ms(), &5000);
    assert_eq!(config.measurement_url(), &None);
}

#[test]
fn test_parse_error() {
    let file = write_config("measurement_timeout_ms = \"soon\"\n");
    let err = GameConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.starts_with("Failed to parse config"));
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = GameConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.measurement_timeout_ms(), &5000);
    assert!(GameConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_overrides() {
    let config = GameConfig::default()
        .with_measurement_url(Some("http://backend".to_string()))
        .with_seed(Some(77))
        .with_seed(None);
    assert_eq!(config.measurement_url().as_deref(), Some("http://backend"));
    assert_eq!(config.seed(), &Some(77));
}

#[test]
fn test_config_error_converts_to_server_error() {
    let err: ServerError = ConfigError::new("bad config".to_string()).into();
    assert_eq!(err.message, "bad config");
}
