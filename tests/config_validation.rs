//! Integration tests for configuration validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use quicwire::config::{LoggingConfig, QuicConfig, ReaderConfig};
use std::time::Duration;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = QuicConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_default_yield_budget() {
    let config = ReaderConfig::default();
    assert_eq!(config.yield_after_packets, 32);
    assert_eq!(config.yield_after_duration, Duration::from_millis(2));
}

#[test]
fn test_zero_yield_packets() {
    let mut config = QuicConfig::default();
    config.reader.yield_after_packets = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Yield packet budget must be greater than 0")));
}

#[test]
fn test_excessive_yield_packets() {
    let mut config = QuicConfig::default();
    config.reader.yield_after_packets = 2_000_000;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Yield packet budget too large")));
}

#[test]
fn test_zero_yield_duration() {
    let mut config = QuicConfig::default();
    config.reader.yield_after_duration = Duration::ZERO;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Yield duration must be greater than 0")));
}

#[test]
fn test_empty_app_name() {
    let mut config = QuicConfig::default();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Application name cannot be empty")));
}

#[test]
fn test_long_app_name() {
    let mut config = QuicConfig::default();
    config.logging.app_name = "a".repeat(100);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Application name too long")));
}

#[test]
fn test_log_to_file_without_path() {
    let mut config = QuicConfig::default();
    config.logging.log_to_file = true;
    config.logging.log_file_path = None;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("log_file_path must be specified")));
}

#[test]
fn test_no_logging_outputs() {
    let mut config = QuicConfig::default();
    config.logging.log_to_console = false;
    config.logging.log_to_file = false;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("At least one logging output")));
}

#[test]
fn test_validate_strict_with_invalid_config() {
    let mut config = QuicConfig::default();
    config.reader.yield_after_packets = 0;

    let result = config.validate_strict();
    assert!(result.is_err());

    if let Err(e) = result {
        assert!(e.to_string().contains("Configuration validation failed"));
    }
}

#[test]
fn test_multiple_validation_errors() {
    let mut config = QuicConfig::default();
    config.reader.yield_after_packets = 0;
    config.reader.yield_after_duration = Duration::ZERO;
    config.logging.app_name = String::new();

    assert_eq!(config.validate().len(), 3);
}

#[test]
fn test_from_toml_with_all_sections() {
    let config = QuicConfig::from_toml(
        r#"
[reader]
yield_after_packets = 16
yield_after_duration = 5

[logging]
app_name = "edge-reader"
log_level = "debug"
log_to_console = true
log_to_file = false
json_format = true
"#,
    )
    .unwrap();

    assert_eq!(config.reader.yield_after_packets, 16);
    assert_eq!(config.reader.yield_after_duration, Duration::from_millis(5));
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);
    assert!(config.validate().is_empty());
}

#[test]
fn test_from_toml_rejects_bad_level() {
    let result = QuicConfig::from_toml(
        r#"
[logging]
app_name = "x"
log_level = "loud"
log_to_console = true
log_to_file = false
json_format = false
"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_save_and_load_round_trip() {
    let path = std::env::temp_dir().join(format!("quicwire-config-{}.toml", std::process::id()));
    let config = QuicConfig::default_with_overrides(|c| {
        c.reader.yield_after_packets = 7;
        c.logging = LoggingConfig {
            app_name: "saved".to_string(),
            ..LoggingConfig::default()
        };
    });

    config.save_to_file(&path).unwrap();
    let loaded = QuicConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.reader, config.reader);
    assert_eq!(loaded.logging.app_name, "saved");
}

#[test]
fn test_example_config_parses() {
    let example = QuicConfig::example_config();
    assert!(example.contains("yield_after_packets"));
    assert!(QuicConfig::from_toml(&example).is_ok());
}
