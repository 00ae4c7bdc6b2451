//! Tests for configuration loading and validation.

use std::io::Write;

use guess_weather::{GameConfig, Overrides};
use guess_weather_core::SessionStatus;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_missing_file_uses_defaults() {
    let config = GameConfig::load_or_default("/nonexistent/guess_weather.toml").expect("Defaults");
    assert_eq!(config, GameConfig::default());
    assert_eq!(config.cities().len(), 12);
    assert_eq!(*config.rules().max_rounds(), 5);
    assert_eq!(config.provider().units(), "metric");
}

#[test]
fn test_partial_file_fills_defaults() {
    let file = write_config(
        r#"
cities = ["Kyiv", "Lviv", "Odesa", "Kharkiv", "Dnipro", "Poltava"]
seed = 17

[rules]
win_threshold = 5
"#,
    );

    let config = GameConfig::from_file(file.path()).expect("Valid config");
    assert_eq!(config.cities().len(), 6);
    assert_eq!(*config.seed(), Some(17));
    assert_eq!(*config.rules().win_threshold(), 5);
    assert_eq!(*config.rules().tolerance(), 4.0);
    assert_eq!(*config.provider().timeout_secs(), 10);
}

#[test]
fn test_unparseable_file_rejected() {
    let file = write_config("cities = [unterminated");
    let err = GameConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_overrides_take_precedence() {
    let config = GameConfig::default().apply(Overrides {
        rounds: Some(3),
        tolerance: Some(0.0),
        win_threshold: Some(3),
        seed: Some(5),
    });
    assert_eq!(*config.rules().max_rounds(), 3);
    assert_eq!(*config.rules().tolerance(), 0.0);
    assert_eq!(*config.rules().win_threshold(), 3);
    assert_eq!(*config.seed(), Some(5));
}

#[test]
fn test_small_pool_rejected_before_session() {
    let config = GameConfig::from_toml(r#"cities = ["Kyiv", "Lviv", "Kyiv"]"#).expect("Parses");
    let err = config.build_controller().unwrap_err();
    assert!(err.message.contains("City pool exhausted"), "{}", err.message);
}

#[test]
fn test_invalid_rules_rejected() {
    let config = GameConfig::default().apply(Overrides {
        rounds: Some(3),
        ..Overrides::default()
    });
    let err = config.build_controller().unwrap_err();
    assert!(err.message.contains("Invalid rules"), "{}", err.message);
}

#[test]
fn test_valid_config_builds_controller() {
    let config = GameConfig::default().apply(Overrides {
        seed: Some(1),
        ..Overrides::default()
    });
    let mut controller = config.build_controller().expect("Valid config");
    assert_eq!(controller.status(), SessionStatus::NotStarted);
    controller.start().expect("Starts");
    assert_eq!(controller.used_cities().len(), 1);
}
