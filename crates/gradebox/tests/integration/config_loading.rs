use gradebox::config::Config;
use gradebox::{Language, SecurityMode};

use super::FIXTURES_PATH;

#[test]
fn test_load_valid_config() {
    let path = format!("{}/configs/valid_full.toml", FIXTURES_PATH);
    let config = Config::from_file(&path).expect("Failed to load config");

    assert!(config.toolchains.contains_key("python"));
    assert!(config.toolchain(Language::Java).unwrap().is_compiled());
    assert_eq!(config.defaults.timeout_ms, 3000);
    assert_eq!(config.defaults.security_mode, SecurityMode::Block);
    assert_eq!(
        config.toolchain(Language::Java).unwrap().compile.as_ref().unwrap().timeout_ms,
        20000
    );
}

#[test]
fn test_load_minimal_config() {
    let path = format!("{}/configs/valid_minimal.toml", FIXTURES_PATH);
    let config = Config::from_file(&path).expect("Failed to load config");

    assert!(config.toolchain(Language::JavaScript).is_ok());
    assert!(config.toolchain(Language::Python).is_err());
    assert_eq!(config.defaults.timeout_ms, 2000);
}

#[test]
fn test_load_invalid_empty_run_command() {
    let path = format!("{}/configs/invalid_empty_run_command.toml", FIXTURES_PATH);
    let result = Config::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_extension() {
    let path = format!("{}/configs/invalid_extension.toml", FIXTURES_PATH);
    let result = Config::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_timeout() {
    let path = format!("{}/configs/invalid_timeout.toml", FIXTURES_PATH);
    let result = Config::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_load_missing_file() {
    let result = Config::from_file(format!("{}/configs/does_not_exist.toml", FIXTURES_PATH));
    assert!(result.is_err());
}
