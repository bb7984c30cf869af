use codexec::{Config, Language};

use super::FIXTURES_PATH;

#[test]
fn test_load_valid_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_full.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.max_concurrent, Some(4));
    assert_eq!(config.default_limits.timeout, Some(2.0));
    assert_eq!(
        config.toolchain(Language::Cpp).compile.as_ref().unwrap()[1],
        "-std=c++17"
    );
}

#[test]
fn test_load_minimal_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_minimal.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.default_limits.timeout, Some(1.0));
    assert_eq!(config.languages, codexec::Languages::default());
}

#[test]
fn test_load_invalid_empty_extension() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_extension.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_invalid_empty_run_command() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_run_command.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_invalid_missing_compiler() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_missing_compiler.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_missing_file() {
    let path = format!("{FIXTURES_PATH}/configs/does_not_exist.toml");
    assert!(Config::from_file(&path).is_err());
}
