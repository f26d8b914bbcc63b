//! Configuration loading and root folder resolution
//!
//! Tests that manipulate CITYEMIT_ROOT_FOLDER are marked #[serial] so they
//! never race on the process environment.

use cityemit_common::config::{
    database_path, resolve_root_folder, TomlConfig, DEFAULT_EMISSION_INTERVAL_MS,
    DEFAULT_WELCOME_DELAY_MS, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[test]
fn test_defaults_when_sections_missing() {
    let config: TomlConfig = toml::from_str("").unwrap();

    assert!(config.root_folder.is_none());
    assert_eq!(config.producer.interval_ms, DEFAULT_EMISSION_INTERVAL_MS);
    assert_eq!(config.presentation.welcome_delay_ms, DEFAULT_WELCOME_DELAY_MS);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_from_file_reads_all_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
root_folder = "/srv/cityemit"

[producer]
interval_ms = 250

[presentation]
welcome_delay_ms = 10

[logging]
level = "debug"
"#
    )
    .unwrap();

    let config = TomlConfig::from_file(file.path()).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/cityemit")));
    assert_eq!(config.producer.interval(), Duration::from_millis(250));
    assert_eq!(config.presentation.welcome_delay(), Duration::from_millis(10));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_from_file_rejects_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[producer\ninterval_ms = ").unwrap();

    let result = TomlConfig::from_file(file.path());
    assert!(matches!(result, Err(cityemit_common::Error::Config(_))));
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load_from_path_or_default(&dir.path().join("config.toml"));

    assert!(config.root_folder.is_none());
    assert_eq!(config.producer.interval_ms, DEFAULT_EMISSION_INTERVAL_MS);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_config_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "root_folder = \"/srv/cityemit\"\n[producer\ninterval_ms = ").unwrap();

    let config = TomlConfig::load_from_path_or_default(file.path());

    assert!(config.root_folder.is_none());
    assert_eq!(config.producer.interval_ms, DEFAULT_EMISSION_INTERVAL_MS);
    assert_eq!(config.presentation.welcome_delay_ms, DEFAULT_WELCOME_DELAY_MS);
}

#[test]
fn test_valid_config_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[producer]\ninterval_ms = 750").unwrap();

    let config = TomlConfig::load_from_path_or_default(file.path());

    assert_eq!(config.producer.interval(), Duration::from_millis(750));
    assert_eq!(config.presentation.welcome_delay_ms, DEFAULT_WELCOME_DELAY_MS);
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/from/cli")), &toml);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/from/cli"));
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, &toml);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };
    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/from/toml"));

    let fallback = resolve_root_folder(None, &TomlConfig::default());
    assert!(fallback.ends_with("cityemit") || fallback.ends_with("cityemit_data"));
}

#[test]
fn test_database_path_in_root() {
    assert_eq!(
        database_path(Path::new("/data")),
        PathBuf::from("/data/cityemit.db")
    );
}
