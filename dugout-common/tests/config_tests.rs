//! Tests for root folder resolution priority
//!
//! Uses serial_test: these tests mutate DUGOUT_ROOT_FOLDER / DUGOUT_CONFIG.

use dugout_common::config::{
    default_root_folder, find_config_file, resolve_root_folder, CONFIG_FILE_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/dugout-env");
    let resolved = resolve_root_folder(Some(Path::new("/tmp/dugout-cli")), ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/dugout-cli"));
    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_var_beats_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "root_folder = \"/tmp/dugout-toml\"\n").unwrap();
    env::set_var(CONFIG_FILE_ENV, &config_path);
    env::set_var(ROOT_FOLDER_ENV, "/tmp/dugout-env");

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/dugout-env"));

    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
#[serial]
fn test_config_file_root_folder() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "root_folder = \"/tmp/dugout-toml\"\n").unwrap();
    env::remove_var(ROOT_FOLDER_ENV);
    env::set_var(CONFIG_FILE_ENV, &config_path);

    assert_eq!(find_config_file().unwrap(), config_path);
    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/dugout-toml"));

    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
#[serial]
fn test_missing_explicit_config_is_error() {
    env::set_var(CONFIG_FILE_ENV, "/nonexistent/dugout/config.toml");
    assert!(find_config_file().is_err());
    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
fn test_default_root_folder_is_non_empty() {
    let root = default_root_folder();
    assert!(!root.as_os_str().is_empty());
    assert!(root.to_string_lossy().contains("dugout"));
}
