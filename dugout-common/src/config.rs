//! Configuration file discovery and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the data root folder
pub const ROOT_FOLDER_ENV: &str = "DUGOUT_ROOT_FOLDER";

/// Environment variable naming an explicit TOML config file
pub const CONFIG_FILE_ENV: &str = "DUGOUT_CONFIG";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `root_folder` key of the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Locate the TOML configuration file
///
/// `DUGOUT_CONFIG` wins when set; otherwise the per-user config directory
/// is checked, then `/etc/dugout/config.toml` on Linux. Finding nothing is
/// `NotFound`; a missing explicit file is a `Config` error.
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_FILE_ENV) {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return Ok(path);
        }
        return Err(Error::Config(format!("Config file not found: {}", path.display())));
    }

    let user_config = dirs::config_dir().map(|d| d.join("dugout").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/dugout/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::NotFound("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("dugout"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dugout"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("dugout"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dugout"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("dugout"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dugout"))
    } else {
        PathBuf::from("./dugout_data")
    }
}
