//! dugout-player bootstrap configuration
//!
//! Bootstrap values come from, in priority order: command-line arguments
//! (with their environment fallbacks, handled by clap), the TOML config
//! file, then compiled defaults relative to the root folder. Runtime
//! tunables live in the database, see [`crate::db::settings`].

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Remote catalog section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the remote track catalog; remote songs are unavailable
    /// when unset
    pub base_url: Option<String>,
}

/// AI voice provider section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub provider_base_url: String,
    /// Name of the environment variable holding the provider API key
    pub api_key_env: String,
    pub model_id: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider_base_url: "https://api.elevenlabs.io".to_string(),
            api_key_env: "DUGOUT_VOICE_API_KEY".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
        }
    }
}

/// Logging section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: Option<String>,
}

/// TOML bootstrap file contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub media_root: Option<PathBuf>,
    pub catalog: CatalogConfig,
    pub voice: VoiceConfig,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        debug!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Config file if one can be found, otherwise defaults
    pub fn discover() -> Result<Self> {
        match dugout_common::config::find_config_file() {
            Ok(path) => Self::load(&path),
            Err(dugout_common::Error::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub media_root: PathBuf,
    pub port: u16,
    pub catalog_base_url: Option<String>,
    pub voice: VoiceConfig,
    /// Provider API key; AI voices fall back to system speech when absent
    pub voice_api_key: Option<String>,
}

/// Values given on the command line (or their environment fallbacks)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub media_root: Option<PathBuf>,
}

impl Config {
    /// Merge CLI overrides over the TOML file over defaults
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Self {
        let root_folder = cli.root_folder.clone().unwrap_or_else(|| {
            toml.root_folder.clone().unwrap_or_else(|| {
                dugout_common::config::resolve_root_folder(
                    None,
                    dugout_common::config::ROOT_FOLDER_ENV,
                )
            })
        });

        let database_path = cli
            .database_path
            .or(toml.database_path)
            .unwrap_or_else(|| root_folder.join("dugout.db"));
        let media_root = cli
            .media_root
            .or(toml.media_root)
            .unwrap_or_else(|| root_folder.join("media"));
        let port = cli.port.or(toml.port).unwrap_or(DEFAULT_PORT);

        let voice_api_key = std::env::var(&toml.voice.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        info!(
            root = %root_folder.display(),
            database = %database_path.display(),
            media = %media_root.display(),
            port,
            "Configuration resolved"
        );

        Self {
            root_folder,
            database_path,
            media_root,
            port,
            catalog_base_url: toml.catalog.base_url,
            voice: toml.voice,
            voice_api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_parse_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            root_folder = "/srv/dugout"
            port = 6000

            [catalog]
            base_url = "http://catalog.local"

            [voice]
            api_key_env = "MY_VOICE_KEY"

            [logging]
            level = "dugout_player=trace"
            "#
        )
        .unwrap();

        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(config.port, Some(6000));
        assert_eq!(config.catalog.base_url.as_deref(), Some("http://catalog.local"));
        assert_eq!(config.voice.api_key_env, "MY_VOICE_KEY");
        assert_eq!(config.voice.model_id, VoiceConfig::default().model_id);
        assert_eq!(config.logging.level.as_deref(), Some("dugout_player=trace"));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(matches!(TomlConfig::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_cli_beats_toml_and_paths_default_under_root() {
        std::env::remove_var("DUGOUT_VOICE_API_KEY");
        let toml = TomlConfig {
            root_folder: Some(PathBuf::from("/from/toml")),
            port: Some(7000),
            ..TomlConfig::default()
        };
        let cli = CliOverrides {
            root_folder: Some(PathBuf::from("/from/cli")),
            ..CliOverrides::default()
        };

        let config = Config::resolve(cli, toml);
        assert_eq!(config.root_folder, PathBuf::from("/from/cli"));
        assert_eq!(config.database_path, PathBuf::from("/from/cli/dugout.db"));
        assert_eq!(config.media_root, PathBuf::from("/from/cli/media"));
        assert_eq!(config.port, 7000);
        assert!(config.voice_api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_api_key_read_from_named_env_var() {
        std::env::set_var("DUGOUT_TEST_VOICE_KEY", "secret");
        let toml = TomlConfig {
            root_folder: Some(PathBuf::from("/srv")),
            voice: VoiceConfig {
                api_key_env: "DUGOUT_TEST_VOICE_KEY".into(),
                ..VoiceConfig::default()
            },
            ..TomlConfig::default()
        };

        let config = Config::resolve(CliOverrides::default(), toml);
        assert_eq!(config.voice_api_key.as_deref(), Some("secret"));
        std::env::remove_var("DUGOUT_TEST_VOICE_KEY");
    }
}
