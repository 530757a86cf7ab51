//! Settings database access
//!
//! Read/write runtime settings from the settings table (key-value store).
//! Missing keys are written back with their default on first read so the
//! table always documents the values in effect.

use crate::error::{Error, Result};
use dugout_common::FadeCurve;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

const PROGRESS_INTERVAL_MS: &str = "progress_interval_ms";
const FADE_STEP_MS: &str = "fade_step_ms";
const FADE_CURVE: &str = "fade_curve";
const STOP_PREVIEW_ON_MAIN_PLAY: &str = "stop_preview_on_main_play";
const SPEECH_WORDS_PER_MINUTE: &str = "speech_words_per_minute";
const VOICE_CACHE_ENABLED: &str = "voice_cache_enabled";

/// Settings the engine reads at the start of every play request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Interval between progress publications
    pub progress_interval_ms: u64,
    /// Interval between fade level updates
    pub fade_step_ms: u64,
    /// Fade-out curve
    pub fade_curve: FadeCurve,
    /// Stop the preview transport when the main transport starts playing
    pub stop_preview_on_main_play: bool,
    /// Baseline speech pace at normal rate
    pub speech_words_per_minute: u32,
    /// Reuse previously generated AI voice clips
    pub voice_cache_enabled: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 250,
            fade_step_ms: 50,
            fade_curve: FadeCurve::Linear,
            stop_preview_on_main_play: false,
            speech_words_per_minute: 165,
            voice_cache_enabled: true,
        }
    }
}

/// Load runtime settings, writing defaults for missing keys
pub async fn load_runtime_settings(db: &Pool<Sqlite>) -> Result<RuntimeSettings> {
    let defaults = RuntimeSettings::default();

    let progress_interval_ms =
        get_or_init(db, PROGRESS_INTERVAL_MS, defaults.progress_interval_ms).await?;
    let fade_step_ms = get_or_init(db, FADE_STEP_MS, defaults.fade_step_ms).await?;

    let fade_curve = match get_setting::<String>(db, FADE_CURVE).await? {
        Some(value) => FadeCurve::from_str(&value).ok_or_else(|| {
            Error::Config(format!("Unknown fade curve '{}'", value))
        })?,
        None => {
            set_setting(db, FADE_CURVE, defaults.fade_curve.to_db_string()).await?;
            defaults.fade_curve
        }
    };

    let stop_preview_on_main_play = get_or_init(
        db,
        STOP_PREVIEW_ON_MAIN_PLAY,
        defaults.stop_preview_on_main_play,
    )
    .await?;
    let speech_words_per_minute =
        get_or_init(db, SPEECH_WORDS_PER_MINUTE, defaults.speech_words_per_minute).await?;
    let voice_cache_enabled =
        get_or_init(db, VOICE_CACHE_ENABLED, defaults.voice_cache_enabled).await?;

    Ok(RuntimeSettings {
        progress_interval_ms: progress_interval_ms.max(10),
        fade_step_ms: fade_step_ms.max(1),
        fade_curve,
        stop_preview_on_main_play,
        speech_words_per_minute: speech_words_per_minute.max(1),
        voice_cache_enabled,
    })
}

/// Persist every runtime setting
pub async fn save_runtime_settings(db: &Pool<Sqlite>, settings: &RuntimeSettings) -> Result<()> {
    set_setting(db, PROGRESS_INTERVAL_MS, settings.progress_interval_ms).await?;
    set_setting(db, FADE_STEP_MS, settings.fade_step_ms).await?;
    set_setting(db, FADE_CURVE, settings.fade_curve.to_db_string()).await?;
    set_setting(db, STOP_PREVIEW_ON_MAIN_PLAY, settings.stop_preview_on_main_play).await?;
    set_setting(db, SPEECH_WORDS_PER_MINUTE, settings.speech_words_per_minute).await?;
    set_setting(db, VOICE_CACHE_ENABLED, settings.voice_cache_enabled).await?;
    debug!("Runtime settings saved");
    Ok(())
}

async fn get_or_init<T>(db: &Pool<Sqlite>, key: &str, default: T) -> Result<T>
where
    T: FromStr + ToString + Copy,
{
    match get_setting::<T>(db, key).await? {
        Some(value) => Ok(value),
        None => {
            set_setting(db, key, default).await?;
            Ok(default)
        }
    }
}

/// Generic setting getter
///
/// Returns `None` if the key is absent; a value that does not parse is a
/// configuration error.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}
