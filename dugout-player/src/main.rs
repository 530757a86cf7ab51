//! Dugout Player (dugout-player) - Main entry point
//!
//! Soundboard playback service: loads the entity graph from SQLite, wires
//! the media resolvers, voice adapter and audio output into the playback
//! engine, and serves the HTTP control surface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dugout_common::EventBus;
use dugout_player::api::{self, AppContext};
use dugout_player::audio::{AudioOutput, TracingOutput};
use dugout_player::config::{CliOverrides, Config, TomlConfig};
use dugout_player::db::settings::load_runtime_settings;
use dugout_player::media::{LocalLibraryResolver, MediaSources, RemoteCatalogResolver};
use dugout_player::voice::{
    ElevenLabsProvider, PacedSpeech, SqliteClipCache, VoiceAdapter, VoiceProvider,
};
use dugout_player::{PlaybackEngine, SharedState};

const DEFAULT_LOG_FILTER: &str = "dugout_player=debug,dugout_store=info,tower_http=debug";

/// Command-line arguments for dugout-player
#[derive(Parser, Debug)]
#[command(name = "dugout-player")]
#[command(about = "Sideline soundboard playback service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "DUGOUT_PORT")]
    port: Option<u16>,

    /// Root folder holding the database and media library
    #[arg(short, long, env = "DUGOUT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Database file (defaults to <root>/dugout.db)
    #[arg(long, env = "DUGOUT_DATABASE")]
    database: Option<PathBuf>,

    /// Local media library (defaults to <root>/media)
    #[arg(long, env = "DUGOUT_MEDIA_ROOT")]
    media_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::discover().context("Failed to load config file")?;

    // Initialize tracing; RUST_LOG wins over the config file
    let default_filter = toml_config
        .logging
        .level
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::resolve(
        CliOverrides {
            root_folder: args.root_folder,
            port: args.port,
            database_path: args.database,
            media_root: args.media_root,
        },
        toml_config,
    );
    info!("Starting dugout-player v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = dugout_common::db::init_database(&config.database_path)
        .await
        .context("Failed to open database")?;
    let settings = load_runtime_settings(&db_pool)
        .await
        .context("Failed to load runtime settings")?;

    let (store, writer) = dugout_store::db::open_store(&db_pool)
        .await
        .context("Failed to load data store")?;
    if store.events().is_empty() {
        warn!("No team events yet; create one before adding buttons");
    }

    let bus = EventBus::default();
    let words_per_minute = settings.speech_words_per_minute;
    let state = Arc::new(SharedState::new(store, settings, bus.clone()));

    // Media sources
    let remote = match &config.catalog_base_url {
        Some(url) => Some(
            RemoteCatalogResolver::new(url.clone()).context("Failed to create catalog client")?,
        ),
        None => None,
    };
    let resolver = Arc::new(MediaSources::new(
        Some(LocalLibraryResolver::new(config.media_root.clone())),
        remote,
    ));

    // Voice synthesis
    let provider: Option<Arc<dyn VoiceProvider>> = match &config.voice_api_key {
        Some(key) => Some(Arc::new(
            ElevenLabsProvider::new(
                config.voice.provider_base_url.clone(),
                key.clone(),
                config.voice.model_id.clone(),
            )
            .context("Failed to create voice provider client")?,
        )),
        None => {
            info!("No voice provider key; AI voices will use system speech");
            None
        }
    };
    let voice = VoiceAdapter::new(provider, Some(SqliteClipCache::new(db_pool.clone())), bus);
    let speech = Arc::new(PacedSpeech::new(words_per_minute));

    let engine = PlaybackEngine::new(state.clone(), resolver, open_output(), speech, voice);
    info!("Playback engine initialized");

    let ctx = AppContext {
        state: state.clone(),
        engine: engine.clone(),
    };
    api::run(config.port, ctx, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Flush pending store changes
    engine.shutdown();
    state.close_persistence().context("Failed to close persistence")?;
    drop(state);
    writer.await.context("Snapshot writer panicked")?;
    db_pool.close().await;

    info!("Shutdown complete");
    Ok(())
}

#[cfg(feature = "rodio-output")]
fn open_output() -> Arc<dyn AudioOutput> {
    match dugout_player::audio::RodioOutput::open() {
        Ok(output) => Arc::new(output),
        Err(e) => {
            warn!("Audio device unavailable ({}); running headless", e);
            Arc::new(TracingOutput::new())
        }
    }
}

#[cfg(not(feature = "rodio-output"))]
fn open_output() -> Arc<dyn AudioOutput> {
    Arc::new(TracingOutput::new())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
