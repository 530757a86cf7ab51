//! Media Source Resolver
//!
//! Turns a `(source, track id)` pair from a song descriptor into something
//! the output can play, plus its duration and display metadata.
//!
//! **Responsibilities:**
//! - Local library lookups confined to the media root (`local`)
//! - Remote catalog lookups over HTTP (`remote`)
//! - Dispatch by source tag (`sources`)

pub mod local;
pub mod remote;
pub mod sources;

use crate::audio::Playable;
use crate::error::Result;
use async_trait::async_trait;
use dugout_store::MusicSource;

pub use local::LocalLibraryResolver;
pub use remote::RemoteCatalogResolver;
pub use sources::MediaSources;

/// A resolved, playable track
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub playable: Playable,
    /// Total length; `None` when unknown (progress and fades disabled)
    pub duration_seconds: Option<f64>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork: Option<Vec<u8>>,
}

impl ResolvedMedia {
    pub fn new(playable: Playable, duration_seconds: Option<f64>) -> Self {
        Self {
            playable,
            duration_seconds,
            title: None,
            artist: None,
            artwork: None,
        }
    }

    /// Duration usable for progress and fades: finite and positive
    pub fn known_duration(&self) -> Option<f64> {
        self.duration_seconds.filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// Resolves track references to playable media
///
/// Resolution may take arbitrarily long; the engine cancels it by dropping
/// the future.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, source: MusicSource, track_id: &str) -> Result<ResolvedMedia>;
}
