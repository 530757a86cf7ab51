//! Local media library resolver
//!
//! Track ids are paths relative to the media root. Paths that escape the
//! root or that the process may not read are refused with
//! `PermissionDenied`; missing files are `NotFound`.

use super::{MediaResolver, ResolvedMedia};
use crate::audio::Playable;
use crate::error::{Error, Result};
use async_trait::async_trait;
use dugout_store::MusicSource;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Resolver for files under a media root
#[derive(Debug, Clone)]
pub struct LocalLibraryResolver {
    root: PathBuf,
}

/// Duration and tags read from a file
#[derive(Debug, Clone, Default)]
pub struct ProbedTags {
    pub duration_seconds: Option<f64>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork: Option<Vec<u8>>,
}

impl LocalLibraryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a track id onto a canonical path inside the root
    async fn locate(&self, track_id: &str) -> Result<PathBuf> {
        let relative = Path::new(track_id.trim());
        let escapes = relative.components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if track_id.trim().is_empty() || escapes {
            return Err(Error::PermissionDenied(format!(
                "track id outside the media library: {}",
                track_id
            )));
        }

        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;
        let path = tokio::fs::canonicalize(root.join(relative))
            .await
            .map_err(|e| io_error(&root.join(relative), e))?;

        // Symlinks may still point outside
        if !path.starts_with(&root) {
            return Err(Error::PermissionDenied(format!(
                "track resolves outside the media library: {}",
                track_id
            )));
        }
        Ok(path)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(format!("{}", path.display())),
        std::io::ErrorKind::PermissionDenied => {
            Error::PermissionDenied(format!("{}", path.display()))
        }
        _ => Error::Io(e),
    }
}

/// Read duration, title, artist and front artwork with lofty
pub fn probe_file(path: &Path) -> Result<ProbedTags> {
    let tagged_file = Probe::open(path)
        .map_err(|e| io_or_unreadable(path, e))?
        .read()
        .map_err(|e| io_or_unreadable(path, e))?;

    let duration = tagged_file.properties().duration().as_secs_f64();
    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    Ok(ProbedTags {
        duration_seconds: (duration > 0.0).then_some(duration),
        title: tag.and_then(|t| t.title().map(|s| s.to_string())),
        artist: tag.and_then(|t| t.artist().map(|s| s.to_string())),
        artwork: tag.and_then(|t| t.pictures().first().map(|p| p.data().to_vec())),
    })
}

fn io_or_unreadable(path: &Path, e: lofty::error::LoftyError) -> Error {
    match e.kind() {
        lofty::error::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            Error::PermissionDenied(path.display().to_string())
        }
        _ => Error::NotFound(format!("unreadable audio file {}: {}", path.display(), e)),
    }
}

#[async_trait]
impl MediaResolver for LocalLibraryResolver {
    async fn resolve(&self, source: MusicSource, track_id: &str) -> Result<ResolvedMedia> {
        if source != MusicSource::Local {
            return Err(Error::NotFound(format!("{} track {} is not local", source, track_id)));
        }

        let path = self.locate(track_id).await?;
        let probe_path = path.clone();
        let tags = tokio::task::spawn_blocking(move || probe_file(&probe_path))
            .await
            .map_err(|e| Error::Internal(format!("probe task failed: {}", e)))??;

        debug!(
            path = %path.display(),
            duration = ?tags.duration_seconds,
            "Resolved local track"
        );
        if tags.duration_seconds.is_none() {
            warn!("Unknown duration for {}", path.display());
        }

        Ok(ResolvedMedia {
            playable: Playable::File(path),
            duration_seconds: tags.duration_seconds,
            title: tags.title,
            artist: tags.artist,
            artwork: tags.artwork,
        })
    }
}
