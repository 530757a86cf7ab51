//! Remote catalog resolver
//!
//! Looks tracks up by id on an HTTP catalog:
//! `GET {base_url}/tracks/{id}` returning
//! `{stream_url, duration_seconds?, title?, artist?, artwork_url?}`.
//! Artwork is fetched best-effort; a failed artwork download never fails
//! the resolution.

use super::{MediaResolver, ResolvedMedia};
use crate::audio::Playable;
use crate::error::{Error, Result};
use async_trait::async_trait;
use dugout_store::MusicSource;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("dugout-player/", env!("CARGO_PKG_VERSION"));

/// Catalog track lookup response
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogTrack {
    pub stream_url: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

/// HTTP catalog client
#[derive(Debug, Clone)]
pub struct RemoteCatalogResolver {
    http_client: reqwest::Client,
    base_url: String,
}

impl RemoteCatalogResolver {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the catalog record for a track
    pub async fn lookup(&self, track_id: &str) -> Result<CatalogTrack> {
        let url = format!("{}/tracks/{}", self.base_url, track_id);
        debug!(track_id = %track_id, url = %url, "Querying remote catalog");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!("remote track {}", track_id))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::PermissionDenied(
                format!("remote catalog refused track {}", track_id),
            )),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Network(format!("catalog returned {}: {}", s, body)))
            }
            _ => Ok(response.json::<CatalogTrack>().await?),
        }
    }

    async fn fetch_artwork(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.http_client.get(url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(url = %url, status = %r.status(), "Artwork unavailable");
                return None;
            }
            Err(e) => {
                warn!(url = %url, "Artwork fetch failed: {}", e);
                return None;
            }
        };
        response.bytes().await.ok().map(|b| b.to_vec())
    }
}

#[async_trait]
impl MediaResolver for RemoteCatalogResolver {
    async fn resolve(&self, source: MusicSource, track_id: &str) -> Result<ResolvedMedia> {
        if source != MusicSource::Remote {
            return Err(Error::NotFound(format!("{} track {} is not remote", source, track_id)));
        }

        let track = self.lookup(track_id).await?;
        let artwork = match &track.artwork_url {
            Some(url) => self.fetch_artwork(url).await,
            None => None,
        };

        info!(
            track_id = %track_id,
            title = %track.title.as_deref().unwrap_or("Unknown"),
            "Resolved remote track"
        );

        Ok(ResolvedMedia {
            playable: Playable::Url(track.stream_url),
            duration_seconds: track.duration_seconds,
            title: track.title,
            artist: track.artist,
            artwork,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as HttpStatus;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};

    async fn track(Path(id): Path<String>) -> axum::response::Response {
        match id.as_str() {
            "anthem" => Json(serde_json::json!({
                "stream_url": "http://cdn.local/anthem.mp3",
                "duration_seconds": 182.5,
                "title": "Anthem",
                "artist": "The Band",
                "artwork_url": "http://127.0.0.1:9/unreachable.jpg"
            }))
            .into_response(),
            "locked" => HttpStatus::FORBIDDEN.into_response(),
            "broken" => HttpStatus::BAD_GATEWAY.into_response(),
            _ => HttpStatus::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_catalog() -> String {
        let app = Router::new().route("/tracks/:id", get(track));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_resolves_track_and_tolerates_missing_artwork() {
        let resolver = RemoteCatalogResolver::new(spawn_catalog().await).unwrap();
        let media = resolver.resolve(MusicSource::Remote, "anthem").await.unwrap();

        assert_eq!(media.playable, Playable::Url("http://cdn.local/anthem.mp3".into()));
        assert_eq!(media.duration_seconds, Some(182.5));
        assert_eq!(media.title.as_deref(), Some("Anthem"));
        assert!(media.artwork.is_none());
    }

    #[tokio::test]
    async fn test_status_codes_map_to_error_kinds() {
        let resolver = RemoteCatalogResolver::new(spawn_catalog().await).unwrap();

        let err = resolver.resolve(MusicSource::Remote, "gone").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = resolver.resolve(MusicSource::Remote, "locked").await.unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));

        let err = resolver.resolve(MusicSource::Remote, "broken").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
