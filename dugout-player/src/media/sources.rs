//! Dispatch by music source

use super::{LocalLibraryResolver, MediaResolver, RemoteCatalogResolver, ResolvedMedia};
use crate::error::{Error, Result};
use async_trait::async_trait;
use dugout_store::MusicSource;

/// Routes each lookup to the resolver for its source
///
/// A source without a configured resolver resolves nothing (`NotFound`).
#[derive(Debug, Clone, Default)]
pub struct MediaSources {
    local: Option<LocalLibraryResolver>,
    remote: Option<RemoteCatalogResolver>,
}

impl MediaSources {
    pub fn new(local: Option<LocalLibraryResolver>, remote: Option<RemoteCatalogResolver>) -> Self {
        Self { local, remote }
    }
}

#[async_trait]
impl MediaResolver for MediaSources {
    async fn resolve(&self, source: MusicSource, track_id: &str) -> Result<ResolvedMedia> {
        match source {
            MusicSource::Local => match &self.local {
                Some(local) => local.resolve(source, track_id).await,
                None => Err(Error::NotFound("no local media library configured".into())),
            },
            MusicSource::Remote => match &self.remote {
                Some(remote) => remote.resolve(source, track_id).await,
                None => Err(Error::NotFound("no remote catalog configured".into())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_remote_is_not_found() {
        let sources = MediaSources::new(None, None);
        let err = sources.resolve(MusicSource::Remote, "abc").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_local_lookups_reach_the_library() {
        let dir = tempfile::tempdir().unwrap();
        let sources = MediaSources::new(Some(LocalLibraryResolver::new(dir.path())), None);
        let err = sources.resolve(MusicSource::Local, "../x.mp3").await.unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }
}
