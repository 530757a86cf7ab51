//! Generated clip cache
//!
//! Clips are stored in the `voice_clips` table under the SHA-256 of the
//! voice id and the exact announcement text, so editing either produces a
//! fresh clip.

use crate::error::Result;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Cache key for a `(voice, text)` pair
pub fn cache_key(voice_id: Uuid, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(voice_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SQLite-backed clip cache
#[derive(Debug, Clone)]
pub struct SqliteClipCache {
    db: SqlitePool,
}

impl SqliteClipCache {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get(&self, voice_id: Uuid, text: &str) -> Result<Option<Vec<u8>>> {
        let key = cache_key(voice_id, text);
        let audio: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT audio FROM voice_clips WHERE cache_key = ?")
                .bind(&key)
                .fetch_optional(&self.db)
                .await?;

        debug!(%voice_id, hit = audio.is_some(), "Voice clip cache lookup");
        Ok(audio)
    }

    pub async fn put(&self, voice_id: Uuid, text: &str, audio: &[u8]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO voice_clips (cache_key, voice_id, text, audio, created_at)
            VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(cache_key) DO UPDATE SET audio = excluded.audio, created_at = excluded.created_at
            "#,
        )
        .bind(cache_key(voice_id, text))
        .bind(voice_id.to_string())
        .bind(text)
        .bind(audio)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Drop every clip rendered with `voice_id`
    pub async fn evict_voice(&self, voice_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM voice_clips WHERE voice_id = ?")
            .bind(voice_id.to_string())
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dugout_common::db::init_memory_database;

    #[test]
    fn test_key_depends_on_voice_and_text() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(cache_key(a, "Now batting"), cache_key(a, "Now batting"));
        assert_ne!(cache_key(a, "Now batting"), cache_key(b, "Now batting"));
        assert_ne!(cache_key(a, "Now batting"), cache_key(a, "Now batting "));
        assert_eq!(cache_key(a, "x").len(), 64);
    }

    #[tokio::test]
    async fn test_put_then_get_and_evict() {
        let cache = SqliteClipCache::new(init_memory_database().await.unwrap());
        let voice = Uuid::new_v4();

        assert!(cache.get(voice, "hello").await.unwrap().is_none());
        cache.put(voice, "hello", b"clip-1").await.unwrap();
        cache.put(voice, "hello", b"clip-2").await.unwrap();
        assert_eq!(cache.get(voice, "hello").await.unwrap(), Some(b"clip-2".to_vec()));

        assert_eq!(cache.evict_voice(voice).await.unwrap(), 1);
        assert!(cache.get(voice, "hello").await.unwrap().is_none());
    }
}
