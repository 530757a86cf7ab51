//! Snapshot persistence
//!
//! The whole entity graph lives in the single-row `store_snapshot` table
//! (created by `dugout_common::db`). Writes go through a background task
//! that keeps only the newest pending snapshot, so a burst of mutations
//! costs one write.

use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::store::DataStore;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Load the saved snapshot, or an empty one if nothing was saved yet
pub async fn load_snapshot(pool: &SqlitePool) -> Result<Snapshot> {
    let body: Option<String> =
        sqlx::query_scalar("SELECT body FROM store_snapshot WHERE id = 1")
            .fetch_optional(pool)
            .await?;

    match body {
        Some(body) => Ok(Snapshot::from_json(&body)?),
        None => {
            debug!("No saved snapshot, starting empty");
            Ok(Snapshot::default())
        }
    }
}

/// Upsert `snapshot` as the saved graph
pub async fn save_snapshot(pool: &SqlitePool, snapshot: &Snapshot) -> Result<()> {
    let body = snapshot.to_json()?;

    sqlx::query(
        r#"
        INSERT INTO store_snapshot (id, revision, body, saved_at)
        VALUES (1, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(id) DO UPDATE SET
            revision = excluded.revision,
            body = excluded.body,
            saved_at = excluded.saved_at
        "#,
    )
    .bind(snapshot.revision as i64)
    .bind(body)
    .execute(pool)
    .await?;

    Ok(())
}

/// Spawn the background writer
///
/// The task ends once every sender is dropped and the queue is drained.
pub fn spawn_snapshot_writer(pool: SqlitePool) -> (mpsc::UnboundedSender<Snapshot>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Snapshot>();

    let handle = tokio::spawn(async move {
        while let Some(mut latest) = rx.recv().await {
            let mut skipped = 0usize;
            while let Ok(newer) = rx.try_recv() {
                latest = newer;
                skipped += 1;
            }

            match save_snapshot(&pool, &latest).await {
                Ok(()) => debug!(revision = latest.revision, skipped, "Snapshot saved"),
                Err(e) => error!(revision = latest.revision, "Failed to save snapshot: {}", e),
            }
        }
        debug!("Snapshot writer stopped");
    });

    (tx, handle)
}

/// Load the store from `pool` and attach a snapshot writer to it
pub async fn open_store(pool: &SqlitePool) -> Result<(DataStore, JoinHandle<()>)> {
    let snapshot = load_snapshot(pool).await?;
    let mut store = DataStore::from_snapshot(snapshot);

    let (sink, writer) = spawn_snapshot_writer(pool.clone());
    store.attach_sink(sink);

    info!(
        revision = store.revision(),
        events = store.events().len(),
        "Data store opened"
    );
    Ok((store, writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamEvent;
    use dugout_common::db::init_memory_database;

    #[tokio::test]
    async fn test_empty_database_loads_empty_snapshot() {
        let pool = init_memory_database().await.unwrap();
        let snapshot = load_snapshot(&pool).await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_single_row() {
        let pool = init_memory_database().await.unwrap();

        let mut snapshot = Snapshot {
            revision: 1,
            events: vec![TeamEvent::new("Tigers")],
            ..Snapshot::default()
        };
        save_snapshot(&pool, &snapshot).await.unwrap();
        snapshot.revision = 2;
        save_snapshot(&pool, &snapshot).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store_snapshot")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(load_snapshot(&pool).await.unwrap().revision, 2);
    }

    #[tokio::test]
    async fn test_writer_persists_latest() {
        let pool = init_memory_database().await.unwrap();
        let (mut store, writer) = open_store(&pool).await.unwrap();

        store.create_event(TeamEvent::new("Tigers")).unwrap();
        store.create_event(TeamEvent::new("Bears")).unwrap();
        drop(store);
        writer.await.unwrap();

        let saved = load_snapshot(&pool).await.unwrap();
        assert_eq!(saved.revision, 2);
        assert_eq!(saved.events.len(), 2);
    }
}
