use crate::cursor::error::CursorError;
use crate::cursor::marker::BackfillMarker;
use crate::remote::normalize_path;
use crate::store::{DocumentStore, FILE_CURSORS, Filter, SERVERS, StoreError, Update, get_typed};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Stored form of a cursor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileCursor {
    pub server_id: String,
    pub path: String,
    pub offset: u64,
    pub updated_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Key of the cursor document for `path` on `server_id`.
pub fn cursor_key(server_id: &str, path: &str) -> String {
    format!("{server_id}|{}", normalize_path(path))
}

#[derive(Clone)]
pub struct PositionTracker {
    store: Arc<dyn DocumentStore>,
}

impl PositionTracker {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, server_id: &str, path: &str) -> Result<Option<FileCursor>, StoreError> {
        get_typed(self.store.as_ref(), FILE_CURSORS, &cursor_key(server_id, path)).await
    }

    /// Bytes of `path` already consumed. Zero when never read.
    pub async fn get_cursor(&self, server_id: &str, path: &str) -> Result<u64, StoreError> {
        Ok(self
            .load(server_id, path)
            .await?
            .map_or(0, |cursor| cursor.offset))
    }

    /// Move the cursor to `offset`. Must only be called once the events below
    /// `offset` are durably aggregated.
    pub async fn advance_cursor(
        &self,
        server_id: &str,
        path: &str,
        offset: u64,
        now: DateTime<Utc>,
    ) -> Result<(), CursorError> {
        let current = self.get_cursor(server_id, path).await?;
        if offset < current {
            return Err(CursorError::Rewind {
                server_id: server_id.to_string(),
                path: path.to_string(),
                current,
                requested: offset,
            });
        }

        let path = normalize_path(path);
        let stamp = now.to_rfc3339();
        let update = Update::new()
            .set("server_id", server_id)
            .set("path", path.as_str())
            .set("offset", offset)
            .set("updated_at", stamp.as_str())
            .set_on_insert("created_at", stamp.as_str());

        self.store
            .upsert(FILE_CURSORS, &cursor_key(server_id, &path), &update)
            .await?;

        tracing::debug!(server_id, path = %path, from = current, offset, "cursor advanced");
        Ok(())
    }

    /// Forget every cursor of `server_id` so its files are read from the start.
    pub async fn reset_server(&self, server_id: &str) -> Result<usize, StoreError> {
        let cleared = self
            .store
            .delete_many(FILE_CURSORS, &Filter::eq("server_id", server_id))
            .await?;

        tracing::info!(server_id, cleared, "file cursors reset");
        Ok(cleared)
    }

    pub async fn backfill_marker(&self, server_id: &str) -> Result<BackfillMarker, StoreError> {
        Ok(get_typed(self.store.as_ref(), SERVERS, server_id)
            .await?
            .unwrap_or_default())
    }

    pub async fn mark_backfill_complete(
        &self,
        server_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let update = Update::new()
            .set("backfill_completed", true)
            .set("backfill_completed_at", now.to_rfc3339());
        self.store.upsert(SERVERS, server_id, &update).await?;

        tracing::info!(server_id, "historical backfill completed");
        Ok(())
    }

    /// Returns whether a completed backfill was cleared.
    pub async fn clear_backfill(&self, server_id: &str) -> Result<bool, StoreError> {
        let was_complete = self.backfill_marker(server_id).await?.backfill_completed;
        if was_complete {
            let update = Update::new()
                .set("backfill_completed", false)
                .set("backfill_completed_at", Value::Null);
            self.store.upsert(SERVERS, server_id, &update).await?;
            tracing::info!(server_id, "historical backfill marker cleared");
        }
        Ok(was_complete)
    }
}
