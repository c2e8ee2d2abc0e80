//! Durable keyed document store.
//!
//! Documents are JSON objects addressed by `(collection, key)`. Field names
//! in updates and filters are dotted paths into nested objects, so
//! `weapons.AK-74` addresses `{"weapons": {"AK-74": ..}}`.

mod document;
mod error;
mod file;
mod memory;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use document::{Document, Filter, Update, WriteOp, get_path};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

pub const FILE_CURSORS: &str = "file_cursors";
pub const PLAYERS: &str = "players";
pub const RIVALRIES: &str = "rivalries";
pub const SERVERS: &str = "servers";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fails with [`StoreError::Unavailable`] when the store cannot be used.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// All documents of `collection` matching `filter`, ordered by key.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<(String, Document)>, StoreError>;

    /// Apply `update` to one document, creating it when absent.
    ///
    /// The update is atomic: either every operation is applied or none is.
    async fn upsert(&self, collection: &str, key: &str, update: &Update)
    -> Result<(), StoreError>;

    /// Apply every write or none of them.
    ///
    /// A document written more than once sees the writes in order.
    async fn apply_batch(&self, writes: &[WriteOp]) -> Result<(), StoreError>;

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        set: &Document,
    ) -> Result<usize, StoreError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError>;

    /// Add `delta` to each numeric field, creating missing fields at zero.
    async fn increment(
        &self,
        collection: &str,
        key: &str,
        deltas: &[(&str, i64)],
    ) -> Result<(), StoreError> {
        let mut update = Update::new();
        for (field, delta) in deltas {
            update = update.inc(*field, *delta);
        }
        self.upsert(collection, key, &update).await
    }
}

/// Read one document and deserialize it.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(doc) = store.get(collection, key).await? else {
        return Ok(None);
    };

    serde_json::from_value(serde_json::Value::Object(doc))
        .map(Some)
        .map_err(|e| StoreError::decode(collection, key, e.to_string()))
}
