use crate::store::{DocumentStore, FileStore, Filter, StoreError, Update, WriteOp};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn documents_survive_reopen() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("state/killfeed.json");
    let store = FileStore::open(&path).await.unwrap();
    store
        .upsert("file_cursors", "7020|/a.csv", &Update::new().set("offset", 120))
        .await
        .unwrap();
    drop(store);

    // Act
    let reopened = FileStore::open(&path).await.unwrap();
    let doc = reopened.get("file_cursors", "7020|/a.csv").await.unwrap();

    // Assert
    assert_eq!(doc.unwrap()["offset"], json!(120));
}

#[tokio::test]
async fn missing_file_opens_empty() {
    // Arrange
    let dir = tempdir().unwrap();

    // Act
    let store = FileStore::open(dir.path().join("fresh.json")).await.unwrap();

    // Assert
    assert!(store.ping().await.is_ok());
    assert!(store.find("players", &Filter::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_file_is_unavailable() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("killfeed.json");
    fs::write(&path, "{ not json").unwrap();

    // Act
    let result = FileStore::open(&path).await;

    // Assert
    assert!(matches!(result, Err(StoreError::Unavailable { .. })));
}

#[tokio::test]
async fn ping_fails_when_directory_disappears() {
    // Arrange
    let dir = tempdir().unwrap();
    let state = dir.path().join("state");
    let store = FileStore::open(state.join("killfeed.json")).await.unwrap();
    fs::remove_dir_all(&state).unwrap();

    // Act
    let result = store.ping().await;

    // Assert
    assert!(matches!(result, Err(StoreError::Unavailable { .. })));
}

#[tokio::test]
async fn failed_write_rolls_back_memory() {
    // Arrange
    let dir = tempdir().unwrap();
    let state = dir.path().join("state");
    let store = FileStore::open(state.join("killfeed.json")).await.unwrap();
    store.increment("players", "k", &[("kills", 1)]).await.unwrap();
    fs::remove_dir_all(&state).unwrap();

    // Act
    let result = store.increment("players", "k", &[("kills", 1)]).await;

    // Assert
    assert!(matches!(result, Err(StoreError::Write { .. })));
    let doc = store.get("players", "k").await.unwrap().unwrap();
    assert_eq!(doc["kills"], json!(1));
}

#[tokio::test]
async fn failed_batch_flush_rolls_back_every_document() {
    // Arrange
    let dir = tempdir().unwrap();
    let state = dir.path().join("state");
    let store = FileStore::open(state.join("killfeed.json")).await.unwrap();
    store.increment("players", "a", &[("kills", 1)]).await.unwrap();
    fs::remove_dir_all(&state).unwrap();
    let writes = [
        WriteOp::upsert("players", "a", Update::new().inc("kills", 1)),
        WriteOp::upsert("rivalries", "a|b", Update::new().inc("a_kills", 1)),
    ];

    // Act
    let result = store.apply_batch(&writes).await;

    // Assert
    assert!(matches!(result, Err(StoreError::Write { .. })));
    let doc = store.get("players", "a").await.unwrap().unwrap();
    assert_eq!(doc["kills"], json!(1));
    assert!(store.get("rivalries", "a|b").await.unwrap().is_none());
}

#[tokio::test]
async fn batch_is_persisted_in_one_write() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("killfeed.json");
    let store = FileStore::open(path.clone()).await.unwrap();
    let writes = [
        WriteOp::upsert("players", "a", Update::new().inc("kills", 1)),
        WriteOp::upsert("rivalries", "a|b", Update::new().inc("a_kills", 1)),
    ];

    // Act
    store.apply_batch(&writes).await.unwrap();
    drop(store);
    let reopened = FileStore::open(path).await.unwrap();

    // Assert
    assert_eq!(reopened.get("players", "a").await.unwrap().unwrap()["kills"], json!(1));
    assert_eq!(reopened.get("rivalries", "a|b").await.unwrap().unwrap()["a_kills"], json!(1));
}
