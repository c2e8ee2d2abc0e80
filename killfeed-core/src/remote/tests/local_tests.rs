use crate::conf::types::ServerConfig;
use crate::remote::{Connector, EntryKind, LocalConnector, LocalFs, RemoteFs, with_timeout};
use crate::remote::TransportError;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test]
async fn lists_files_and_directories() {
    // Arrange
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("deathlogs/world_0")).unwrap();
    fs::write(dir.path().join("deathlogs/a.csv"), "abc").unwrap();
    let remote = LocalFs::new(dir.path());

    // Act
    let mut entries = remote.list_dir("/deathlogs").await.unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    // Assert
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.csv");
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[0].size, 3);
    assert_eq!(entries[1].name, "world_0");
    assert_eq!(entries[1].kind, EntryKind::Directory);
}

#[tokio::test]
async fn missing_directory_is_classified_as_missing() {
    // Arrange
    let dir = tempdir().unwrap();
    let remote = LocalFs::new(dir.path());

    // Act
    let err = remote.list_dir("/nope").await.unwrap_err();

    // Assert
    assert!(err.is_missing());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn read_range_returns_requested_slice() {
    // Arrange
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("log.csv"), "0123456789").unwrap();
    let remote = LocalFs::new(dir.path());

    // Act
    let middle = remote.read_range("/log.csv", 3, 4).await.unwrap();
    let tail = remote.read_range("/log.csv", 8, 100).await.unwrap();
    let past_end = remote.read_range("/log.csv", 20, 5).await.unwrap();

    // Assert
    assert_eq!(middle, b"3456");
    assert_eq!(tail, b"89");
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn stat_reports_size() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("log.csv"), "hello").unwrap();
    let remote = LocalFs::new(dir.path());

    assert_eq!(remote.stat("//log.csv").await.unwrap().size, 5);
}

#[tokio::test]
async fn parent_segments_cannot_escape_root() {
    let dir = tempdir().unwrap();
    let remote = LocalFs::new(dir.path().join("inner"));

    let err = remote.stat("/../secret").await.unwrap_err();

    assert!(matches!(err, TransportError::Io { .. }));
}

#[tokio::test]
async fn connector_uses_default_root_per_server() {
    // Arrange
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("7020/deathlogs")).unwrap();
    let connector = LocalConnector::new(Some(dir.path().to_path_buf()));
    let server = ServerConfig::new("7020", vec!["/deathlogs".to_string()]);

    // Act
    let remote = connector.connect(&server).await.unwrap();

    // Assert
    assert!(remote.list_dir("/deathlogs").await.unwrap().is_empty());
}

#[tokio::test]
async fn connector_fails_when_root_is_missing() {
    let dir = tempdir().unwrap();
    let connector = LocalConnector::new(Some(dir.path().join("absent")));
    let server = ServerConfig::new("7020", vec!["/deathlogs".to_string()]);

    let err = connector.connect(&server).await.err().unwrap();

    assert!(matches!(err, TransportError::Connect { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn timeout_wraps_slow_operations() {
    let result: Result<(), TransportError> = with_timeout(Duration::from_millis(10), "read", async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    })
    .await;

    assert!(matches!(result, Err(TransportError::Timeout { .. })));
}
