use crate::discovery::{MapDirPattern, discover};
use crate::remote::{DirEntry, FileStat, LocalFs, RemoteFs, TransportError};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn pattern() -> MapDirPattern {
    MapDirPattern::new("world", 0, 2).unwrap()
}

fn touch(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn roots(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn finds_files_in_root_and_map_directories_sorted_by_timestamp() {
    // Arrange
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(root, "deathlogs/2025.05.09-12.00.00.csv", "a");
    touch(root, "deathlogs/world_0/2025.05.09-10.00.00.csv", "bb");
    touch(root, "deathlogs/WORLD_2/2025.05.09-11.00.00.csv", "ccc");
    touch(root, "deathlogs/world_3/2025.05.09-09.00.00.csv", "");
    touch(root, "deathlogs/level_0/2025.05.09-09.00.00.csv", "");
    touch(root, "deathlogs/readme.txt", "");
    let remote = LocalFs::new(root);

    // Act
    let files = discover(&remote, "7020", &roots(&["/deathlogs"]), &pattern(), 2)
        .await
        .unwrap();

    // Assert
    let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/deathlogs/world_0/2025.05.09-10.00.00.csv",
            "/deathlogs/WORLD_2/2025.05.09-11.00.00.csv",
            "/deathlogs/2025.05.09-12.00.00.csv",
        ]
    );
    assert_eq!(files[0].size, 2);
    assert_eq!(files[0].server_id, "7020");
}

#[tokio::test]
async fn depth_limit_stops_recursion() {
    // Arrange
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(root, "logs/world_0/2025.05.09-10.00.00.csv", "");
    touch(root, "logs/world_0/world_1/2025.05.09-11.00.00.csv", "");
    let remote = LocalFs::new(root);

    // Act
    let files = discover(&remote, "7020", &roots(&["/logs"]), &pattern(), 1)
        .await
        .unwrap();

    // Assert
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "/logs/world_0/2025.05.09-10.00.00.csv");
}

#[tokio::test]
async fn overlapping_roots_are_deduplicated() {
    // Arrange
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(root, "logs/2025.05.09-10.00.00.csv", "");
    let remote = LocalFs::new(root);

    // Act
    let files = discover(&remote, "7020", &roots(&["/logs", "//logs/", "\\logs"]), &pattern(), 2)
        .await
        .unwrap();

    // Assert
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn missing_root_yields_nothing() {
    // Arrange
    let dir = tempdir().unwrap();
    let remote = LocalFs::new(dir.path());

    // Act
    let files = discover(&remote, "7020", &roots(&["/nope"]), &pattern(), 2)
        .await
        .unwrap();

    // Assert
    assert!(files.is_empty());
}

struct Unreachable;

#[async_trait]
impl RemoteFs for Unreachable {
    async fn list_dir(&self, _path: &str) -> Result<Vec<DirEntry>, TransportError> {
        Err(TransportError::Connect {
            host: "10.0.0.1".to_string(),
            reason: "connection refused".to_string(),
        })
    }

    async fn stat(&self, path: &str) -> Result<FileStat, TransportError> {
        Err(TransportError::NotFound {
            path: path.to_string(),
        })
    }

    async fn read_range(&self, path: &str, _: u64, _: u64) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::NotFound {
            path: path.to_string(),
        })
    }
}

#[tokio::test]
async fn connection_failure_is_propagated() {
    // Act
    let result = discover(&Unreachable, "7020", &roots(&["/logs"]), &pattern(), 2).await;

    // Assert
    assert!(matches!(result, Err(TransportError::Connect { .. })));
}
