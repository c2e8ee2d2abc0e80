use crate::conf::types::ServerConfig;
use crate::remote::error::TransportError;
use crate::remote::fs::{Connector, DirEntry, EntryKind, FileStat, RemoteFs};
use crate::remote::path::normalize_path;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// A [`RemoteFs`] over a local directory that mirrors the host's file tree
/// (an SFTP mount, a synced share, or a test fixture).
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a remote path onto the local root. `..` may not climb out of it.
    fn resolve(&self, remote: &str) -> Result<PathBuf, TransportError> {
        let normalized = normalize_path(remote);
        let mut local = self.root.clone();

        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." {
                return Err(TransportError::Io {
                    path: remote.to_string(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "path escapes root"),
                });
            }
            local.push(segment);
        }

        Ok(local)
    }
}

#[async_trait]
impl RemoteFs for LocalFs {
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, TransportError> {
        let local = self.resolve(path)?;
        let mut reader = fs::read_dir(&local)
            .await
            .map_err(|e| TransportError::io(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| TransportError::io(path, e))?
        {
            let Ok(metadata) = entry.metadata().await else {
                // Entry vanished between listing and stat.
                continue;
            };

            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else if metadata.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                size: metadata.len(),
            });
        }

        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<FileStat, TransportError> {
        let local = self.resolve(path)?;
        let metadata = fs::metadata(&local)
            .await
            .map_err(|e| TransportError::io(path, e))?;

        Ok(FileStat {
            size: metadata.len(),
        })
    }

    async fn read_range(
        &self,
        path: &str,
        offset: u64,
        len: u64,
    ) -> Result<Vec<u8>, TransportError> {
        let local = self.resolve(path)?;
        let mut file = fs::File::open(&local)
            .await
            .map_err(|e| TransportError::io(path, e))?;

        file.seek(io::SeekFrom::Start(offset))
            .await
            .map_err(|e| TransportError::io(path, e))?;

        let mut buffer = Vec::with_capacity(len.min(8 * 1024 * 1024) as usize);
        file.take(len)
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| TransportError::io(path, e))?;

        Ok(buffer)
    }
}

/// Connects each server to its `local_root`, or to `<default_root>/<server id>`.
#[derive(Debug, Clone, Default)]
pub struct LocalConnector {
    default_root: Option<PathBuf>,
}

impl LocalConnector {
    pub fn new(default_root: Option<PathBuf>) -> Self {
        Self { default_root }
    }
}

#[async_trait]
impl Connector for LocalConnector {
    async fn connect(&self, server: &ServerConfig) -> Result<Box<dyn RemoteFs>, TransportError> {
        let root = match (&server.local_root, &self.default_root) {
            (Some(root), _) => root.clone(),
            (None, Some(base)) => base.join(&server.id),
            (None, None) => {
                return Err(TransportError::Connect {
                    host: server.host_label().to_string(),
                    reason: "no local root configured".to_string(),
                });
            }
        };

        // An absent mount is a connection failure, not an empty server.
        if !fs::try_exists(&root).await.unwrap_or(false) {
            return Err(TransportError::Connect {
                host: server.host_label().to_string(),
                reason: format!("local root {} is not available", root.display()),
            });
        }

        tracing::debug!(server_id = %server.id, root = %root.display(), "local connection opened");
        Ok(Box::new(LocalFs::new(root)))
    }
}
