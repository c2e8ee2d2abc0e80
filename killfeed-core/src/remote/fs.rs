use crate::conf::types::ServerConfig;
use crate::remote::error::TransportError;
use async_trait::async_trait;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FileStat {
    pub size: u64,
}

/// The three primitives the engine needs from a game-server host.
///
/// Paths are absolute, `/`-separated remote paths.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, TransportError>;

    async fn stat(&self, path: &str) -> Result<FileStat, TransportError>;

    /// Read at most `len` bytes starting at `offset`. A short read means end of file.
    async fn read_range(&self, path: &str, offset: u64, len: u64)
    -> Result<Vec<u8>, TransportError>;
}

/// Opens a [`RemoteFs`] session for one configured server.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, server: &ServerConfig) -> Result<Box<dyn RemoteFs>, TransportError>;
}
