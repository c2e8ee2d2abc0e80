use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One game server whose killfeed logs are ingested.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(skip)]
    pub origin: PathBuf,

    /// Raw server id, numeric or UUID-like. May be empty when `hostname`
    /// ends in the numeric id.
    #[serde(default)]
    pub id: String,

    pub hostname: Option<String>,
    pub name: Option<String>,
    pub guild_id: Option<String>,

    /// Remote directories holding the timestamped log files.
    #[serde(default)]
    pub roots: Vec<String>,

    /// Local mirror of this server's file tree, overriding the transport default.
    pub local_root: Option<PathBuf>,
}

impl ServerConfig {
    pub fn new(id: impl Into<String>, roots: Vec<String>) -> Self {
        Self {
            origin: PathBuf::new(),
            id: id.into(),
            hostname: None,
            name: None,
            guild_id: None,
            roots,
            local_root: None,
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_local_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_root = Some(root.into());
        self
    }

    /// Key used for per-host connection limits.
    pub fn host_label(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.id)
    }
}

/// Shape of a file matched by `include.servers`.
#[derive(Debug, Default, Deserialize)]
pub struct ServersFile {
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}
