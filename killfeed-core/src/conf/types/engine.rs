use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Ingestion tuning knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Days of history an incremental run looks at.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Days of history a one-time backfill scans.
    #[serde(default = "default_backfill_days")]
    pub backfill_days: u32,

    /// Deadline for every single remote call.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,

    /// Files of one server read concurrently.
    #[serde(default = "default_read_concurrency")]
    pub read_concurrency: usize,

    /// Concurrent connections per host. `0` disables the cap.
    #[serde(default = "default_max_connections_per_host")]
    pub max_connections_per_host: usize,

    /// Upper bound on bytes requested by one `read_range` call.
    #[serde(default = "default_read_chunk_bytes")]
    pub read_chunk_bytes: u64,

    /// Record field separator. Must be a single character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            backfill_days: default_backfill_days(),
            io_timeout_secs: default_io_timeout_secs(),
            read_concurrency: default_read_concurrency(),
            max_connections_per_host: default_max_connections_per_host(),
            read_chunk_bytes: default_read_chunk_bytes(),
            delimiter: default_delimiter(),
        }
    }
}

impl EngineConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }

    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(';')
    }

    pub fn connection_cap(&self) -> Option<usize> {
        (self.max_connections_per_host > 0).then_some(self.max_connections_per_host)
    }
}

fn default_lookback_days() -> u32 {
    1
}

fn default_backfill_days() -> u32 {
    30
}

fn default_io_timeout_secs() -> u64 {
    30
}

fn default_read_concurrency() -> usize {
    4
}

fn default_max_connections_per_host() -> usize {
    2
}

fn default_read_chunk_bytes() -> u64 {
    8 * 1024 * 1024 // 8 MiB
}

fn default_delimiter() -> String {
    ";".to_string()
}

/// Which subdirectories of a log root are walked.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_map_prefix")]
    pub map_prefix: String,

    #[serde(default)]
    pub map_min: u8,

    #[serde(default = "default_map_max")]
    pub map_max: u8,

    /// Directory levels below a root that may be entered.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            map_prefix: default_map_prefix(),
            map_min: 0,
            map_max: default_map_max(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_map_prefix() -> String {
    "world".to_string()
}

fn default_map_max() -> u8 {
    2
}

fn default_max_depth() -> usize {
    2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/killfeed.json")
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// When set, logs are also written to a daily rolling file here.
    pub directory: Option<PathBuf>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Extra `raw id -> canonical id` migrations layered over the built-in table.
    #[serde(default)]
    pub known_servers: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Directory holding one mirrored tree per server id.
    pub local_root: Option<PathBuf>,
}
