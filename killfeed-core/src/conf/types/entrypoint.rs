use crate::conf::types::{
    DiscoveryConfig, EngineConfig, IdentityConfig, LoggingConfig, StoreConfig, TransportConfig,
};
use serde::Deserialize;

/// Represents the top-level `killfeed.hcl` file.
#[derive(Debug, Default, Deserialize)]
pub struct EntrypointConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub include: IncludeConfig,
}

/// Represents the include section of the top-level config file.
#[derive(Debug, Deserialize)]
pub struct IncludeConfig {
    /// Glob, relative to the config root, of per-server files.
    pub servers: String,
}

impl Default for IncludeConfig {
    fn default() -> Self {
        Self {
            servers: "servers/*.hcl".to_string(),
        }
    }
}
