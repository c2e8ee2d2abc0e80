use crate::conf::types::{
    DiscoveryConfig, EngineConfig, IdentityConfig, LoggingConfig, ServerConfig, StoreConfig,
    TransportConfig,
};
use std::path::PathBuf;

/// Fully loaded configuration with paths resolved against the config root.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub engine: EngineConfig,
    pub discovery: DiscoveryConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub identity: IdentityConfig,
    pub transport: TransportConfig,
    pub servers: Vec<ServerConfig>,
}

impl RuntimeConfig {
    pub fn server(&self, id: &str) -> Option<&ServerConfig> {
        self.servers
            .iter()
            .find(|s| s.id == id || (s.id.is_empty() && s.hostname.as_deref() == Some(id)))
    }
}
