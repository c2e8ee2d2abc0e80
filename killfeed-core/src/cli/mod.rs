pub mod config;
pub mod reset;
pub mod resolve;
pub mod run;

use crate::conf::RuntimeConfig;
use crate::remote::LocalConnector;
use crate::store::FileStore;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Open the durable store named by the configuration.
pub async fn open_store(config: &RuntimeConfig) -> Result<Arc<FileStore>> {
    let store = FileStore::open(config.store.path.clone())
        .await
        .with_context(|| format!("failed to open store {}", config.store.path.display()))?;
    Ok(Arc::new(store))
}

pub fn connector(config: &RuntimeConfig) -> Arc<LocalConnector> {
    Arc::new(LocalConnector::new(config.transport.local_root.clone()))
}
