use crate::conf::discover::discover;
use crate::conf::error::ConfigError;
use crate::conf::parse::{parse_entrypoint, parse_servers};
use crate::conf::types::RuntimeConfig;
use crate::conf::validation::{ValidatedConfig, validate_config};
use std::path::{Path, PathBuf};

pub const ENTRYPOINT_FILE: &str = "killfeed.hcl";

pub fn load_config(root: &Path) -> Result<ValidatedConfig, ConfigError> {
    let config = load_runtime_config(root)?;

    //--------------------------------------------------------------------------
    // Semantic validation (aggregate all issues, fail on errors)
    //--------------------------------------------------------------------------
    let report = validate_config(&config);
    if !report.errors.is_empty() {
        return Err(ConfigError::Validation { report });
    }

    Ok(ValidatedConfig { config, report })
}

/// Read and parse without semantic validation. Used by `config check`.
pub fn load_runtime_config(root: &Path) -> Result<RuntimeConfig, ConfigError> {
    //--------------------------------------------------------------------------
    // Hard fail: IO and parsing
    //--------------------------------------------------------------------------
    let entry = parse_entrypoint(&root.join(ENTRYPOINT_FILE))?;

    //--------------------------------------------------------------------------
    // Discover and parse server files (hard fail)
    //--------------------------------------------------------------------------
    let mut servers = Vec::new();
    for path in discover(root, &entry.include.servers)? {
        servers.extend(parse_servers(&path)?);
    }

    let mut store = entry.store;
    store.path = resolve_relative(root, &store.path);

    let mut logging = entry.logging;
    logging.directory = logging.directory.map(|d| resolve_relative(root, &d));

    let mut transport = entry.transport;
    transport.local_root = transport.local_root.map(|d| resolve_relative(root, &d));

    for server in &mut servers {
        server.local_root = server.local_root.take().map(|d| resolve_relative(root, &d));
    }

    Ok(RuntimeConfig {
        root: root.to_path_buf(),
        engine: entry.engine,
        discovery: entry.discovery,
        store,
        logging,
        identity: entry.identity,
        transport,
        servers,
    })
}

fn resolve_relative(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
