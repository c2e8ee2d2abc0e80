use crate::conf::error::ConfigError;
use crate::conf::types::{EntrypointConfig, ServerConfig, ServersFile};
use std::fs;
use std::path::Path;

pub fn parse_entrypoint(path: &Path) -> Result<EntrypointConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    hcl::from_str(&s).map_err(|e| ConfigError::parse(path, e))
}

pub fn parse_servers(path: &Path) -> Result<Vec<ServerConfig>, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let parsed: ServersFile = hcl::from_str(&s).map_err(|e| ConfigError::parse(path, e))?;

    //-------------------------------------------------------------------------
    // Inject origin metadata
    //-------------------------------------------------------------------------
    Ok(parsed
        .servers
        .into_iter()
        .map(|mut server| {
            server.origin = path.to_path_buf();
            server
        })
        .collect())
}
