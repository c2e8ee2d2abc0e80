use crate::conf::load_runtime_config;
use crate::identity::{IdentityHints, ServerIdentity, builtin_known_servers, resolve as resolve_identity};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Print how `raw` resolves, as JSON.
///
/// With `config`, the config's `identity.known_servers` extends the built-in table.
pub fn resolve(raw: &str, hostname: Option<&str>, config: Option<&Path>) -> Result<()> {
    let extra = match config {
        Some(path) => {
            load_runtime_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
                .identity
                .known_servers
        }
        None => HashMap::new(),
    };

    let identity = identify(raw, hostname, &extra);
    println!("{}", serde_json::to_string_pretty(&identity)?);
    Ok(())
}

pub(crate) fn identify(raw: &str, hostname: Option<&str>, extra: &HashMap<String, String>) -> ServerIdentity {
    let known = builtin_known_servers().merged_with(extra);
    let hints = IdentityHints {
        hostname,
        ..Default::default()
    };
    resolve_identity(raw, &hints, &known)
}
