use crate::cli::open_store;
use crate::conf::RuntimeConfig;
use crate::cursor::PositionTracker;
use crate::identity::{IdentityHints, builtin_known_servers, resolve};
use anyhow::{Result, bail};

/// Clear every cursor of one server, and optionally its backfill marker.
pub async fn reset(cfg: &RuntimeConfig, server_id: &str, backfill: bool) -> Result<()> {
    let Some(server) = cfg.server(server_id) else {
        bail!("server {server_id} is not configured in {}", cfg.root.display());
    };

    let known = builtin_known_servers().merged_with(&cfg.identity.known_servers);
    let hints = IdentityHints {
        hostname: server.hostname.as_deref(),
        server_name: server.name.as_deref(),
        guild_id: server.guild_id.as_deref(),
    };
    let identity = resolve(&server.id, &hints, &known);

    let store = open_store(cfg).await?;
    let tracker = PositionTracker::new(store);

    let cleared = tracker.reset_server(&identity.canonical).await?;
    let backfill_cleared = if backfill {
        tracker.clear_backfill(&identity.canonical).await?
    } else {
        false
    };

    tracing::info!(
        server_id = %identity.canonical,
        raw_id = %identity.raw,
        cursors = cleared,
        backfill_cleared,
        "server reset by operator"
    );
    println!(
        "✔ cleared {cleared} cursors for server {}{}",
        identity.canonical,
        if backfill_cleared {
            " and its backfill marker"
        } else {
            ""
        }
    );
    Ok(())
}
