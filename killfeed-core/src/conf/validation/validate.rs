use crate::conf::loader::ENTRYPOINT_FILE;
use crate::conf::types::{DiscoveryConfig, EngineConfig, RuntimeConfig, ServerConfig};
use crate::conf::validation::report::{Origin, ValidationReport};
use crate::identity::{IdentityHints, KnownServers, Provenance, builtin_known_servers, resolve};
use std::collections::HashMap;

/// Validate everything that exists in a fully parsed config.
pub fn validate_config(config: &RuntimeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    let entry = config.root.join(ENTRYPOINT_FILE);

    validate_engine(&config.engine, &Origin::new(&entry, "engine"), &mut report);
    validate_discovery(
        &config.discovery,
        &Origin::new(&entry, "discovery"),
        &mut report,
    );

    let known = builtin_known_servers().merged_with(&config.identity.known_servers);
    validate_servers(&config.servers, &known, &mut report);

    report
}

fn validate_engine(engine: &EngineConfig, origin: &Origin, report: &mut ValidationReport) {
    if engine.lookback_days == 0 {
        report.zero_days("lookback_days", origin);
    }
    if engine.backfill_days == 0 {
        report.zero_days("backfill_days", origin);
    }
    if engine.io_timeout_secs == 0 {
        report.zero_value("io_timeout_secs", origin);
    }
    if engine.read_concurrency == 0 {
        report.zero_value("read_concurrency", origin);
    }
    if engine.read_chunk_bytes == 0 {
        report.zero_value("read_chunk_bytes", origin);
    }
    if engine.delimiter.chars().count() != 1 {
        report.invalid_delimiter(&engine.delimiter, origin);
    }
    if engine.backfill_days > 0 && engine.backfill_days < engine.lookback_days {
        report.backfill_shorter_than_lookback(engine.backfill_days, engine.lookback_days, origin);
    }
}

fn validate_discovery(discovery: &DiscoveryConfig, origin: &Origin, report: &mut ValidationReport) {
    if discovery.map_prefix.is_empty() {
        report.empty_map_prefix(origin);
    }
    if discovery.map_min > 9 {
        report.map_bound_not_a_digit("map_min", discovery.map_min, origin);
    }
    if discovery.map_max > 9 {
        report.map_bound_not_a_digit("map_max", discovery.map_max, origin);
    }
    if discovery.map_min > discovery.map_max {
        report.map_range_inverted(discovery.map_min, discovery.map_max, origin);
    }
}

fn validate_servers(servers: &[ServerConfig], known: &dyn KnownServers, report: &mut ValidationReport) {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for server in servers {
        let label = server.host_label();
        let origin = Origin::new(&server.origin, format!("servers[{label}]"));

        if server.roots.iter().all(|r| r.trim().is_empty()) {
            report.server_has_no_roots(label, &origin);
        }

        let hints = IdentityHints {
            hostname: server.hostname.as_deref(),
            server_name: server.name.as_deref(),
            guild_id: server.guild_id.as_deref(),
        };
        let identity = resolve(&server.id, &hints, known);

        // Without an id only the hostname can name the server.
        if identity.canonical.is_empty() {
            report.empty_server_id(&origin);
            continue;
        }
        if identity.provenance == Provenance::Unresolved {
            report.unresolved_server_identity(&server.id, &origin);
        }
        if seen.insert(identity.canonical.clone(), label).is_some() {
            report.duplicate_canonical_id(label, &identity.canonical, &origin);
        }
    }
}
