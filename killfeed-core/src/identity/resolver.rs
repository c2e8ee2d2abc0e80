use crate::identity::table::KnownServers;
use serde::Serialize;
use std::fmt;

/// Derived ids are reduced modulo this value.
pub const DERIVED_ID_MODULUS: u64 = 10_000;

/// Derived ids never fall below this bound, keeping them clear of reserved low ids.
pub const DERIVED_ID_MIN: u64 = 1_000;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Native,
    KnownMapping,
    Derived,
    DerivedFromHostname,
    Unresolved,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Provenance::Native => "native",
            Provenance::KnownMapping => "known-mapping",
            Provenance::Derived => "derived",
            Provenance::DerivedFromHostname => "derived-from-hostname",
            Provenance::Unresolved => "unresolved",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ServerIdentity {
    pub raw: String,
    pub canonical: String,
    pub provenance: Provenance,
}

/// Optional inputs the fallback chain may use.
///
/// Only `hostname` participates in resolution today; `server_name` and
/// `guild_id` are carried so callers can log them next to the outcome.
#[derive(Debug, Clone, Default)]
pub struct IdentityHints<'a> {
    pub hostname: Option<&'a str>,
    pub server_name: Option<&'a str>,
    pub guild_id: Option<&'a str>,
}

/// Resolve a raw server identifier to its canonical numeric id.
///
/// The chain is, in order: already numeric, known migration, derived from the
/// leading hexadecimal segment, trailing digits of the hostname, passthrough.
/// Resolution never fails; the worst case is `Provenance::Unresolved`.
pub fn resolve(raw_id: &str, hints: &IdentityHints<'_>, known: &dyn KnownServers) -> ServerIdentity {
    let raw = raw_id.trim();

    let (canonical, provenance) = if is_numeric(raw) {
        (raw.to_string(), Provenance::Native)
    } else if let Some(mapped) = known.lookup(raw) {
        (mapped, Provenance::KnownMapping)
    } else if let Some(derived) = derive_from_leading_segment(raw) {
        (derived.to_string(), Provenance::Derived)
    } else if let Some(digits) = hints.hostname.and_then(last_digit_run) {
        (digits.to_string(), Provenance::DerivedFromHostname)
    } else {
        (raw.to_string(), Provenance::Unresolved)
    };

    tracing::debug!(
        raw_id = raw,
        canonical = %canonical,
        provenance = %provenance,
        hostname = hints.hostname,
        server_name = hints.server_name,
        guild_id = hints.guild_id,
        "server identity resolved"
    );

    ServerIdentity {
        raw: raw.to_string(),
        canonical,
        provenance,
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Interpret the first hyphen-delimited segment as base-16 and fold it into range.
fn derive_from_leading_segment(raw: &str) -> Option<u64> {
    let segment = raw.split('-').next()?;
    if segment.is_empty() {
        return None;
    }

    // Fold digit by digit so arbitrarily long segments never overflow.
    let mut value: u64 = 0;
    for c in segment.chars() {
        let digit = c.to_digit(16)? as u64;
        value = (value * 16 + digit) % DERIVED_ID_MODULUS;
    }

    Some(value.max(DERIVED_ID_MIN))
}

fn last_digit_run(hostname: &str) -> Option<&str> {
    let bytes = hostname.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    Some(&hostname[start..end])
}
