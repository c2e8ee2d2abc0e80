use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// `YYYY.MM.DD-hh.mm.ss`, shared by file names and record lines.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d-%H.%M.%S";

static TIMESTAMP_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}\.\d{2}\.\d{2}-\d{2}\.\d{2}\.\d{2}").expect("static regex")
});

/// Parse the zero-padded timestamp at the very start of `s`.
///
/// Returns `None` when the prefix is missing or names an impossible instant
/// such as month 13.
pub fn parse_timestamp_prefix(s: &str) -> Option<DateTime<Utc>> {
    let m = TIMESTAMP_PREFIX.find(s)?;
    NaiveDateTime::parse_from_str(m.as_str(), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
