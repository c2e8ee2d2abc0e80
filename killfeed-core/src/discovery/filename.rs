use crate::record::TIMESTAMP_FORMAT;
use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static LOG_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}\.\d{2}\.\d{2}-\d{2}\.\d{2}\.\d{2})\.[^./\\]+$").expect("static regex")
});

/// Parse `YYYY.MM.DD-hh.mm.ss.<ext>` into the instant it names.
pub fn parse_log_filename(name: &str) -> Option<DateTime<Utc>> {
    let caps = LOG_FILENAME.captures(name)?;
    NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
