use crate::record::error::ParseError;
use crate::record::event::{KillEvent, Participant};
use crate::record::timestamp::parse_timestamp_prefix;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Timestamp through victim platform.
pub const MIN_FIELDS: usize = 9;

/// Parse one record line.
pub fn parse_line(line: &str, delimiter: char) -> Result<KillEvent, ParseError> {
    let fields: SmallVec<[&str; 12]> = line.split(delimiter).map(str::trim).collect();

    if fields.len() < MIN_FIELDS {
        return Err(ParseError::ShortRecord {
            found: fields.len(),
            expected: MIN_FIELDS,
        });
    }

    let timestamp =
        parse_timestamp_prefix(fields[0]).ok_or_else(|| ParseError::BadTimestamp {
            value: fields[0].to_string(),
        })?;

    if fields[2].is_empty() {
        return Err(ParseError::MissingIdentifier { role: "killer" });
    }
    if fields[4].is_empty() {
        return Err(ParseError::MissingIdentifier { role: "victim" });
    }

    // Telemetry is best effort.
    let distance = fields[6]
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .unwrap_or(0.0);

    Ok(KillEvent {
        timestamp,
        killer: Participant {
            id: fields[2].to_string(),
            name: fields[1].to_string(),
            platform: fields[7].to_string(),
        },
        victim: Participant {
            id: fields[4].to_string(),
            name: fields[3].to_string(),
            platform: fields[8].to_string(),
        },
        weapon: fields[5].to_string(),
        distance,
    })
}

/// Events parsed from a block of lines plus what had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub events: Vec<KillEvent>,
    pub skipped: usize,
    pub errors_by_kind: BTreeMap<&'static str, usize>,
}

/// Parse every line of `text`. Malformed lines are counted, blank ones ignored.
pub fn parse_batch(text: &str, delimiter: char) -> ParsedBatch {
    let mut batch = ParsedBatch::default();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line, delimiter) {
            Ok(event) => batch.events.push(event),
            Err(err) => {
                tracing::debug!(line = index + 1, kind = err.kind(), error = %err, "skipping malformed record");
                batch.skipped += 1;
                *batch.errors_by_kind.entry(err.kind()).or_insert(0) += 1;
            }
        }
    }

    batch
}
