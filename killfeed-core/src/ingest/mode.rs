use crate::cursor::BackfillMarker;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngestMode {
    /// One pass over the whole backfill window.
    HistoricalBackfill,
    /// Steady state: only new bytes inside the lookback window.
    IncrementalTail,
}

impl IngestMode {
    /// A server tails once its backfill has completed, and backfills until then.
    pub fn for_marker(marker: &BackfillMarker) -> Self {
        if marker.backfill_completed {
            IngestMode::IncrementalTail
        } else {
            IngestMode::HistoricalBackfill
        }
    }
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IngestMode::HistoricalBackfill => "historical-backfill",
            IngestMode::IncrementalTail => "incremental-tail",
        };
        f.write_str(label)
    }
}
