use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Whether a server's one-time historical backfill has finished.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackfillMarker {
    #[serde(default)]
    pub backfill_completed: bool,
    #[serde(default)]
    pub backfill_completed_at: Option<DateTime<Utc>>,
}
