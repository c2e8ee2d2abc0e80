use crate::identity::Provenance;
use crate::ingest::error::FileError;
use crate::ingest::mode::IngestMode;
use serde::Serialize;

/// A file left for a later run, cursor unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct DeferredFile {
    pub path: String,
    pub error: String,
    pub retryable: bool,
}

impl DeferredFile {
    pub(crate) fn new(path: &str, error: &FileError) -> Self {
        Self {
            path: path.to_string(),
            error: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// Outcome of one server run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Canonical id the run aggregated under.
    pub server_id: String,
    pub raw_server_id: String,
    pub provenance: Provenance,
    pub mode: IngestMode,
    /// Files returned by discovery before the time window was applied.
    pub files_discovered: usize,
    pub files_in_window: usize,
    /// Files whose cursor advanced or that had nothing new to read.
    pub files_processed: usize,
    /// Files in the window that disappeared before they could be read.
    pub files_vanished: usize,
    pub events_imported: usize,
    pub lines_skipped: usize,
    pub deferred: Vec<DeferredFile>,
    pub cancelled: bool,
    /// Set when this run completed the server's historical backfill.
    pub backfill_completed: bool,
}

impl RunReport {
    pub(crate) fn new(
        server_id: String,
        raw_server_id: String,
        provenance: Provenance,
        mode: IngestMode,
    ) -> Self {
        Self {
            server_id,
            raw_server_id,
            provenance,
            mode,
            files_discovered: 0,
            files_in_window: 0,
            files_processed: 0,
            files_vanished: 0,
            events_imported: 0,
            lines_skipped: 0,
            deferred: Vec::new(),
            cancelled: false,
            backfill_completed: false,
        }
    }

    /// Every file in the window advanced, was already current or is gone.
    pub fn is_complete(&self) -> bool {
        !self.cancelled
            && self.deferred.is_empty()
            && self.files_processed + self.files_vanished == self.files_in_window
    }
}
