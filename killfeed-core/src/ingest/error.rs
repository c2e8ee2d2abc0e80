use crate::cursor::CursorError;
use crate::remote::TransportError;
use crate::store::StoreError;
use thiserror::Error;

/// Failures that abort a whole server run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("document store unavailable: {source}")]
    StoreUnavailable {
        #[source]
        source: StoreError,
    },

    #[error("transport failure for server {server_id}: {source}")]
    Transport {
        server_id: String,
        #[source]
        source: TransportError,
    },

    #[error("store error for server {server_id}: {source}")]
    Store {
        server_id: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid map directory pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("ingestion task for server {server_id} failed: {reason}")]
    Task { server_id: String, reason: String },
}

impl IngestError {
    /// Whether the caller should back off and retry the whole run later.
    pub fn is_retryable(&self) -> bool {
        match self {
            IngestError::Transport { source, .. } => source.is_retryable(),
            IngestError::Store { .. } => true,
            _ => false,
        }
    }
}

/// Failures confined to one file. The file's cursor is left untouched.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error("file shrank to {size} bytes, below its cursor at {cursor}")]
    Truncated { size: u64, cursor: u64 },
}

impl FileError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FileError::Transport(e) => e.is_retryable(),
            FileError::Truncated { .. } => false,
            FileError::Cursor(CursorError::Rewind { .. }) => false,
            _ => true,
        }
    }
}
