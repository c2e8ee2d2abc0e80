use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("failed to write store file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot apply to {collection}/{key}: {reason}")]
    Decode {
        collection: String,
        key: String,
        reason: String,
    },
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn decode(
        collection: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Decode {
            collection: collection.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}
