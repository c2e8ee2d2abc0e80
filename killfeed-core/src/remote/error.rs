use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    // Missing paths
    #[error("remote path not found: {path}")]
    NotFound { path: String },

    #[error("permission denied reading {path}")]
    PermissionDenied { path: String },

    // Connection
    #[error("failed to connect to {host}: {reason}")]
    Connect { host: String, reason: String },

    #[error("authentication rejected by {host}")]
    Auth { host: String },

    #[error("no free connection slot for {host}")]
    PoolExhausted { host: String },

    // Operations
    #[error("{op} timed out after {after:?}")]
    Timeout { op: String, after: Duration },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// Map an io error on `path` into the transport taxonomy.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// A missing or unreadable path is an empty result, never a failure.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::PermissionDenied { .. })
    }

    /// Everything else is retried by the caller on a later run.
    pub fn is_retryable(&self) -> bool {
        !self.is_missing()
    }

    /// The host itself could not be reached or answered too slowly.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Auth { .. } | Self::PoolExhausted { .. } | Self::Timeout { .. }
        )
    }
}
