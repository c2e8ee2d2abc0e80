use crate::remote::error::TransportError;
use crate::remote::fs::{DirEntry, FileStat, RemoteFs};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Bound a remote operation; an elapsed deadline becomes `TransportError::Timeout`.
pub async fn with_timeout<T, F>(after: Duration, op: &str, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout {
            op: op.to_string(),
            after,
        }),
    }
}

/// Wraps a [`RemoteFs`] so that every call is bounded by the same deadline.
pub struct TimeoutFs {
    inner: Box<dyn RemoteFs>,
    after: Duration,
}

impl TimeoutFs {
    pub fn new(inner: Box<dyn RemoteFs>, after: Duration) -> Self {
        Self { inner, after }
    }
}

#[async_trait]
impl RemoteFs for TimeoutFs {
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, TransportError> {
        with_timeout(self.after, "list_dir", self.inner.list_dir(path)).await
    }

    async fn stat(&self, path: &str) -> Result<FileStat, TransportError> {
        with_timeout(self.after, "stat", self.inner.stat(path)).await
    }

    async fn read_range(
        &self,
        path: &str,
        offset: u64,
        len: u64,
    ) -> Result<Vec<u8>, TransportError> {
        with_timeout(self.after, "read_range", self.inner.read_range(path, offset, len)).await
    }
}
