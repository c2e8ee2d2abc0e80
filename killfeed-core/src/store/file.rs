use crate::store::document::{Document, Filter, Update, WriteOp};
use crate::store::error::StoreError;
use crate::store::memory::{MemoryStore, Snapshot, Undo};
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// A [`MemoryStore`] persisted to a single JSON file.
///
/// Every mutating call rewrites the file through a temporary file in the same
/// directory followed by a rename, so a crash leaves either the old or the new
/// contents on disk. A failed write rolls the in-memory change back.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = parent_dir(&path) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let inner = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => MemoryStore::new(),
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::unavailable(format!("{} is corrupt: {e}", path.display()))
                })?;
                MemoryStore::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => {
                return Err(StoreError::unavailable(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        tracing::info!(path = %path.display(), documents = inner.len(), "document store opened");

        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn commit(&self, undo: Undo) -> Result<(), StoreError> {
        if let Err(e) = self.flush().await {
            self.inner.restore(undo);
            return Err(e);
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&self.inner.snapshot())
            .map_err(|e| self.write_error(io::Error::other(e)))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| self.write_error(io::Error::other(e)))?
            .map_err(|e| self.write_error(e))
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path).unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let dir = parent_dir(&self.path).unwrap_or(Path::new("."));
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::unavailable(format!(
                "{} is not a directory",
                dir.display()
            ))),
            Err(e) => Err(StoreError::unavailable(format!(
                "{} is not accessible: {e}",
                dir.display()
            ))),
        }
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.inner.get_doc(collection, key))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(self.inner.find_docs(collection, filter))
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        update: &Update,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let undo = self.inner.upsert_doc(collection, key, update)?;
        self.commit(undo).await
    }

    async fn apply_batch(&self, writes: &[WriteOp]) -> Result<(), StoreError> {
        if writes.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let undo = self.inner.apply_docs(writes)?;
        self.commit(undo).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        set: &Document,
    ) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let undo = self.inner.update_docs(collection, filter, set)?;
        let count = undo.len();
        if count > 0 {
            self.commit(undo).await?;
        }
        Ok(count)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let undo = self.inner.delete_docs(collection, filter);
        let count = undo.len();
        if count > 0 {
            self.commit(undo).await?;
        }
        Ok(count)
    }
}
