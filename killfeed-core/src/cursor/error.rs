use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("refusing to move cursor for {path} on {server_id} back from {current} to {requested}")]
    Rewind {
        server_id: String,
        path: String,
        current: u64,
        requested: u64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
