//! Remote file primitives.
//!
//! The engine only ever needs three operations on a game-server host: list a
//! directory, stat a file and read a byte range. Everything transport specific
//! lives behind [`RemoteFs`], and a connection is obtained through a
//! [`Connector`] under a per-host [`HostLimiter`] slot.

mod error;
mod fs;
mod guard;
mod limit;
mod local;
mod path;
mod timeout;

#[cfg(test)]
mod tests;

pub use error::TransportError;
pub use fs::{Connector, DirEntry, EntryKind, FileStat, RemoteFs};
pub use guard::ConnectionGuard;
pub use limit::HostLimiter;
pub use local::{LocalConnector, LocalFs};
pub use path::{join_path, normalize_path};
pub use timeout::{TimeoutFs, with_timeout};
