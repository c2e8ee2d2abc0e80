//! The ingestion controller.
//!
//! One run of one server goes: resolve identity, connect, discover, then for
//! every file in chronological order read the unread tail, parse it, aggregate
//! the events and only then advance the file's cursor.

mod controller;
mod error;
mod fleet;
mod mode;
mod reader;
mod report;

#[cfg(test)]
mod tests;

pub use controller::IngestController;
pub use error::{FileError, IngestError};
pub use fleet::{ServerRun, run_all};
pub use mode::IngestMode;
pub use report::{DeferredFile, RunReport};
