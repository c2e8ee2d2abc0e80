//! Per-file read positions and the per-server backfill marker.
//!
//! A cursor only moves forward, and only after the events read below it have
//! been aggregated.

mod error;
mod marker;
mod tracker;


pub use error::CursorError;
pub use marker::BackfillMarker;
pub use tracker::{FileCursor, PositionTracker, cursor_key};
