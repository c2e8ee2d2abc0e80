//! Directory discovery.
//!
//! Walks a server's log roots, entering only per-map subdirectories, and
//! returns every timestamp-named log file in chronological order.

mod filename;
mod pattern;
mod walk;

#[cfg(test)]
mod tests;

pub use filename::parse_log_filename;
pub use pattern::MapDirPattern;
pub use walk::{LogFile, discover};
