//! Killfeed record parsing.
//!
//! One line of a log file is one kill:
//!
//! ```text
//! 2025.05.09-11.58.37;Player1;12345;Player2;67890;AK-74;123.45;PC;PC
//! ```
//!
//! Fields are timestamp, killer name, killer id, victim name, victim id,
//! weapon, distance, killer platform and victim platform. Extra trailing
//! fields are ignored.

mod error;
mod event;
mod parse;
mod timestamp;

#[cfg(test)]
mod tests;

pub use error::ParseError;
pub use event::{KillEvent, Participant};
pub use parse::{MIN_FIELDS, ParsedBatch, parse_batch, parse_line};
pub use timestamp::{TIMESTAMP_FORMAT, parse_timestamp_prefix};
