mod fixture;
pub mod tracing;

pub use fixture::{Fixture, kill_line};
pub use tracing::{CapturedEvent, EventLog, capture_events};
