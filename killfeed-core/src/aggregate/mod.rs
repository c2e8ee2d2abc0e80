//! Folding kill events into per-player and per-rivalry statistics.

mod aggregator;
mod fold;
mod views;

#[cfg(test)]
mod tests;

pub use aggregator::EventAggregator;
pub use views::{PlayerStat, Rivalry, player_key, rivalry_key};
