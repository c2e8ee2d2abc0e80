use crate::aggregate::fold::ordered_pair;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

pub fn player_key(server_id: &str, player_id: &str) -> String {
    format!("{server_id}|{player_id}")
}

/// Key of the rivalry between two players, in either argument order.
pub fn rivalry_key(server_id: &str, x: &str, y: &str) -> String {
    let (a, b) = ordered_pair(x, y);
    format!("{server_id}|{a}|{b}")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerStat {
    pub server_id: String,
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub known_aliases: Vec<String>,
    #[serde(default)]
    pub kills: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub suicides: u64,
    #[serde(default)]
    pub weapons: BTreeMap<String, u64>,
    #[serde(default)]
    pub longest_kill: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl PlayerStat {
    pub fn kd_ratio(&self) -> f64 {
        if self.deaths == 0 {
            self.kills as f64
        } else {
            self.kills as f64 / self.deaths as f64
        }
    }
}

/// Kills between two players. `a_kills` counts A killing B.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rivalry {
    pub server_id: String,
    pub player_a: String,
    pub player_b: String,
    #[serde(default)]
    pub a_kills: u64,
    #[serde(default)]
    pub b_kills: u64,
    pub last_event_at: DateTime<Utc>,
    pub last_killer_id: String,
    pub last_weapon: String,
    pub created_at: DateTime<Utc>,
}

impl Rivalry {
    /// Kills by `player_id` against the other side.
    pub fn kills_by(&self, player_id: &str) -> u64 {
        if player_id == self.player_a {
            self.a_kills
        } else if player_id == self.player_b {
            self.b_kills
        } else {
            0
        }
    }
}
