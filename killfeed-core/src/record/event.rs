use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub platform: String,
}

/// One kill as written by the game server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillEvent {
    pub timestamp: DateTime<Utc>,
    pub killer: Participant,
    pub victim: Participant,
    pub weapon: String,
    /// Meters. Zero when the server did not report a usable value.
    pub distance: f64,
}

impl KillEvent {
    pub fn is_suicide(&self) -> bool {
        self.killer.id == self.victim.id
    }
}
