use crate::record::KillEvent;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

#[derive(Debug)]
pub(crate) struct PlayerDelta {
    pub name: String,
    pub aliases: Vec<String>,
    pub kills: i64,
    pub deaths: i64,
    pub suicides: i64,
    pub weapons: AHashMap<String, i64>,
    pub longest_kill: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl PlayerDelta {
    fn new(at: DateTime<Utc>) -> Self {
        Self {
            name: String::new(),
            aliases: Vec::new(),
            kills: 0,
            deaths: 0,
            suicides: 0,
            weapons: AHashMap::new(),
            longest_kill: 0.0,
            first_seen: at,
            last_seen: at,
        }
    }

    fn seen(&mut self, name: &str, at: DateTime<Utc>) {
        self.first_seen = self.first_seen.min(at);
        if at >= self.last_seen {
            self.last_seen = at;
            if !name.is_empty() {
                self.name = name.to_string();
            }
        }
        if self.name.is_empty() && !name.is_empty() {
            self.name = name.to_string();
        }
        if !name.is_empty() && !self.aliases.iter().any(|a| a == name) {
            self.aliases.push(name.to_string());
        }
    }
}

#[derive(Debug)]
pub(crate) struct RivalryDelta {
    pub player_a: String,
    pub player_b: String,
    pub a_kills: i64,
    pub b_kills: i64,
    pub first_event_at: DateTime<Utc>,
    pub last_event_at: DateTime<Utc>,
    pub last_killer_id: String,
    pub last_weapon: String,
}

/// One batch reduced to a single write per player and per pair.
#[derive(Debug, Default)]
pub(crate) struct BatchFold {
    pub players: AHashMap<String, PlayerDelta>,
    pub rivalries: AHashMap<(String, String), RivalryDelta>,
}

impl BatchFold {
    pub fn from_events(events: &[KillEvent]) -> Self {
        let mut fold = Self::default();
        for event in events {
            fold.add(event);
        }
        fold
    }

    fn player(&mut self, id: &str, at: DateTime<Utc>) -> &mut PlayerDelta {
        self.players
            .entry(id.to_string())
            .or_insert_with(|| PlayerDelta::new(at))
    }

    fn add(&mut self, event: &KillEvent) {
        let at = event.timestamp;

        if event.is_suicide() {
            let player = self.player(&event.killer.id, at);
            player.seen(&event.killer.name, at);
            player.kills += 1;
            player.deaths += 1;
            player.suicides += 1;
            return;
        }

        let weapon = weapon_key(&event.weapon);

        let killer = self.player(&event.killer.id, at);
        killer.seen(&event.killer.name, at);
        killer.kills += 1;
        *killer.weapons.entry(weapon).or_insert(0) += 1;
        if event.distance > killer.longest_kill {
            killer.longest_kill = event.distance;
        }

        let victim = self.player(&event.victim.id, at);
        victim.seen(&event.victim.name, at);
        victim.deaths += 1;

        let (a, b) = ordered_pair(&event.killer.id, &event.victim.id);
        let killer_is_a = a == event.killer.id;
        let rivalry = self
            .rivalries
            .entry((a.to_string(), b.to_string()))
            .or_insert_with(|| RivalryDelta {
                player_a: a.to_string(),
                player_b: b.to_string(),
                a_kills: 0,
                b_kills: 0,
                first_event_at: at,
                last_event_at: at,
                last_killer_id: String::new(),
                last_weapon: String::new(),
            });

        if killer_is_a {
            rivalry.a_kills += 1;
        } else {
            rivalry.b_kills += 1;
        }
        rivalry.first_event_at = rivalry.first_event_at.min(at);
        if at >= rivalry.last_event_at || rivalry.last_killer_id.is_empty() {
            rivalry.last_event_at = rivalry.last_event_at.max(at);
            rivalry.last_killer_id = event.killer.id.clone();
            rivalry.last_weapon = event.weapon.clone();
        }
    }
}

/// Order two player ids, numerically when both are numeric.
pub(crate) fn ordered_pair<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| x.cmp(y)),
        _ => x.cmp(y),
    };
    match ordering {
        Ordering::Greater => (y, x),
        _ => (x, y),
    }
}

/// Weapon names become document field names; dots would split the path.
pub(crate) fn weapon_key(weapon: &str) -> String {
    let trimmed = weapon.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    trimmed.replace('.', "_")
}
