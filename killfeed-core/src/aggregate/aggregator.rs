use crate::aggregate::fold::{BatchFold, PlayerDelta, RivalryDelta};
use crate::aggregate::views::{PlayerStat, Rivalry, player_key, rivalry_key};
use crate::record::KillEvent;
use crate::store::{DocumentStore, PLAYERS, RIVALRIES, StoreError, Update, WriteOp, get_typed};
use std::sync::Arc;

/// Applies kill events to the durable player and rivalry documents.
///
/// Updates are plain additions. Each event handed to [`apply`] must be new;
/// the caller guarantees that by advancing file cursors only afterwards.
///
/// [`apply`]: EventAggregator::apply
#[derive(Clone)]
pub struct EventAggregator {
    store: Arc<dyn DocumentStore>,
}

impl EventAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the number of distinct players updated.
    pub async fn apply(&self, server_id: &str, events: &[KillEvent]) -> Result<usize, StoreError> {
        if events.is_empty() {
            return Ok(0);
        }

        let fold = BatchFold::from_events(events);

        // One batch, so a failed rivalry write cannot leave player counts behind.
        let mut writes = Vec::with_capacity(fold.players.len() + fold.rivalries.len());
        for (player_id, delta) in &fold.players {
            writes.push(WriteOp::upsert(
                PLAYERS,
                player_key(server_id, player_id),
                player_update(server_id, player_id, delta),
            ));
        }
        for delta in fold.rivalries.values() {
            writes.push(WriteOp::upsert(
                RIVALRIES,
                rivalry_key(server_id, &delta.player_a, &delta.player_b),
                rivalry_update(server_id, delta),
            ));
        }
        self.store.apply_batch(&writes).await?;

        tracing::debug!(
            server_id,
            events = events.len(),
            players = fold.players.len(),
            rivalries = fold.rivalries.len(),
            "events aggregated"
        );

        Ok(fold.players.len())
    }

    pub async fn player(&self, server_id: &str, player_id: &str) -> Result<Option<PlayerStat>, StoreError> {
        get_typed(self.store.as_ref(), PLAYERS, &player_key(server_id, player_id)).await
    }

    pub async fn rivalry(&self, server_id: &str, x: &str, y: &str) -> Result<Option<Rivalry>, StoreError> {
        get_typed(self.store.as_ref(), RIVALRIES, &rivalry_key(server_id, x, y)).await
    }
}

fn player_update(server_id: &str, player_id: &str, delta: &PlayerDelta) -> Update {
    let mut update = Update::new()
        .set("server_id", server_id)
        .set("player_id", player_id)
        .set("last_seen", delta.last_seen.to_rfc3339())
        .set_on_insert("first_seen", delta.first_seen.to_rfc3339())
        .inc("kills", delta.kills)
        .inc("deaths", delta.deaths)
        .inc("suicides", delta.suicides);

    if !delta.name.is_empty() {
        update = update.set("name", delta.name.as_str());
    } else {
        update = update.set_on_insert("name", player_id);
    }
    for alias in &delta.aliases {
        update = update.add_to_set("known_aliases", alias.as_str());
    }
    for (weapon, kills) in &delta.weapons {
        update = update.inc(format!("weapons.{weapon}"), *kills);
    }
    if delta.longest_kill > 0.0 {
        update = update.max("longest_kill", delta.longest_kill);
    }

    update
}

fn rivalry_update(server_id: &str, delta: &RivalryDelta) -> Update {
    Update::new()
        .set("server_id", server_id)
        .set("player_a", delta.player_a.as_str())
        .set("player_b", delta.player_b.as_str())
        .set("last_event_at", delta.last_event_at.to_rfc3339())
        .set("last_killer_id", delta.last_killer_id.as_str())
        .set("last_weapon", delta.last_weapon.as_str())
        .set_on_insert("created_at", delta.first_event_at.to_rfc3339())
        .inc("a_kills", delta.a_kills)
        .inc("b_kills", delta.b_kills)
}
