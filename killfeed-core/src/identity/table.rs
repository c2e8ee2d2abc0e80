use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// Historical identifier migrations carried by every deployment.
const BUILTIN_MIGRATIONS: &[(&str, &str)] = &[
    ("5251382d-8bce-4abd-8bcb-cdef73698a46", "7020"),
    ("dc1f7c09-dabb-4607-a10d-353f66f1ea20", "7021"),
    ("681ef676-f9f6-2ab1-6462-2334000000", "7022"),
    ("681ef676-2c2d-2cd8-7588-2d2a000000", "7023"),
];

/// Lookup of raw server identifiers that were explicitly migrated to a canonical id.
pub trait KnownServers: Send + Sync {
    fn lookup(&self, raw_id: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticServerTable {
    entries: HashMap<String, String>,
}

impl StaticServerTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer `overrides` on top of this table. Later entries win.
    pub fn merged_with(mut self, overrides: &HashMap<String, String>) -> Self {
        for (raw, canonical) in overrides {
            self.entries.insert(raw.clone(), canonical.clone());
        }
        self
    }
}

impl KnownServers for StaticServerTable {
    fn lookup(&self, raw_id: &str) -> Option<String> {
        self.entries.get(raw_id).cloned()
    }
}

/// The built-in migration table.
pub fn builtin_known_servers() -> StaticServerTable {
    StaticServerTable::new(
        BUILTIN_MIGRATIONS
            .iter()
            .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
            .collect(),
    )
}

/// A table that can be replaced while resolvers are reading it.
#[derive(Debug)]
pub struct SharedServerTable {
    inner: ArcSwap<StaticServerTable>,
}

impl SharedServerTable {
    pub fn new(initial: StaticServerTable) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
        }
    }

    pub fn snapshot(&self) -> Arc<StaticServerTable> {
        self.inner.load_full()
    }

    pub fn replace(&self, table: StaticServerTable) {
        let old_len = self.inner.load().len();
        let new_len = table.len();
        self.inner.store(Arc::new(table));
        tracing::info!(old_len, new_len, "known server table replaced");
    }
}

impl KnownServers for SharedServerTable {
    fn lookup(&self, raw_id: &str) -> Option<String> {
        self.inner.load().lookup(raw_id)
    }
}
