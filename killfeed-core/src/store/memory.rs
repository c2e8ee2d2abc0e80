use crate::store::document::{Document, Filter, Update, WriteOp};
use crate::store::error::StoreError;
use crate::store::DocumentStore;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeMap;

type DocKey = (String, String);

/// `collection -> key -> document`, the persisted shape of a store.
pub(crate) type Snapshot = BTreeMap<String, BTreeMap<String, Document>>;

/// Prior state of every document a mutation touched.
pub(crate) type Undo = Vec<(DocKey, Option<Document>)>;

/// In-process store. Documents of different keys never contend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<DocKey, Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Self {
        let docs = DashMap::new();
        for (collection, entries) in snapshot {
            for (key, doc) in entries {
                docs.insert((collection.clone(), key), doc);
            }
        }
        Self { docs }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for entry in self.docs.iter() {
            let ((collection, key), doc) = entry.pair();
            snapshot
                .entry(collection.clone())
                .or_default()
                .insert(key.clone(), doc.clone());
        }
        snapshot
    }

    pub(crate) fn restore(&self, undo: Undo) {
        for (key, previous) in undo.into_iter().rev() {
            match previous {
                Some(doc) => {
                    self.docs.insert(key, doc);
                }
                None => {
                    self.docs.remove(&key);
                }
            }
        }
    }

    pub(crate) fn get_doc(&self, collection: &str, key: &str) -> Option<Document> {
        self.docs
            .get(&(collection.to_string(), key.to_string()))
            .map(|doc| doc.clone())
    }

    pub(crate) fn find_docs(&self, collection: &str, filter: &Filter) -> Vec<(String, Document)> {
        let mut found: Vec<_> = self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == collection && filter.matches(entry.value()))
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found
    }

    pub(crate) fn upsert_doc(
        &self,
        collection: &str,
        key: &str,
        update: &Update,
    ) -> Result<Undo, StoreError> {
        let doc_key = (collection.to_string(), key.to_string());

        match self.docs.entry(doc_key.clone()) {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.get().clone();
                let mut next = previous.clone();
                update
                    .apply(&mut next, false)
                    .map_err(|reason| StoreError::decode(collection, key, reason))?;
                *occupied.get_mut() = next;
                Ok(vec![(doc_key, Some(previous))])
            }
            Entry::Vacant(vacant) => {
                let mut next = Document::new();
                update
                    .apply(&mut next, true)
                    .map_err(|reason| StoreError::decode(collection, key, reason))?;
                vacant.insert(next);
                Ok(vec![(doc_key, None)])
            }
        }
    }

    /// Stage every write against copies, then publish them together.
    pub(crate) fn apply_docs(&self, writes: &[WriteOp]) -> Result<Undo, StoreError> {
        let mut staged: BTreeMap<DocKey, (Option<Document>, Document)> = BTreeMap::new();

        for write in writes {
            let doc_key = (write.collection.clone(), write.key.clone());
            let (inserted, slot) = match staged.entry(doc_key) {
                std::collections::btree_map::Entry::Occupied(occupied) => (false, occupied.into_mut()),
                std::collections::btree_map::Entry::Vacant(vacant) => {
                    let previous = self.docs.get(vacant.key()).map(|doc| doc.clone());
                    let next = previous.clone().unwrap_or_default();
                    (previous.is_none(), vacant.insert((previous, next)))
                }
            };
            write
                .update
                .apply(&mut slot.1, inserted)
                .map_err(|reason| StoreError::decode(&write.collection, &write.key, reason))?;
        }

        let mut undo = Undo::with_capacity(staged.len());
        for (key, (previous, next)) in staged {
            self.docs.insert(key.clone(), next);
            undo.push((key, previous));
        }
        Ok(undo)
    }

    pub(crate) fn update_docs(
        &self,
        collection: &str,
        filter: &Filter,
        set: &Document,
    ) -> Result<Undo, StoreError> {
        let update = set
            .iter()
            .fold(Update::new(), |u, (field, value)| u.set(field.clone(), value.clone()));

        let mut staged = Vec::new();
        for entry in self.docs.iter() {
            if entry.key().0 != collection || !filter.matches(entry.value()) {
                continue;
            }

            let mut next = entry.value().clone();
            update
                .apply(&mut next, false)
                .map_err(|reason| StoreError::decode(collection, entry.key().1.clone(), reason))?;
            staged.push((entry.key().clone(), entry.value().clone(), next));
        }

        let mut undo = Undo::with_capacity(staged.len());
        for (key, previous, next) in staged {
            self.docs.insert(key.clone(), next);
            undo.push((key, Some(previous)));
        }

        Ok(undo)
    }

    pub(crate) fn delete_docs(&self, collection: &str, filter: &Filter) -> Undo {
        let keys: Vec<DocKey> = self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == collection && filter.matches(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();

        keys.into_iter()
            .filter_map(|key| self.docs.remove(&key))
            .map(|(key, doc)| (key, Some(doc)))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.get_doc(collection, key))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(self.find_docs(collection, filter))
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        update: &Update,
    ) -> Result<(), StoreError> {
        self.upsert_doc(collection, key, update).map(|_| ())
    }

    async fn apply_batch(&self, writes: &[WriteOp]) -> Result<(), StoreError> {
        self.apply_docs(writes).map(|_| ())
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        set: &Document,
    ) -> Result<usize, StoreError> {
        self.update_docs(collection, filter, set).map(|undo| undo.len())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
        Ok(self.delete_docs(collection, filter).len())
    }
}
