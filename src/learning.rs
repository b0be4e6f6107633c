// File: src/learning.rs
//
// Seen/progress tracking: per (user, kind), the set of item ids already
// presented plus a last-seen timestamp per id. Persisted in its own `seen`
// collection, independent of the content collections; cached in memory and
// written through when a store is available. Never pruned.

use chrono::{DateTime, Utc};
use log::warn;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::types::{Kind, Record};
use crate::persistence::DocumentStore;

pub const SEEN_COLLECTION: &str = "seen";

/// Persisted seen-state for one (user, kind) pair. Document id is the
/// composite `<userId>:<collection>` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenRecord {
    pub id: String,
    pub user_id: String,
    pub kind: Kind,
    pub seen: HashMap<String, DateTime<Utc>>,
}

fn seen_doc_id(user_id: &str, kind: Kind) -> String {
    format!("{user_id}:{}", kind.collection())
}

/// Rotation state over large item sets: unseen first, then least recently
/// seen. Created lazily per user and kind.
pub struct SeenTracker {
    cache: HashMap<String, SeenRecord>,
}

impl SeenTracker {
    pub fn new() -> Self {
        Self { cache: HashMap::new() }
    }

    /// Drops every cached seen-record (used on user switch). Persisted
    /// state is untouched.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn entry(
        &mut self,
        store: Option<&DocumentStore>,
        kind: Kind,
        user_id: &str,
    ) -> &mut SeenRecord {
        let key = seen_doc_id(user_id, kind);
        if !self.cache.contains_key(&key) {
            let loaded = store
                .and_then(|s| s.get_by_id(SEEN_COLLECTION, &key).ok().flatten())
                .and_then(|doc| serde_json::from_value::<SeenRecord>(doc).ok());
            let record = loaded.unwrap_or_else(|| SeenRecord {
                id: key.clone(),
                user_id: user_id.to_string(),
                kind,
                seen: HashMap::new(),
            });
            self.cache.insert(key.clone(), record);
        }
        self.cache.get_mut(&key).expect("just inserted")
    }

    /// Marks one item as presented. Idempotent for set membership; always
    /// refreshes the last-seen time. A persistence failure keeps the
    /// in-memory state and logs.
    pub fn mark_seen(
        &mut self,
        store: Option<&mut DocumentStore>,
        kind: Kind,
        user_id: &str,
        item_id: &str,
    ) {
        let record = self.entry(store.as_deref(), kind, user_id);
        record.seen.insert(item_id.to_string(), Utc::now());
        let record = record.clone();

        if let Some(store) = store {
            if let Err(e) = persist(store, &record) {
                warn!("seen-state for `{}` not persisted: {e}", record.id);
            }
        }
    }

    /// Picks the next item to present from `pool`:
    /// 1. a uniformly random unseen item, if any;
    /// 2. otherwise the item with the oldest last-seen time (ties broken
    ///    by pool order);
    /// 3. `None` for an empty pool.
    ///
    /// Full coverage before any repetition, then rotation by recency.
    pub fn next<'a>(
        &mut self,
        store: Option<&DocumentStore>,
        kind: Kind,
        user_id: &str,
        pool: &'a [Record],
    ) -> Option<&'a Record> {
        if pool.is_empty() {
            return None;
        }
        let record = self.entry(store, kind, user_id);

        let unseen: Vec<&Record> = pool
            .iter()
            .filter(|item| !record.seen.contains_key(item.id()))
            .collect();
        if let Some(pick) = unseen.choose(&mut rand::thread_rng()) {
            return Some(*pick);
        }

        // All seen: strict `<` keeps the earliest pool entry on ties.
        let mut oldest: Option<(&'a Record, DateTime<Utc>)> = None;
        for item in pool {
            let Some(&at) = record.seen.get(item.id()) else {
                return Some(item);
            };
            if oldest.map(|(_, best)| at < best).unwrap_or(true) {
                oldest = Some((item, at));
            }
        }
        oldest.map(|(item, _)| item)
    }

    /// Count of distinct items seen for (user, kind).
    pub fn seen_count(
        &mut self,
        store: Option<&DocumentStore>,
        kind: Kind,
        user_id: &str,
    ) -> usize {
        self.entry(store, kind, user_id).seen.len()
    }
}

impl Default for SeenTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn persist(store: &mut DocumentStore, record: &SeenRecord) -> Result<(), crate::persistence::StoreError> {
    let doc = serde_json::to_value(record)?;
    if !store.update(SEEN_COLLECTION, doc.clone())? {
        store.add(SEEN_COLLECTION, doc)?;
    }
    Ok(())
}
