// File: src/core/engine.rs
//
// The content cache & merge engine. On (re)initialization it merges the
// bundled reference datasets with the user's persisted records into one
// normalized in-memory snapshot per kind. Writes go store-first, then the
// whole kind reloads. A full reload trades efficiency for correctness
// against partial or duplicate state, which is fine at this data size.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::core::datasets;
use crate::core::fallback::fallback;
use crate::core::normalizer::{normalize, InvalidRecord};
use crate::core::types::{has_reserved_prefix, Kind, RawRecord, Record};
use crate::learning::SeenTracker;
use crate::persistence::{DocumentStore, StoreError};

/// Per-kind lifecycle. `Degraded` means the snapshot is the fallback
/// dataset; `force_refresh` re-enters the load pipeline from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    Degraded,
}

/// Structured write failure. Returned, never thrown past this boundary,
/// so callers can always branch on the outcome.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("record failed validation: {0}")]
    Invalid(#[from] InvalidRecord),
    #[error("duplicate id `{0}`")]
    DuplicateId(String),
    #[error("no record with id `{0}`")]
    NotFound(String),
    #[error("id `{0}` uses a reserved prefix")]
    ReservedId(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for WriteError {
    fn from(e: serde_json::Error) -> Self {
        WriteError::Store(StoreError::Serde(e))
    }
}

struct Snapshot {
    state: LoadState,
    records: Vec<Record>,
}

impl Snapshot {
    fn empty() -> Self {
        Self { state: LoadState::Uninitialized, records: Vec::new() }
    }
}

/// Observability hook: per-kind snapshot size and state. Not load-bearing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindStatus {
    pub kind: Kind,
    pub state: LoadState,
    pub count: usize,
}

/// An explicit engine instance with an init/reload/teardown lifecycle.
/// The composition root owns one; tests construct isolated instances.
pub struct ContentEngine {
    store_root: PathBuf,
    store: Option<DocumentStore>,
    user_id: Option<String>,
    snapshots: HashMap<Kind, Snapshot>,
    tracker: SeenTracker,
}

impl ContentEngine {
    /// Creates an engine over the store directory at `store_root`. Nothing
    /// is opened or loaded until `initialize`.
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        let mut snapshots = HashMap::new();
        for kind in Kind::ALL {
            snapshots.insert(kind, Snapshot::empty());
        }
        Self {
            store_root: store_root.into(),
            store: None,
            user_id: None,
            snapshots,
            tracker: SeenTracker::new(),
        }
    }

    /// Loads every kind's snapshot. Idempotent for the same user; a
    /// different user tears down and reloads from scratch. Never fails:
    /// a store that cannot open degrades every kind to the fallback data.
    pub fn initialize(&mut self, user_id: Option<&str>) {
        let user_id = user_id.unwrap_or("default").to_string();
        if self.user_id.as_deref() == Some(&user_id)
            && self
                .snapshots
                .values()
                .all(|s| s.state != LoadState::Uninitialized)
        {
            return;
        }

        // Teardown on user switch (or first run).
        self.user_id = Some(user_id);
        self.tracker.clear();
        for snapshot in self.snapshots.values_mut() {
            *snapshot = Snapshot::empty();
        }

        self.force_refresh();
    }

    /// Re-runs the full load pipeline for every kind. Used after bulk
    /// import/restore or any external mutation of the store. A store that
    /// previously failed to open is retried here, so a transient storage
    /// denial leaves Degraded once the store comes back.
    pub fn force_refresh(&mut self) {
        if self.store.is_none() {
            match DocumentStore::open(&self.store_root) {
                Ok(store) => self.store = Some(store),
                Err(e) => warn!("store unavailable, serving fallback content: {e}"),
            }
        }
        for kind in Kind::ALL {
            self.reload_kind(kind);
        }
    }

    // The load pipeline for one kind: bundled dataset (except verbs, whose
    // bundled data is deliberately excluded; only user-authored verbs are
    // served), then persisted records, everything normalized, synthetic
    // ids assigned, duplicate ids skipped with the first occurrence
    // winning. A store failure degrades only this kind.
    fn reload_kind(&mut self, kind: Kind) {
        if let Some(snapshot) = self.snapshots.get_mut(&kind) {
            snapshot.state = LoadState::Loading;
        }

        let stored = match &self.store {
            Some(store) => store.get_all(kind.collection()),
            None => Err(StoreError::Unavailable("store never opened".into())),
        };
        let stored = match stored {
            Ok(docs) => docs,
            Err(e) => {
                warn!("loading {kind:?} failed, degrading to fallback: {e}");
                self.snapshots.insert(
                    kind,
                    Snapshot { state: LoadState::Degraded, records: fallback(kind) },
                );
                return;
            }
        };

        let mut records: Vec<Record> = Vec::new();
        let mut admitted: HashSet<String> = HashSet::new();
        let mut synthetic = 0usize;

        let bundled = datasets::bundled(kind).into_iter();
        let stored = stored.into_iter().map(|doc| {
            serde_json::from_value::<RawRecord>(doc).unwrap_or_default()
        });

        for raw in bundled.chain(stored) {
            let mut record = match normalize(kind, raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!("dropping invalid {kind:?} record from merge: {e}");
                    continue;
                }
            };
            if record.id().is_empty() {
                record.set_id(format!("{}{synthetic}", kind.id_prefix()));
                synthetic += 1;
            }
            if !admitted.insert(record.id().to_string()) {
                warn!("duplicate id `{}` in {kind:?} merge, first wins", record.id());
                continue;
            }
            records.push(record);
        }

        debug!("snapshot for {kind:?} ready with {} records", records.len());
        self.snapshots
            .insert(kind, Snapshot { state: LoadState::Ready, records });
    }

    /// The current snapshot. Never panics: empty before initialization.
    pub fn get_all(&self, kind: Kind) -> &[Record] {
        self.snapshots
            .get(&kind)
            .map(|s| s.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_by_id(&self, kind: Kind, id: &str) -> Option<&Record> {
        self.get_all(kind).iter().find(|r| r.id() == id)
    }

    /// Words in one category, for the category collaborator's filtering.
    pub fn get_words_by_category(&self, category_id: &str) -> Vec<&Record> {
        self.get_all(Kind::Word)
            .iter()
            .filter(|r| matches!(r, Record::Word(w) if w.category == category_id))
            .collect()
    }

    /// Normalizes and persists a new user-authored record, then reloads the
    /// kind. Ids are generated (`user-<uuid>`) unless supplied; supplied
    /// ids must not use a reserved prefix.
    pub fn add(&mut self, kind: Kind, raw: RawRecord) -> Result<Record, WriteError> {
        let mut record = normalize(kind, raw)?;
        if record.id().is_empty() {
            record.set_id(format!("user-{}", Uuid::new_v4()));
        } else if has_reserved_prefix(record.id()) {
            return Err(WriteError::ReservedId(record.id().to_string()));
        }

        let store = self.store_mut_or_err()?;
        if !store.add(kind.collection(), record.to_document()?)? {
            return Err(WriteError::DuplicateId(record.id().to_string()));
        }
        // Store write completed; now the snapshot catches up.
        self.reload_kind(kind);
        Ok(record)
    }

    /// Re-normalizes `raw` as the new content of `id`, preserving the
    /// stored record's creation time and predefined flag.
    pub fn update(&mut self, kind: Kind, id: &str, raw: RawRecord) -> Result<Record, WriteError> {
        let existing = self
            .get_by_id(kind, id)
            .ok_or_else(|| WriteError::NotFound(id.to_string()))?;
        let created_at = existing.created_at();
        let is_predefined = existing.is_predefined();
        let stored_category = match existing {
            Record::Word(w) => Some(w.category.clone()),
            _ => None,
        };

        let mut raw = raw;
        raw.id = Some(id.to_string());
        raw.created_at = Some(created_at);
        raw.is_predefined = Some(is_predefined);
        raw.updated_at = None; // refreshed on every mutation
        if raw.category.is_none() {
            raw.category = stored_category;
        }
        let record = normalize(kind, raw)?;

        let store = self.store_mut_or_err()?;
        if !store.update(kind.collection(), record.to_document()?)? {
            return Err(WriteError::NotFound(id.to_string()));
        }
        self.reload_kind(kind);
        Ok(record)
    }

    pub fn delete(&mut self, kind: Kind, id: &str) -> Result<(), WriteError> {
        let store = self.store_mut_or_err()?;
        if !store.delete(kind.collection(), id)? {
            return Err(WriteError::NotFound(id.to_string()));
        }
        self.reload_kind(kind);
        Ok(())
    }

    /// Per-kind counts and states, for debugging surfaces.
    pub fn cache_status(&self) -> Vec<KindStatus> {
        Kind::ALL
            .iter()
            .map(|&kind| {
                let snapshot = &self.snapshots[&kind];
                KindStatus { kind, state: snapshot.state, count: snapshot.records.len() }
            })
            .collect()
    }

    /// Marks an item as presented to the engine's current user.
    pub fn mark_seen(&mut self, kind: Kind, item_id: &str) {
        let user = self.user_id.clone().unwrap_or_else(|| "default".into());
        self.tracker
            .mark_seen(self.store.as_mut(), kind, &user, item_id);
    }

    /// Picks the next item for the engine's current user: unseen first,
    /// else least recently seen.
    pub fn next_item(&mut self, kind: Kind) -> Option<Record> {
        let user = self.user_id.clone().unwrap_or_else(|| "default".into());
        let pool = self
            .snapshots
            .get(&kind)
            .map(|s| s.records.as_slice())
            .unwrap_or(&[]);
        self.tracker
            .next(self.store.as_ref(), kind, &user, pool)
            .cloned()
    }

    /// Direct adapter access for external collaborators (backup/restore
    /// does `bulk_add` per collection, then `force_refresh`).
    pub fn store_mut(&mut self) -> Option<&mut DocumentStore> {
        self.store.as_mut()
    }

    fn store_mut_or_err(&mut self) -> Result<&mut DocumentStore, WriteError> {
        self.store
            .as_mut()
            .ok_or_else(|| WriteError::Store(StoreError::Unavailable("store never opened".into())))
    }
}
