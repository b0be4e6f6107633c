// File: src/persistence.rs
//
// Directory-backed document store: one JSON file per named collection plus
// a version stamp. Documents are loosely-typed `serde_json::Value`s keyed
// by their "id" field; insertion order is preserved. Collections are small
// (hundreds of records), so id lookups are linear scans.

use log::warn;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const STORE_VERSION: u32 = 1;

/// Every collection the store manages: one per entity kind, plus the
/// category service's and the seen tracker's namespaces.
pub const COLLECTIONS: [&str; 6] =
    ["words", "verbs", "sentences", "numbers", "categories", "seen"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("unknown collection `{0}`")]
    UnknownCollection(String),
    #[error("collection `{0}` is broken: {1}")]
    BrokenCollection(String, String),
    #[error("document has no string `id` field")]
    MissingId,
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result of a best-effort batch insert: the documents that made it in,
/// and the ids (or a placeholder for id-less documents) that were skipped.
/// This is deliberately not transactional. Partial success commits.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub inserted: usize,
    pub skipped: Vec<String>,
}

// A collection either loaded cleanly or is quarantined with the parse
// error. A broken collection fails its own reads/writes without taking
// the rest of the store down.
enum Slot {
    Loaded(Vec<Value>),
    Broken(String),
}

pub struct DocumentStore {
    root: PathBuf,
    collections: HashMap<&'static str, Slot>,
}

impl DocumentStore {
    /// Opens (creating on first run) the store at `root`. Idempotent.
    ///
    /// A root that cannot be created or a version stamp that cannot be
    /// written is `Unavailable`. A single corrupt collection file is not
    /// fatal; it only quarantines that collection.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| StoreError::Unavailable(format!("cannot create {root:?}: {e}")))?;

        let meta_path = root.join("meta.json");
        if meta_path.exists() {
            let meta: Value = File::open(&meta_path)
                .map_err(|e| StoreError::Unavailable(e.to_string()))
                .and_then(|f| {
                    serde_json::from_reader(BufReader::new(f))
                        .map_err(|e| StoreError::Unavailable(format!("bad meta.json: {e}")))
                })?;
            let version = meta.get("version").and_then(Value::as_u64).unwrap_or(0);
            if version as u32 > STORE_VERSION {
                return Err(StoreError::Unavailable(format!(
                    "store version {version} is newer than supported {STORE_VERSION}"
                )));
            }
        } else {
            let meta = serde_json::json!({ "version": STORE_VERSION });
            write_atomic(&root, &meta_path, &meta)?;
        }

        let mut collections = HashMap::new();
        for name in COLLECTIONS {
            let path = root.join(format!("{name}.json"));
            let slot = if path.exists() {
                match File::open(&path)
                    .map_err(StoreError::from)
                    .and_then(|f| Ok(serde_json::from_reader::<_, Vec<Value>>(BufReader::new(f))?))
                {
                    Ok(docs) => Slot::Loaded(docs),
                    Err(e) => {
                        warn!("collection `{name}` failed to load, quarantined: {e}");
                        Slot::Broken(e.to_string())
                    }
                }
            } else {
                Slot::Loaded(Vec::new())
            };
            collections.insert(name, slot);
        }

        Ok(Self { root, collections })
    }

    fn slot(&self, name: &str) -> Result<&Vec<Value>, StoreError> {
        match self.collections.get(name) {
            None => Err(StoreError::UnknownCollection(name.to_string())),
            Some(Slot::Broken(reason)) => Err(StoreError::BrokenCollection(
                name.to_string(),
                reason.clone(),
            )),
            Some(Slot::Loaded(docs)) => Ok(docs),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Vec<Value>, StoreError> {
        match self.collections.get_mut(name) {
            None => Err(StoreError::UnknownCollection(name.to_string())),
            Some(Slot::Broken(reason)) => Err(StoreError::BrokenCollection(
                name.to_string(),
                reason.clone(),
            )),
            Some(Slot::Loaded(docs)) => Ok(docs),
        }
    }

    pub fn get_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.slot(collection)?.clone())
    }

    pub fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .slot(collection)?
            .iter()
            .find(|doc| doc_id(doc) == Some(id))
            .cloned())
    }

    /// Inserts one document. `Ok(false)` when the id is already taken;
    /// a duplicate is a caller condition, not a store failure.
    pub fn add(&mut self, collection: &str, doc: Value) -> Result<bool, StoreError> {
        let id = doc_id(&doc).ok_or(StoreError::MissingId)?.to_string();
        let docs = self.slot_mut(collection)?;
        if docs.iter().any(|d| doc_id(d) == Some(&id)) {
            return Ok(false);
        }
        docs.push(doc);
        self.flush(collection)
    }

    /// Replaces the document with the same id. `Ok(false)` when absent.
    pub fn update(&mut self, collection: &str, doc: Value) -> Result<bool, StoreError> {
        let id = doc_id(&doc).ok_or(StoreError::MissingId)?.to_string();
        let docs = self.slot_mut(collection)?;
        match docs.iter().position(|d| doc_id(d) == Some(&id)) {
            None => Ok(false),
            Some(idx) => {
                docs[idx] = doc;
                self.flush(collection)
            }
        }
    }

    pub fn delete(&mut self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let docs = self.slot_mut(collection)?;
        match docs.iter().position(|d| doc_id(d) == Some(id)) {
            None => Ok(false),
            Some(idx) => {
                docs.remove(idx);
                self.flush(collection)
            }
        }
    }

    /// Best-effort batch insert. Documents without an id or with a taken id
    /// are skipped and reported in the outcome; everything else commits in
    /// one flush. Not atomic across the batch.
    pub fn bulk_add(
        &mut self,
        collection: &str,
        docs: Vec<Value>,
    ) -> Result<BulkOutcome, StoreError> {
        let existing = self.slot_mut(collection)?;
        let mut outcome = BulkOutcome::default();
        for doc in docs {
            let Some(id) = doc_id(&doc).map(str::to_string) else {
                outcome.skipped.push("<missing id>".to_string());
                continue;
            };
            if existing.iter().any(|d| doc_id(d) == Some(&id)) {
                outcome.skipped.push(id);
                continue;
            }
            existing.push(doc);
            outcome.inserted += 1;
        }
        if outcome.inserted > 0 {
            self.flush(collection)?;
        }
        Ok(outcome)
    }

    // Atomic rewrite of one collection file: serialize into a temp file in
    // the store root, then persist over the real path.
    fn flush(&self, collection: &str) -> Result<bool, StoreError> {
        let docs = self.slot(collection)?;
        let path = self.root.join(format!("{collection}.json"));
        let temp = NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer(BufWriter::new(&temp), docs)?;
        temp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        Ok(true)
    }
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

fn write_atomic(root: &Path, path: &Path, value: &Value) -> Result<(), StoreError> {
    let temp = NamedTempFile::new_in(root)?;
    serde_json::to_writer(BufWriter::new(&temp), value)?;
    temp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
