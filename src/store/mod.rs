//! Document store and snapshot persistence
//!
//! This module provides the in-memory collection registry and its
//! persistence seam:
//! - `Document`: one record, an insertion-ordered field map
//! - `DocumentStore`: named collections, each an ordered document sequence
//! - `SnapshotStore`: the port a store is persisted through
//! - `MemorySnapshots` / `FileSnapshots`: the shipped port implementations
//!
//! The persisted snapshot is a single JSON record mapping collection name
//! to its document array. Deserializing a snapshot reconstructs the
//! collections map exactly; the engine writes the whole store through the
//! port after every mutating operation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StorageError};

/// One record in a collection: an insertion-ordered field → value map.
///
/// The `_id` field is the document's stable identity and is generated at
/// insertion time when absent.
pub type Document = serde_json::Map<String, Value>;

/// Generate a document identifier.
///
/// Lowercase hex seconds-since-epoch followed by eight random bytes in
/// hex. Natural insertion order therefore correlates with lexicographic
/// id order, which keeps previously exported data sortable by `_id`.
pub fn object_id() -> String {
    let secs = Utc::now().timestamp().max(0) as u64;
    let padding: [u8; 8] = rand::random();
    format!("{:08x}{}", secs, hex::encode(padding))
}

/// In-memory registry of named collections.
///
/// Collections are created lazily on first reference (read or write) and
/// removed only by an explicit drop or a full clear.
#[derive(Debug, Default)]
pub struct DocumentStore {
    collections: BTreeMap<String, Vec<Document>>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruct a store from a serialized snapshot.
    pub fn from_snapshot(snapshot: &str) -> Result<Self> {
        let collections: BTreeMap<String, Vec<Document>> = serde_json::from_str(snapshot)
            .map_err(|e| StorageError::CorruptSnapshot(e.to_string()))?;
        Ok(Self { collections })
    }

    /// Serialize the whole store as one snapshot record.
    pub fn to_snapshot(&self) -> Result<String> {
        serde_json::to_string(&self.collections)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    /// Get a collection, creating it empty if it does not exist yet.
    pub fn get_or_create(&mut self, name: &str) -> &mut Vec<Document> {
        self.collections.entry(name.to_string()).or_default()
    }

    /// Remove a collection. Returns whether it existed.
    pub fn drop_collection(&mut self, name: &str) -> bool {
        self.collections.remove(name).is_some()
    }

    /// Remove every collection.
    pub fn clear(&mut self) {
        self.collections.clear();
    }

    /// Names of all collections, in sorted order.
    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the store holds no collections.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Port through which the store snapshot is persisted.
///
/// `load` returns `Ok(None)` when no snapshot has been written yet. Read
/// failures are fail-open at the engine level: the engine logs them and
/// starts from an empty store rather than refusing to run.
pub trait SnapshotStore {
    /// Read the persisted snapshot, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the persisted snapshot.
    fn save(&self, snapshot: &str) -> Result<()>;
}

impl<S: SnapshotStore> SnapshotStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, snapshot: &str) -> Result<()> {
        (**self).save(snapshot)
    }
}

/// Snapshot store held entirely in memory.
///
/// The browser-session analogue of the persistence port, and the test
/// double of choice: a fresh engine constructed over the same
/// `MemorySnapshots` sees the previous engine's data.
#[derive(Debug, Default)]
pub struct MemorySnapshots {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshots {
    /// Create an empty snapshot slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with an existing snapshot.
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot.into())),
        }
    }
}

impl SnapshotStore for MemorySnapshots {
    fn load(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::ReadFailed("snapshot slot poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, snapshot: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::WriteFailed("snapshot slot poisoned".to_string()))?;
        *slot = Some(snapshot.to_string());
        Ok(())
    }
}

/// Snapshot store backed by a single well-known file.
#[derive(Debug, Clone)]
pub struct FileSnapshots {
    path: PathBuf,
}

impl FileSnapshots {
    /// Create a file-backed snapshot store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshots {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        Ok(Some(content))
    }

    fn save(&self, snapshot: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        }
        fs::write(&self.path, snapshot).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        debug!("Snapshot written to {}", self.path.display());
        Ok(())
    }
}
