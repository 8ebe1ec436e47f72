// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Persistent, ordered stamp collection.
//!
//! Responsibilities:
//! - Load the collection once from local storage, degrading to empty on absent or corrupt data.
//! - Keep the sequence ordered (newest first on add, user-defined after reorder) with unique ids.
//! - Flush the whole collection after every mutation; write failures are logged, never surfaced.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::logic::storage::{MemoryStorage, StorageBackend};
use crate::models::stamp::StampImage;

/// Storage slot holding the serialized collection.
pub const STORAGE_KEY: &str = "clipstamp-images";

/// Failures raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize stamps: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("new order is not a permutation of the current stamps")]
    NotAPermutation,
}

/// Ordered stamp collection with best-effort persistence.
pub struct StampStore {
    images: Vec<StampImage>,
    loaded: bool,
    revision: u64,
    backend: Box<dyn StorageBackend>,
}

impl Default for StampStore {
    fn default() -> Self {
        Self::new(Box::new(MemoryStorage::default()))
    }
}

impl StampStore {
    /// Create an unloaded store on top of the given backend.
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            images: Vec::new(),
            loaded: false,
            revision: 0,
            backend,
        }
    }

    /// Read the stored collection, treating absent or malformed data as empty.
    pub fn load(&mut self) {
        self.images = match self.backend.read(STORAGE_KEY) {
            Ok(Some(raw)) => parse_collection(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "Failed to read stored stamps");
                Vec::new()
            }
        };
        self.loaded = true;
        self.revision += 1;
        info!(
            count = self.images.len(),
            location = %self.backend.describe(),
            "Loaded stamps"
        );
    }

    /// Whether `load` has run (distinguishes "nothing saved" from "not read yet").
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current stamps in display order.
    pub fn images(&self) -> &[StampImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Look up a stamp by id.
    pub fn get(&self, id: &str) -> Option<&StampImage> {
        self.images.iter().find(|img| img.id == id)
    }

    /// Snapshot version; increases on every load or mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Where the collection is persisted.
    pub fn location(&self) -> String {
        self.backend.describe()
    }

    /// Prepend a new stamp for `payload` and return its id.
    pub fn add(&mut self, payload: String) -> String {
        let stamp = StampImage::new(payload);
        let id = stamp.id.clone();
        self.images.insert(0, stamp);
        self.commit();
        debug!(id = %id, count = self.images.len(), "Stamp added");
        id
    }

    /// Drop the stamp with `id`. Returns false (and changes nothing) when absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.id != id);
        let removed = self.images.len() != before;
        if removed {
            self.commit();
            debug!(id = %id, count = self.images.len(), "Stamp removed");
        }
        removed
    }

    /// Replace the order wholesale with a permutation of the current stamps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAPermutation`] when `new_order` adds, drops, or
    /// duplicates ids; the collection is left untouched in that case.
    pub fn reorder(&mut self, new_order: Vec<StampImage>) -> Result<(), StoreError> {
        if !is_permutation(&self.images, &new_order) {
            return Err(StoreError::NotAPermutation);
        }
        self.images = new_order;
        self.commit();
        Ok(())
    }

    /// Move `from_id` to the position currently held by `to_id`, shifting the rest.
    ///
    /// Returns false when either id is unknown or both are the same.
    pub fn move_item(&mut self, from_id: &str, to_id: &str) -> bool {
        if from_id == to_id {
            return false;
        }
        let from = self.images.iter().position(|img| img.id == from_id);
        let to = self.images.iter().position(|img| img.id == to_id);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };

        let mut next = self.images.clone();
        let moved = next.remove(from);
        next.insert(to, moved);
        self.reorder(next).is_ok()
    }

    /// Bump the revision and flush; persistence only starts once the initial load ran.
    fn commit(&mut self) {
        self.revision += 1;
        if !self.loaded {
            return;
        }
        if let Err(err) = self.persist() {
            warn!(error = %err, "Failed to save stamps");
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = serialize_collection(&self.images)?;
        self.backend.write(STORAGE_KEY, &json)?;
        Ok(())
    }
}

/// Serialize the collection into the stored JSON array layout.
pub fn serialize_collection(images: &[StampImage]) -> Result<String, serde_json::Error> {
    serde_json::to_string(images)
}

/// Parse a stored collection; malformed input yields an empty list.
///
/// Entries repeating an earlier id are dropped so ids stay unique.
pub fn parse_collection(raw: &str) -> Vec<StampImage> {
    let parsed: Vec<StampImage> = match serde_json::from_str(raw) {
        Ok(images) => images,
        Err(err) => {
            warn!(error = %err, "Stored stamps are malformed; starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let total = parsed.len();
    let unique: Vec<StampImage> = parsed
        .into_iter()
        .filter(|img| seen.insert(img.id.clone()))
        .collect();
    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "Dropped stored stamps with duplicate ids"
        );
    }
    unique
}

fn is_permutation(current: &[StampImage], candidate: &[StampImage]) -> bool {
    if current.len() != candidate.len() {
        return false;
    }
    let current_ids: HashSet<&str> = current.iter().map(|img| img.id.as_str()).collect();
    let mut seen = HashSet::new();
    candidate
        .iter()
        .all(|img| current_ids.contains(img.id.as_str()) && seen.insert(img.id.as_str()))
}
