// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Local key-value storage backing the stamp store.
//!
//! Each key maps to one UTF-8 document. The file backend keeps every key in
//! its own `<key>.json` file inside a data directory and replaces it
//! atomically on write.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Synchronous key-value slot storage.
pub trait StorageBackend: Send {
    /// Read the document stored under `key`, or `None` when the slot is empty.
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    /// Replace the document stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
    /// Short description of where data lives, for the status bar.
    fn describe(&self) -> String;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.slot_path(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Process-local storage used in tests and when no data directory is available.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    /// Pre-populate a slot to simulate previously saved data.
    #[cfg(test)]
    pub fn with_slot(mut self, key: &str, value: &str) -> Self {
        self.slots.insert(key.to_string(), value.to_string());
        self
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory (not persisted)".to_string()
    }
}
