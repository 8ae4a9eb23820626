// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable key/value storage used by the offline queue, the response cache,
//! and the connectivity monitor.
//!
//! `FileStorage` keeps one file per key. Writes go to a uniquely named temp
//! file that is fsynced and then renamed over the target, so a reader sees
//! either the old value or the new one, never a partial write.
//!
//! File names are the SHA-256 of the key, which keeps them at a fixed length
//! whatever the key (cache keys carry full query strings). The key itself is
//! stored next to the value so it can be listed back.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const VALUE_EXT: &str = "json";
const TEMP_EXT: &str = "tmp";

/// Key/value store that survives process restart.
pub trait Storage: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Lists every stored key.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Reads and deserializes a JSON value.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Option<T>> {
    match storage.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes and stores a JSON value.
pub fn store_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}

/// Contents of one storage file.
#[derive(Serialize)]
struct RecordRef<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Deserialize)]
struct Record {
    key: String,
    value: String,
}

/// Directory-backed storage, one file per key.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens storage rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(key: &str) -> String {
        format!("{}.{}", hex::encode(Sha256::digest(key.as_bytes())), VALUE_EXT)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(Self::file_name(key))
    }

    fn read_record(path: &Path) -> Result<Option<Record>> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(record) = Self::read_record(&self.path_for(key))? else {
            return Ok(None);
        };
        if record.key != key {
            return Err(Error::CorruptedData(format!(
                "storage file for '{key}' holds '{}'",
                record.key
            )));
        }
        Ok(Some(record.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let target = self.path_for(key);
        let raw = serde_json::to_string(&RecordRef { key, value })?;
        let temp = target.with_extension(format!(
            "{}.{}",
            uuid::Uuid::new_v4().simple(),
            TEMP_EXT
        ));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp)?;
            file.write_all(raw.as_bytes())?;
            file.sync_all()?;
        }

        if let Err(e) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        // Persist the rename itself where the platform allows opening dirs.
        if let Ok(dir) = File::open(&self.dir) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            // Foreign files, unreadable records, and files removed since the
            // directory was listed are all skipped.
            let Ok(Some(record)) = Self::read_record(&path) else {
                continue;
            };
            let named_for_key = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == Self::file_name(&record.key));
            if named_for_key {
                keys.push(record.key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-process storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.keys().cloned().collect())
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
