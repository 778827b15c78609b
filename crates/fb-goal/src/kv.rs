// kv.rs — KeyValueStore trait and its two backends.
//
// The durable slot is a plain string-keyed, string-valued store, the same
// shape as browser local storage. The selection lives under one fixed key
// and the debug override under another; both share the key space.
//
// JsonFileKv keeps the whole key space in one JSON object file so it
// survives process restarts. MemoryKv is an in-process map whose clones
// share storage, which lets tests "reload" by opening a second store over
// the same backing map.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::SlotError;

/// Key holding the serialized GoalSelection.
pub const SELECTION_KEY: &str = "forecastGoals";

/// Key holding the single-goal debug override.
pub const DEBUG_OVERRIDE_KEY: &str = "debug_selectedGoal";

/// A durable string key-value store.
///
/// Methods take `&self`; implementations handle their own interior
/// mutability so a store can be shared between the bridge and the debug
/// override channel.
///
/// Backends that cannot decode their storage fail reads with
/// [`SlotError::SerializationError`]. A write over undecodable storage
/// starts from an empty key space, so every key (the debug override
/// included) is lost from the live store; [`JsonFileKv`] keeps the old file
/// next to the new one.
pub trait KeyValueStore: Send {
    /// Read a value. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Write (create or overwrite) a value.
    fn set(&self, key: &str, value: &str) -> Result<(), SlotError>;

    /// Remove a key. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool, SlotError>;
}

/// File-backed key-value store: one JSON object per file.
pub struct JsonFileKv {
    path: PathBuf,
}

impl JsonFileKv {
    /// Open a store backed by `path`. The parent directory is created if
    /// needed; the file itself is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SlotError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SlotError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SlotError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(&self.path).map_err(|source| SlotError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    /// Where a corrupt store file is moved before it is replaced.
    pub fn quarantine_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    /// Load for a read-modify-write. A corrupt file is moved to
    /// [`quarantine_path`](Self::quarantine_path) and the write starts from
    /// an empty key space.
    fn load_for_update(&self) -> Result<BTreeMap<String, String>, SlotError> {
        match self.load() {
            Err(SlotError::SerializationError(e)) => {
                let aside = self.quarantine_path();
                fs::rename(&self.path, &aside).map_err(|source| SlotError::IoError {
                    path: aside.display().to_string(),
                    source,
                })?;
                tracing::warn!(
                    "key-value file {} is corrupt ({}); moved to {} and starting fresh",
                    self.path.display(),
                    e,
                    aside.display()
                );
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<(), SlotError> {
        let json = serde_json::to_string_pretty(entries)?;
        // Write to a sibling temp file then rename, so a crash mid-write
        // never leaves a truncated store behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| SlotError::IoError {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| SlotError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileKv {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut entries = self.load_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
    }

    fn remove(&self, key: &str) -> Result<bool, SlotError> {
        let mut entries = self.load_for_update()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.store(&entries)?;
        }
        Ok(existed)
    }
}

/// In-process key-value store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, SlotError> {
        self.entries
            .lock()
            .map_err(|_| SlotError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, SlotError> {
        Ok(self.lock()?.remove(key).is_some())
    }
}
