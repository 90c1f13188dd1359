//! Key-value persistence of portal state.
//!
//! A [`Store`] maps keys to JSON values. [`JsonFileStore`] keeps them in a
//! single JSON object on disk, [`MemoryStore`] keeps them in memory.

use crate::error::{PortalError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key of the last selected distribution id.
pub const SELECTED_DISTRIBUTION_KEY: &str = "selectedDistribution";

/// Key of the saved facet selections, per domain.
pub const FACET_SELECTION_KEY: &str = "facetSelection";

/// Key of the snapshots of the selected configurables.
pub const CONFIGURABLES_KEY: &str = "configurables";

/// Key-value persistence.
pub trait Store: Send {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Forget `key`.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Typed access on top of any [`Store`].
pub trait StoreExt: Store {
    /// Deserialize the value under `key`. A value of the wrong shape is
    /// logged and treated as absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring stored {}: {}", key, e);
                None
            },
        }
    }

    /// Serialize `value` under `key`.
    fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by one JSON object in a file, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable one is logged and
    /// replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| PortalError::Storage(format!(
            "failed to read {}: {}",
            path.display(),
            e
        )))?;
        let entries = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding unreadable state file {}: {}", path.display(), e);
                BTreeMap::new()
            },
        };
        tracing::debug!("Opened state file {}", path.display());

        Ok(Self { path, entries })
    }

    /// Location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurable::SimpleConfigurable;
    use crate::data::ParameterValues;
    use pretty_assertions::assert_eq;

    fn snapshot() -> SimpleConfigurable {
        SimpleConfigurable {
            id: "a".into(),
            param_values: ParameterValues::new(Vec::new()),
            style: None,
            pinned: true,
            selected: false,
            spatial_linked: true,
            temporal_linked: false,
            show_spatial_coverage: false,
            levels: vec!["gnss".into()],
        }
    }

    #[test]
    fn typed_values_round_trip() {
        let mut store = MemoryStore::new();
        store
            .set_json(CONFIGURABLES_KEY, &vec![snapshot()])
            .unwrap();
        let back: Vec<SimpleConfigurable> = store.get_json(CONFIGURABLES_KEY).unwrap();
        assert_eq!(back, vec![snapshot()]);

        store.remove(CONFIGURABLES_KEY).unwrap();
        assert!(store.get(CONFIGURABLES_KEY).is_none());
    }

    #[test]
    fn wrong_shape_reads_as_absent() {
        let mut store = MemoryStore::new();
        store.set(SELECTED_DISTRIBUTION_KEY, Value::from(42)).unwrap();
        assert!(store.get_json::<Vec<String>>(SELECTED_DISTRIBUTION_KEY).is_none());
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.get(SELECTED_DISTRIBUTION_KEY).is_none());
        store.set_json(SELECTED_DISTRIBUTION_KEY, "a").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_json::<String>(SELECTED_DISTRIBUTION_KEY),
            Some("a".to_string())
        );
    }

    #[test]
    fn unreadable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get(FACET_SELECTION_KEY).is_none());
    }
}
