// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable catalog state
//!
//! A store keeps the state of the latest published generation. Commit
//! persists before it publishes, so a reader can never see a generation that
//! would be lost on restart.

use super::error::{CatalogError, CatalogResult};
use super::state::PersistedCatalog;
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Backend persisting the committed catalog state
pub trait CatalogStore: Send + Sync {
    /// Load the last persisted generation
    ///
    /// # Returns
    /// * `Ok(Some(PersistedCatalog))` if the store holds state
    /// * `Ok(None)` for an empty store
    /// * `Err(CatalogError::Storage)` if the state exists but cannot be read
    fn load(&self) -> CatalogResult<Option<PersistedCatalog>>;

    /// Durably replace the stored state
    fn persist(&self, catalog: &PersistedCatalog) -> CatalogResult<()>;

    /// Short name used in log messages
    fn name(&self) -> &str;
}

/// Store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<PersistedCatalog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self) -> CatalogResult<Option<PersistedCatalog>> {
        Ok(self.state.lock().clone())
    }

    fn persist(&self, catalog: &PersistedCatalog) -> CatalogResult<()> {
        *self.state.lock() = Some(catalog.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Store writing the state as one JSON document
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a crash mid-write leaves the previous generation intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "catalog".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self) -> CatalogResult<Option<PersistedCatalog>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let catalog = serde_json::from_slice(&bytes).map_err(|e| {
            CatalogError::Storage(format!("corrupt catalog file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(catalog))
    }

    fn persist(&self, catalog: &PersistedCatalog) -> CatalogResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        let json = serde_json::to_vec_pretty(catalog)?;
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        log::debug!(
            "Persisted catalog generation {} to {}",
            catalog.generation,
            self.path.display()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::SnapshotId;
    use crate::catalog::state::CatalogState;
    use tempfile::TempDir;

    fn persisted(generation: u64) -> PersistedCatalog {
        PersistedCatalog {
            generation: SnapshotId::new(generation),
            state: CatalogState::new(),
        }
    }

    #[test]
    fn test_memory_store_keeps_last_generation() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.persist(&persisted(1)).unwrap();
        store.persist(&persisted(2)).unwrap();
        assert_eq!(store.load().unwrap().unwrap().generation, SnapshotId::new(2));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("catalog.json"));
        assert!(store.load().unwrap().is_none());

        store.persist(&persisted(5)).unwrap();
        assert!(!store.temp_path().exists());

        let reopened = JsonFileStore::new(store.path().to_path_buf());
        assert_eq!(reopened.load().unwrap().unwrap(), persisted(5));
    }

    #[test]
    fn test_corrupt_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(CatalogError::Storage(_))));
    }
}
