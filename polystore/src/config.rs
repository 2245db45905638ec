// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Catalog configuration

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::store::{CatalogStore, JsonFileStore, MemoryStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where committed catalog state is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Lost when the process exits
    InMemory,
    /// One JSON document on disk
    JsonFile { path: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::InMemory
    }
}

impl StoreConfig {
    pub fn open(&self) -> Arc<dyn CatalogStore> {
        match self {
            StoreConfig::InMemory => Arc::new(MemoryStore::new()),
            StoreConfig::JsonFile { path } => Arc::new(JsonFileStore::new(path.clone())),
        }
    }
}

/// Configuration for opening a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Allow the process-wide catalog to be replaced
    pub test_mode: bool,

    /// Number of commit events buffered per subscriber
    pub event_capacity: usize,

    /// Create the default users, namespace, templates and adapter on an empty store
    pub bootstrap_defaults: bool,

    /// Name of the namespace created by the bootstrap
    pub default_namespace: String,

    /// Case sensitivity of the bootstrapped namespace
    pub default_namespace_case_sensitive: bool,

    pub store: StoreConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            event_capacity: 1024,
            bootstrap_defaults: true,
            default_namespace: "public".to_string(),
            default_namespace_case_sensitive: false,
            store: StoreConfig::InMemory,
        }
    }
}

impl CatalogConfig {
    /// An empty, replaceable, in-memory catalog
    pub fn testing() -> Self {
        Self {
            test_mode: true,
            bootstrap_defaults: false,
            ..Self::default()
        }
    }

    /// Same as the default configuration but persisted to `path`
    pub fn with_json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig::JsonFile { path: path.into() },
            ..Self::default()
        }
    }

    /// Read a configuration from a JSON file
    ///
    /// Missing fields take their default values.
    pub fn from_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            CatalogError::Configuration(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.event_capacity == 0 {
            return Err(CatalogError::Configuration(
                "event_capacity must be positive".to_string(),
            ));
        }
        if self.default_namespace.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "default_namespace must not be empty".to_string(),
            ));
        }
        if let StoreConfig::JsonFile { path } = &self.store {
            if path.as_os_str().is_empty() {
                return Err(CatalogError::Configuration(
                    "json_file store needs a path".to_string(),
                ));
            }
        }
        Ok(())
    }
}
