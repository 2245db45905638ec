// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adapter kinds, deployed adapter instances, query interfaces and users

use super::namespace::DataModel;
use crate::catalog::id::{AdapterId, AdapterTemplateId, InterfaceId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Adapter configuration, key to raw value
pub type AdapterSettings = BTreeMap<String, String>;

/// Capability type of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdapterMode {
    /// Writable store managed by the polystore
    Store,
    /// Externally owned source, read-only
    Source,
}

impl fmt::Display for AdapterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterMode::Store => write!(f, "store"),
            AdapterMode::Source => write!(f, "source"),
        }
    }
}

/// Hook that may normalize or reject settings before an instance is created
#[derive(Clone)]
pub struct SettingsHook(Arc<dyn Fn(&mut AdapterSettings) -> Result<(), String> + Send + Sync>);

impl SettingsHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut AdapterSettings) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, settings: &mut AdapterSettings) -> Result<(), String> {
        (self.0)(settings)
    }
}

impl fmt::Debug for SettingsHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SettingsHook")
    }
}

/// A compiled-in adapter implementation
#[derive(Debug, Clone)]
pub struct AdapterKind {
    pub adapter_name: String,
    pub mode: AdapterMode,
    pub description: String,
    pub data_models: Vec<DataModel>,
    pub supports_partitioning: bool,
    pub default_settings: AdapterSettings,
    pub hook: Option<SettingsHook>,
}

impl AdapterKind {
    pub fn new(adapter_name: impl Into<String>, mode: AdapterMode) -> Self {
        Self {
            adapter_name: adapter_name.into(),
            mode,
            description: String::new(),
            data_models: vec![DataModel::Relational],
            supports_partitioning: mode == AdapterMode::Store,
            default_settings: AdapterSettings::new(),
            hook: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, default: impl Into<String>) -> Self {
        self.default_settings.insert(key.into(), default.into());
        self
    }

    pub fn with_data_models(mut self, models: &[DataModel]) -> Self {
        self.data_models = models.to_vec();
        self
    }

    pub fn with_hook(mut self, hook: SettingsHook) -> Self {
        self.hook = Some(hook);
        self
    }
}

/// The catalog record of a registered adapter kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterTemplate {
    pub id: AdapterTemplateId,
    pub adapter_name: String,
    pub mode: AdapterMode,
    pub description: String,
    pub data_models: Vec<DataModel>,
    pub supports_partitioning: bool,
    pub default_settings: AdapterSettings,
    #[serde(skip)]
    pub hook: Option<SettingsHook>,
}

impl AdapterTemplate {
    pub(crate) fn from_kind(id: AdapterTemplateId, kind: AdapterKind) -> Self {
        Self {
            id,
            adapter_name: kind.adapter_name,
            mode: kind.mode,
            description: kind.description,
            data_models: kind.data_models,
            supports_partitioning: kind.supports_partitioning,
            default_settings: kind.default_settings,
            hook: kind.hook,
        }
    }

    pub fn matches(&self, adapter_name: &str, mode: AdapterMode) -> bool {
        self.mode == mode && self.adapter_name.eq_ignore_ascii_case(adapter_name)
    }
}

impl PartialEq for AdapterTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.adapter_name == other.adapter_name
            && self.mode == other.mode
            && self.default_settings == other.default_settings
    }
}

/// What a deployed adapter can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterCapabilities {
    pub writable: bool,
    pub supports_partitioning: bool,
    pub data_models: Vec<DataModel>,
}

impl AdapterCapabilities {
    pub fn supports(&self, model: DataModel) -> bool {
        self.data_models.contains(&model)
    }
}

/// A deployed, addressable storage backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterInstance {
    pub id: AdapterId,
    /// Lower-cased unique name
    pub unique_name: String,
    pub template_id: AdapterTemplateId,
    pub adapter_name: String,
    pub mode: AdapterMode,
    pub settings: AdapterSettings,
    pub capabilities: AdapterCapabilities,
}

impl AdapterInstance {
    pub fn capabilities(&self) -> &AdapterCapabilities {
        &self.capabilities
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInterface {
    pub id: InterfaceId,
    pub unique_name: String,
    pub interface_name: String,
    pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogUser {
    pub id: UserId,
    pub name: String,
    pub password: String,
}

/// Normalize an adapter or interface name for lookup
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
