// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adapter kind registry
//!
//! Keeps the adapter kinds compiled into the process, keyed by name and
//! capability type. A kind must be known here before a template for it can
//! be created in the catalog; deployed instances are catalog state and live
//! in the snapshot instead.

use super::entity::adapter::normalize_name;
use super::entity::{AdapterKind, AdapterMode, AdapterSettings, AdapterTemplate, SettingsHook};
use super::error::{CatalogError, CatalogResult};
use std::collections::BTreeMap;

/// Registry of adapter kinds available to this process
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    kinds: BTreeMap<(String, AdapterMode), AdapterKind>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in adapter kind
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        for kind in builtin_adapter_kinds() {
            registry.register(kind);
        }
        registry
    }

    /// Register an adapter kind
    ///
    /// A kind registered under a name and mode that is already taken
    /// replaces the previous one.
    ///
    /// # Returns
    /// * `Some(AdapterKind)` with the replaced kind
    /// * `None` if the name and mode were free
    pub fn register(&mut self, kind: AdapterKind) -> Option<AdapterKind> {
        let key = (normalize_name(&kind.adapter_name), kind.mode);
        log::debug!("Registered adapter kind: {} ({})", kind.adapter_name, kind.mode);
        self.kinds.insert(key, kind)
    }

    pub fn get(&self, adapter_name: &str, mode: AdapterMode) -> Option<&AdapterKind> {
        self.kinds.get(&(normalize_name(adapter_name), mode))
    }

    /// Look up a kind, failing with `UnknownAdapterKind` when it is missing
    pub fn resolve(&self, adapter_name: &str, mode: AdapterMode) -> CatalogResult<&AdapterKind> {
        self.get(adapter_name, mode)
            .ok_or_else(|| CatalogError::UnknownAdapterKind(format!("{} ({})", adapter_name, mode)))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &AdapterKind> {
        self.kinds.values()
    }

    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Reattach the settings hook of a template restored from a store
    pub fn bind_hook(&self, template: &mut AdapterTemplate) {
        if template.hook.is_none() {
            template.hook = self
                .get(&template.adapter_name, template.mode)
                .and_then(|kind| kind.hook.clone());
        }
    }
}

/// Merge overrides onto a base settings map and run the template's hook
///
/// Keys the template does not publish are rejected.
pub fn resolve_settings(
    template: &AdapterTemplate,
    base: &AdapterSettings,
    overrides: &AdapterSettings,
) -> CatalogResult<AdapterSettings> {
    let mut settings = base.clone();
    for (key, value) in overrides {
        if !template.default_settings.contains_key(key) {
            return Err(CatalogError::InvalidSettings {
                adapter: template.adapter_name.clone(),
                reason: format!("unknown setting '{}'", key),
            });
        }
        settings.insert(key.clone(), value.clone());
    }
    if let Some(hook) = &template.hook {
        hook.apply(&mut settings)
            .map_err(|reason| CatalogError::InvalidSettings {
                adapter: template.adapter_name.clone(),
                reason,
            })?;
    }
    Ok(settings)
}

fn positive_integer(settings: &mut AdapterSettings, key: &str) -> Result<u64, String> {
    let raw = settings.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => {
            settings.insert(key.to_string(), value.to_string());
            Ok(value)
        }
        _ => Err(format!("'{}' must be a positive integer, got '{}'", key, raw)),
    }
}

/// The adapter kinds shipped with the catalog
pub fn builtin_adapter_kinds() -> Vec<AdapterKind> {
    let hsqldb = AdapterKind::new("hsqldb", AdapterMode::Store)
        .with_description("Embedded relational store, in memory or file backed")
        .with_setting("type", "Memory")
        .with_setting("tableType", "Memory")
        .with_setting("path", "")
        .with_setting("maxConnections", "25")
        .with_setting("trxControlMode", "mvcc")
        .with_setting("trxIsolationLevel", "read_committed")
        .with_hook(SettingsHook::new(|settings| {
            positive_integer(settings, "maxConnections")?;
            let file_backed = settings
                .get("type")
                .map_or(false, |t| t.eq_ignore_ascii_case("file"));
            let path_empty = settings.get("path").map_or(true, |p| p.trim().is_empty());
            if file_backed && path_empty {
                return Err("a file backed store needs a 'path'".to_string());
            }
            Ok(())
        }));

    let postgresql = AdapterKind::new("postgresql", AdapterMode::Store)
        .with_description("External PostgreSQL server")
        .with_setting("host", "localhost")
        .with_setting("port", "5432")
        .with_setting("database", "polystore")
        .with_setting("maxConnections", "25")
        .with_setting("trxIsolationLevel", "read_committed")
        .with_hook(SettingsHook::new(|settings| {
            let port = positive_integer(settings, "port")?;
            if port > u64::from(u16::MAX) {
                return Err(format!("'port' out of range: {}", port));
            }
            positive_integer(settings, "maxConnections")?;
            Ok(())
        }));

    let csv = AdapterKind::new("csv", AdapterMode::Source)
        .with_description("Read-only CSV files in a directory")
        .with_setting("directory", "")
        .with_setting("maxStringLength", "255")
        .with_hook(SettingsHook::new(|settings| {
            let directory = settings.get("directory").map(|d| d.trim().to_string());
            match directory {
                Some(d) if !d.is_empty() => {
                    settings.insert("directory".to_string(), d);
                }
                _ => return Err("'directory' must not be empty".to_string()),
            }
            positive_integer(settings, "maxStringLength")?;
            Ok(())
        }));

    vec![hsqldb, postgresql, csv]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::AdapterTemplateId;

    fn template(name: &str, mode: AdapterMode) -> AdapterTemplate {
        let registry = AdapterRegistry::with_builtin_kinds();
        let kind = registry.resolve(name, mode).unwrap().clone();
        AdapterTemplate::from_kind(AdapterTemplateId::new(0), kind)
    }

    #[test]
    fn test_builtin_kinds() {
        let registry = AdapterRegistry::with_builtin_kinds();
        assert_eq!(registry.kind_count(), 3);
        assert!(registry.get("HSQLDB", AdapterMode::Store).is_some());
        assert!(registry.get("csv", AdapterMode::Store).is_none());
        assert!(matches!(
            registry.resolve("mongodb", AdapterMode::Store),
            Err(CatalogError::UnknownAdapterKind(_))
        ));
    }

    #[test]
    fn test_register_overwrites_same_name_and_mode() {
        let mut registry = AdapterRegistry::with_builtin_kinds();
        let replaced = registry.register(
            AdapterKind::new("hsqldb", AdapterMode::Store).with_setting("type", "File"),
        );
        assert!(replaced.is_some());
        assert_eq!(registry.kind_count(), 3);
        assert_eq!(
            registry
                .get("hsqldb", AdapterMode::Store)
                .unwrap()
                .default_settings
                .get("type")
                .map(String::as_str),
            Some("File")
        );
    }

    #[test]
    fn test_port_is_coerced() {
        let template = template("postgresql", AdapterMode::Store);
        let mut overrides = AdapterSettings::new();
        overrides.insert("port".into(), " 6543 ".into());
        let settings =
            resolve_settings(&template, &template.default_settings, &overrides).unwrap();
        assert_eq!(settings.get("port").map(String::as_str), Some("6543"));

        overrides.insert("port".into(), "70000".into());
        assert!(resolve_settings(&template, &template.default_settings, &overrides).is_err());
    }

    #[test]
    fn test_csv_directory_required() {
        let template = template("csv", AdapterMode::Source);
        let err = resolve_settings(&template, &template.default_settings, &AdapterSettings::new())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSettings { .. }));

        let mut overrides = AdapterSettings::new();
        overrides.insert("directory".into(), "/data/csv".into());
        overrides.insert("maxStringLength".into(), "0".into());
        assert!(resolve_settings(&template, &template.default_settings, &overrides).is_err());
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let template = template("hsqldb", AdapterMode::Store);
        let mut overrides = AdapterSettings::new();
        overrides.insert("colour".into(), "blue".into());
        let err = resolve_settings(&template, &template.default_settings, &overrides).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InvalidSettings {
                adapter: "hsqldb".into(),
                reason: "unknown setting 'colour'".into(),
            }
        );
    }

    #[test]
    fn test_bind_hook_after_restore() {
        let registry = AdapterRegistry::with_builtin_kinds();
        let mut restored = template("csv", AdapterMode::Source);
        restored.hook = None;
        registry.bind_hook(&mut restored);
        assert!(restored.hook.is_some());
    }
}
