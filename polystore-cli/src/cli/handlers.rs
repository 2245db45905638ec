// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for Polystore

use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use super::commands::OutputFormat;
use super::output::{Listing, SnapshotFormatter};
use polystore::catalog::id::NamespaceId;
use polystore::{
    CatalogConfig, CatalogError, CatalogManager, CatalogObject, Pattern, Snapshot, StoreConfig,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Where the catalog lives, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct CatalogTarget {
    pub config: Option<PathBuf>,
    pub store: Option<PathBuf>,
}

impl CatalogTarget {
    /// Configuration file settings with the `--store` override applied
    pub fn resolve(&self) -> Result<(CatalogConfig, PathBuf), CatalogError> {
        let mut config = match &self.config {
            Some(path) => CatalogConfig::from_file(path)?,
            None => CatalogConfig::default(),
        };
        if let Some(path) = &self.store {
            config.store = StoreConfig::JsonFile { path: path.clone() };
        }
        match &config.store {
            StoreConfig::JsonFile { path } => {
                let path = path.clone();
                Ok((config, path))
            }
            StoreConfig::InMemory => Err(CatalogError::Configuration(
                "no catalog file: pass --store or a config with a json_file store".to_string(),
            )),
        }
    }

    /// Open an existing catalog file
    fn open_existing(&self) -> Result<Arc<CatalogManager>, CatalogError> {
        let (config, path) = self.resolve()?;
        if !path.exists() {
            return Err(CatalogError::Configuration(format!(
                "catalog file {} does not exist; run `polystore init` first",
                path.display()
            )));
        }
        CatalogManager::open(config)
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>, CatalogError> {
        let catalog = self.open_existing()?;
        let snapshot = catalog.snapshot();
        catalog.close();
        Ok(snapshot)
    }
}

/// Handle the init command
pub fn handle_init(target: &CatalogTarget, force: bool) -> CliResult {
    let (mut config, path) = target.resolve()?;
    if path.exists() {
        if !force {
            println!(
                "{}",
                format!("Catalog already exists at {}", path.display()).yellow()
            );
            println!("Use --force to replace it.");
            return Err("catalog already exists".into());
        }
        std::fs::remove_file(&path)?;
    }

    println!("{}", "Initializing Polystore catalog...".bold().green());
    config.bootstrap_defaults = true;
    let catalog = CatalogManager::open(config)?;
    let snapshot = catalog.snapshot();
    catalog.close();

    println!("  → Catalog file: {}", path.display());
    println!("  → Generation: {}", snapshot.id());
    println!(
        "  → {} namespace(s), {} adapter template(s), {} adapter(s), {} user(s)",
        snapshot.get_namespaces(None).len(),
        snapshot.get_adapter_templates().len(),
        snapshot.get_adapters().len(),
        snapshot.get_users().len()
    );
    println!("{}", "Done.".bold().green());
    Ok(())
}

pub fn handle_namespaces(
    target: &CatalogTarget,
    pattern: Option<String>,
    format: OutputFormat,
) -> CliResult {
    let snapshot = target.snapshot()?;
    let pattern = pattern.map(Pattern::new);
    print!(
        "{}",
        SnapshotFormatter::format(&namespace_listing(&snapshot, pattern.as_ref()), format)
    );
    Ok(())
}

pub fn handle_tables(
    target: &CatalogTarget,
    namespace: Option<String>,
    pattern: Option<String>,
    format: OutputFormat,
) -> CliResult {
    let snapshot = target.snapshot()?;
    let namespace = namespace.map(Pattern::new);
    let pattern = pattern.map(Pattern::new);
    print!(
        "{}",
        SnapshotFormatter::format(
            &table_listing(&snapshot, namespace.as_ref(), pattern.as_ref()),
            format
        )
    );
    Ok(())
}

pub fn handle_adapters(target: &CatalogTarget, format: OutputFormat) -> CliResult {
    let snapshot = target.snapshot()?;
    print!("{}", SnapshotFormatter::format(&adapter_listing(&snapshot), format));
    Ok(())
}

pub fn handle_placements(
    target: &CatalogTarget,
    namespace: &str,
    table: &str,
    format: OutputFormat,
) -> CliResult {
    let snapshot = target.snapshot()?;
    let listing = placement_listing(&snapshot, namespace, table)?;
    print!("{}", SnapshotFormatter::format(&listing, format));
    Ok(())
}

/// Print a drop plan without applying it
pub fn handle_drop_plan(target: &CatalogTarget, namespace: &str, table: Option<&str>) -> CliResult {
    let snapshot = target.snapshot()?;
    let (subject, object) = drop_subject(&snapshot, namespace, table)?;
    let plan: Vec<String> = snapshot
        .drop_plan(object)?
        .iter()
        .map(ToString::to_string)
        .collect();
    print!("{}", SnapshotFormatter::format_plan(&subject, &plan));
    Ok(())
}

fn namespace_id(snapshot: &Snapshot, name: &str) -> Result<NamespaceId, CatalogError> {
    snapshot
        .get_namespace_by_name(name)
        .map(|ns| ns.id)
        .ok_or_else(|| CatalogError::NamespaceNotFound(name.to_string()))
}

pub(crate) fn namespace_listing(snapshot: &Snapshot, pattern: Option<&Pattern>) -> Listing {
    let mut listing = Listing::new(
        "namespaces",
        vec!["id", "name", "data_model", "case_sensitive", "entities"],
    );
    for ns in snapshot.get_namespaces(pattern) {
        listing.push(vec![
            ns.id.to_string(),
            ns.name.clone(),
            ns.data_model.to_string(),
            ns.case_sensitive.to_string(),
            snapshot.get_entities(ns.id).len().to_string(),
        ]);
    }
    listing
}

pub(crate) fn table_listing(
    snapshot: &Snapshot,
    namespace: Option<&Pattern>,
    pattern: Option<&Pattern>,
) -> Listing {
    let mut listing = Listing::new(
        "tables",
        vec!["id", "namespace", "name", "type", "columns", "placements"],
    );
    let rel = snapshot.rel();
    for table in rel.get_tables(namespace, pattern) {
        let namespace = snapshot
            .get_namespace(table.namespace_id)
            .map(|ns| ns.name.clone())
            .unwrap_or_default();
        listing.push(vec![
            table.id.to_string(),
            namespace,
            table.name.clone(),
            format!("{:?}", table.entity_type),
            rel.get_columns(table.id).len().to_string(),
            snapshot.alloc().get_placements(table.id).len().to_string(),
        ]);
    }
    listing
}

pub(crate) fn adapter_listing(snapshot: &Snapshot) -> Listing {
    let mut listing = Listing::new(
        "adapters",
        vec!["id", "unique_name", "adapter", "mode", "writable", "placements"],
    );
    for adapter in snapshot.get_adapters() {
        listing.push(vec![
            adapter.id.to_string(),
            adapter.unique_name.clone(),
            adapter.adapter_name.clone(),
            adapter.mode.to_string(),
            adapter.capabilities().writable.to_string(),
            snapshot
                .alloc()
                .get_placements_on_adapter(adapter.id)
                .len()
                .to_string(),
        ]);
    }
    listing
}

pub(crate) fn placement_listing(
    snapshot: &Snapshot,
    namespace: &str,
    table: &str,
) -> Result<Listing, CatalogError> {
    let namespace_id = namespace_id(snapshot, namespace)?;
    let table = snapshot
        .rel()
        .get_table_by_name(namespace_id, table)
        .ok_or_else(|| CatalogError::EntityNotFound(format!("{}.{}", namespace, table)))?;

    let alloc = snapshot.alloc();
    let mut listing = Listing::new(
        format!("placements of {}.{}", namespace, table.name),
        vec!["id", "adapter", "type", "partitions", "columns"],
    );
    for placement in alloc.get_placements(table.id) {
        let adapter = snapshot
            .get_adapter(placement.adapter_id)
            .map(|a| a.unique_name.clone())
            .unwrap_or_else(|| placement.adapter_id.to_string());
        listing.push(vec![
            placement.id.to_string(),
            adapter,
            format!("{:?}", placement.placement_type),
            alloc.get_allocations(placement.id).len().to_string(),
            alloc.column_allocs_on_placement(placement.id).len().to_string(),
        ]);
    }
    Ok(listing)
}

fn drop_subject(
    snapshot: &Snapshot,
    namespace: &str,
    table: Option<&str>,
) -> Result<(String, CatalogObject), CatalogError> {
    let namespace_id = namespace_id(snapshot, namespace)?;
    match table {
        None => Ok((
            format!("namespace '{}'", namespace),
            CatalogObject::Namespace(namespace_id),
        )),
        Some(name) => {
            let entity = snapshot
                .get_entities(namespace_id)
                .into_iter()
                .find(|e| e.name().eq_ignore_ascii_case(name))
                .ok_or_else(|| CatalogError::EntityNotFound(format!("{}.{}", namespace, name)))?;
            Ok((
                format!("'{}.{}'", namespace, entity.name()),
                CatalogObject::Entity(entity.id()),
            ))
        }
    }
}
