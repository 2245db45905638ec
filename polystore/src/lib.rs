// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Polystore - catalog and snapshot kernel for a multi-model database
//!
//! One logical schema of tables, document collections and property graphs
//! is placed, partitioned and replicated across heterogeneous storage
//! adapters. This crate owns the metadata plane: it defines logical
//! entities, records how they map onto adapters, hands out identifiers and
//! publishes consistent point-in-time snapshots.
//!
//! # Usage
//!
//! ```rust,ignore
//! use polystore::{CatalogConfig, CatalogManager, DataModel, EntityType, Pattern};
//!
//! let catalog = CatalogManager::open(CatalogConfig::default())?;
//! let ns = catalog.create_namespace("sales", DataModel::Relational, false)?;
//! catalog.create_table(ns, "orders", EntityType::Entity, true)?;
//! catalog.commit()?;
//!
//! let snapshot = catalog.snapshot();
//! let orders = snapshot.rel().find_table(ns, &Pattern::literal("orders"))?;
//! ```

pub mod catalog;
pub mod config;

pub use catalog::context::{install, installed, uninstall};
pub use catalog::entity::{
    AdapterMode, AdapterSettings, ColumnSpec, DataModel, EntityType, ForeignKeySpec, IndexSpec,
    PartitionBounds, PartitionGroupSpec, PartitionType, PlacementType, PolyType,
};
pub use catalog::{
    CatalogChange, CatalogError, CatalogEvent, CatalogManager, CatalogObject, CatalogResult,
    Pattern, Snapshot,
};
pub use config::{CatalogConfig, StoreConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
