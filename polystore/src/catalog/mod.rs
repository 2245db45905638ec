// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Polystore catalog
//!
//! Logical definitions, their allocation onto adapters and the physical
//! handles behind them, published as immutable snapshots by one
//! `CatalogManager`.

pub mod allocation;
pub mod constraint;
pub mod context;
pub mod dependency;
pub mod entity;
pub mod error;
pub mod events;
pub mod id;
pub mod logical;
pub mod manager;
pub mod operations;
pub mod pattern;
pub mod physical;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod traits;

pub use constraint::{CommitConstraint, ConstraintHandle};
pub use error::{CatalogError, CatalogResult, ErrorCategory};
pub use events::CatalogEvent;
pub use id::IdBuilder;
pub use manager::CatalogManager;
pub use operations::{CatalogChange, CatalogObject};
pub use pattern::Pattern;
pub use snapshot::Snapshot;
pub use store::{CatalogStore, JsonFileStore, MemoryStore};
