// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog records shared by the logical, allocation and physical layers

pub mod adapter;
pub mod allocation;
pub mod logical;
pub mod namespace;
pub mod physical;

pub use adapter::{
    AdapterCapabilities, AdapterInstance, AdapterKind, AdapterMode, AdapterSettings,
    AdapterTemplate, CatalogUser, QueryInterface, SettingsHook,
};
pub use allocation::{
    AllocationColumn, AllocationColumnKey, AllocationEntity, AllocationPartition,
    AllocationPartitionGroup, AllocationPlacement, PartitionBounds, PartitionGroupSpec,
    PartitionProperty, PartitionType, PlacementType,
};
pub use logical::{
    Collation, ColumnSpec, ConstraintType, EntityType, ForeignKeyInfo, ForeignKeyOption,
    ForeignKeySpec, IndexMethod, IndexSpec, KeyKind, LogicalCollection, LogicalColumn,
    LogicalConstraint, LogicalEntity, LogicalGraph, LogicalIndex, LogicalKey, LogicalTable,
    PolyType,
};
pub use namespace::{DataModel, LogicalNamespace};
pub use physical::PhysicalEntity;
