// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Allocation records: placements, partitions and column materializations

use crate::catalog::id::{
    AdapterId, AllocationId, EntityId, FieldId, NamespaceId, PartitionGroupId, PartitionId,
    PlacementId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementType {
    Manual,
    Automatic,
}

impl Default for PlacementType {
    fn default() -> Self {
        PlacementType::Manual
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionType {
    None,
    Range,
    List,
    Hash,
    RoundRobin,
}

impl fmt::Display for PartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartitionType::None => "NONE",
            PartitionType::Range => "RANGE",
            PartitionType::List => "LIST",
            PartitionType::Hash => "HASH",
            PartitionType::RoundRobin => "ROUNDROBIN",
        };
        write!(f, "{}", s)
    }
}

/// Bounds of a horizontal slice, interpreted by the partition function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionBounds {
    Unbounded,
    /// Lower bound inclusive, upper bound exclusive
    Range {
        lower: Option<String>,
        upper: Option<String>,
    },
    List(Vec<String>),
    /// Hash bucket index
    Bucket(u32),
}

/// Requested shape of one partition group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionGroupSpec {
    pub name: String,
    pub bounds: PartitionBounds,
    pub partition_count: usize,
}

impl PartitionGroupSpec {
    pub fn new(name: impl Into<String>, bounds: PartitionBounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            partition_count: 1,
        }
    }

    pub fn with_partitions(mut self, count: usize) -> Self {
        self.partition_count = count;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionProperty {
    pub entity_id: EntityId,
    pub partition_type: PartitionType,
    pub partition_column: Option<FieldId>,
    /// Groups in declaration order
    pub group_ids: Vec<PartitionGroupId>,
    /// Partitions in declaration order across all groups
    pub partition_ids: Vec<PartitionId>,
}

impl PartitionProperty {
    pub fn is_partitioned(&self) -> bool {
        self.partition_type != PartitionType::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPartitionGroup {
    pub id: PartitionGroupId,
    pub entity_id: EntityId,
    pub namespace_id: NamespaceId,
    pub name: String,
    pub bounds: PartitionBounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPartition {
    pub id: PartitionId,
    pub group_id: PartitionGroupId,
    pub entity_id: EntityId,
    pub namespace_id: NamespaceId,
    pub bounds: PartitionBounds,
}

/// "This adapter stores (some slice of) this entity"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlacement {
    pub id: PlacementId,
    pub logical_id: EntityId,
    pub namespace_id: NamespaceId,
    pub adapter_id: AdapterId,
    pub placement_type: PlacementType,
}

/// One partition held by one placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntity {
    pub id: AllocationId,
    pub placement_id: PlacementId,
    pub partition_id: PartitionId,
    pub logical_id: EntityId,
    pub namespace_id: NamespaceId,
    pub adapter_id: AdapterId,
}

/// Key of an allocation column: at most one record per triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocationColumnKey {
    pub placement_id: PlacementId,
    pub partition_id: PartitionId,
    pub column_id: FieldId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationColumn {
    pub placement_id: PlacementId,
    pub partition_id: PartitionId,
    pub column_id: FieldId,
    pub logical_table_id: EntityId,
    pub namespace_id: NamespaceId,
    pub adapter_id: AdapterId,
    pub placement_type: PlacementType,
    /// Position of the column inside the adapter's physical representation
    pub position: u32,
}

impl AllocationColumn {
    pub fn key(&self) -> AllocationColumnKey {
        AllocationColumnKey {
            placement_id: self.placement_id,
            partition_id: self.partition_id,
            column_id: self.column_id,
        }
    }
}
