// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Physical entity handles

use super::namespace::DataModel;
use crate::catalog::id::{
    AdapterId, AllocationId, EntityId, NamespaceId, PartitionId, PhysicalId, PlacementId,
};
use serde::{Deserialize, Serialize};

/// The adapter-local handle realizing one allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalEntity {
    pub id: PhysicalId,
    pub allocation_id: AllocationId,
    pub placement_id: PlacementId,
    pub partition_id: PartitionId,
    pub logical_id: EntityId,
    pub namespace_id: NamespaceId,
    pub adapter_id: AdapterId,
    pub data_model: DataModel,
    pub physical_namespace_name: String,
    pub physical_name: String,
}
