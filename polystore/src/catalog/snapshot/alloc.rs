// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Allocation read view
//!
//! The placement -> partition -> column indirection makes the interesting
//! questions join-heavy, so the answers are indexed once per snapshot.

use super::Snapshot;
use crate::catalog::entity::{
    AllocationColumn, AllocationColumnKey, AllocationEntity, AllocationPartition,
    AllocationPartitionGroup, AllocationPlacement, PartitionProperty,
};
use crate::catalog::id::{
    AdapterId, AllocationId, EntityId, FieldId, PartitionGroupId, PartitionId, PlacementId,
};
use crate::catalog::state::CatalogState;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(super) struct AllocIndex {
    placements_by_entity: HashMap<EntityId, Vec<PlacementId>>,
    placement_by_entity_adapter: HashMap<(EntityId, AdapterId), PlacementId>,
    placements_by_adapter: HashMap<AdapterId, Vec<PlacementId>>,
    allocations_by_adapter: HashMap<AdapterId, Vec<AllocationId>>,
    allocations_by_placement: HashMap<PlacementId, Vec<AllocationId>>,
    columns_by_group: HashMap<(PartitionGroupId, FieldId), Vec<AllocationColumnKey>>,
    columns_by_column: HashMap<FieldId, Vec<AllocationColumnKey>>,
    columns_by_placement: HashMap<PlacementId, Vec<AllocationColumnKey>>,
    adapters_by_group: HashMap<PartitionGroupId, Vec<AdapterId>>,
}

impl AllocIndex {
    pub(super) fn build(state: &CatalogState) -> Self {
        let alloc = &state.allocation;
        let mut index = Self::default();

        for placement in alloc.placements() {
            index
                .placements_by_entity
                .entry(placement.logical_id)
                .or_default()
                .push(placement.id);
            index
                .placement_by_entity_adapter
                .insert((placement.logical_id, placement.adapter_id), placement.id);
            index
                .placements_by_adapter
                .entry(placement.adapter_id)
                .or_default()
                .push(placement.id);
        }

        for allocation in alloc.allocations() {
            index
                .allocations_by_adapter
                .entry(allocation.adapter_id)
                .or_default()
                .push(allocation.id);
            index
                .allocations_by_placement
                .entry(allocation.placement_id)
                .or_default()
                .push(allocation.id);
            if let Some(partition) = alloc.partition(allocation.partition_id) {
                let adapters = index
                    .adapters_by_group
                    .entry(partition.group_id)
                    .or_default();
                if !adapters.contains(&allocation.adapter_id) {
                    adapters.push(allocation.adapter_id);
                }
            }
        }

        for column in alloc.columns() {
            let key = column.key();
            if let Some(partition) = alloc.partition(column.partition_id) {
                index
                    .columns_by_group
                    .entry((partition.group_id, column.column_id))
                    .or_default()
                    .push(key);
            }
            index
                .columns_by_column
                .entry(column.column_id)
                .or_default()
                .push(key);
            index
                .columns_by_placement
                .entry(column.placement_id)
                .or_default()
                .push(key);
        }

        index
    }
}

/// Placements, partitions and column allocations of a snapshot
#[derive(Debug, Clone, Copy)]
pub struct AllocSnapshot<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> AllocSnapshot<'a> {
    pub(super) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    fn index(&self) -> &'a AllocIndex {
        &self.snapshot.alloc_index
    }

    fn columns(&self, keys: Option<&'a Vec<AllocationColumnKey>>) -> Vec<&'a AllocationColumn> {
        let alloc = &self.snapshot.state.allocation;
        keys.map(|keys| keys.iter().filter_map(|k| alloc.column(k)).collect())
            .unwrap_or_default()
    }

    // ---- placements -------------------------------------------------------

    pub fn get_placement(&self, id: PlacementId) -> Option<&'a AllocationPlacement> {
        self.snapshot.state.allocation.placement(id)
    }

    /// Every placement of an entity, one per adapter
    pub fn get_placements(&self, entity_id: EntityId) -> Vec<&'a AllocationPlacement> {
        let alloc = &self.snapshot.state.allocation;
        self.index()
            .placements_by_entity
            .get(&entity_id)
            .map(|ids| ids.iter().filter_map(|id| alloc.placement(*id)).collect())
            .unwrap_or_default()
    }

    /// The placement of an entity on one adapter, regardless of how many
    /// partitions it holds there
    pub fn get_placement_on(
        &self,
        entity_id: EntityId,
        adapter_id: AdapterId,
    ) -> Option<&'a AllocationPlacement> {
        let id = self
            .index()
            .placement_by_entity_adapter
            .get(&(entity_id, adapter_id))?;
        self.get_placement(*id)
    }

    pub fn get_placements_on_adapter(&self, adapter_id: AdapterId) -> Vec<&'a AllocationPlacement> {
        let alloc = &self.snapshot.state.allocation;
        self.index()
            .placements_by_adapter
            .get(&adapter_id)
            .map(|ids| ids.iter().filter_map(|id| alloc.placement(*id)).collect())
            .unwrap_or_default()
    }

    // ---- allocations ------------------------------------------------------

    pub fn get_allocation(&self, id: AllocationId) -> Option<&'a AllocationEntity> {
        self.snapshot.state.allocation.allocation(id)
    }

    pub fn get_allocations(&self, placement_id: PlacementId) -> Vec<&'a AllocationEntity> {
        let alloc = &self.snapshot.state.allocation;
        self.index()
            .allocations_by_placement
            .get(&placement_id)
            .map(|ids| ids.iter().filter_map(|id| alloc.allocation(*id)).collect())
            .unwrap_or_default()
    }

    pub fn get_allocations_on_adapter(&self, adapter_id: AdapterId) -> Vec<&'a AllocationEntity> {
        let alloc = &self.snapshot.state.allocation;
        self.index()
            .allocations_by_adapter
            .get(&adapter_id)
            .map(|ids| ids.iter().filter_map(|id| alloc.allocation(*id)).collect())
            .unwrap_or_default()
    }

    pub fn get_allocation_for(
        &self,
        placement_id: PlacementId,
        partition_id: PartitionId,
    ) -> Option<&'a AllocationEntity> {
        self.get_allocations(placement_id)
            .into_iter()
            .find(|a| a.partition_id == partition_id)
    }

    // ---- partitions -------------------------------------------------------

    pub fn get_partition_property(&self, entity_id: EntityId) -> Option<&'a PartitionProperty> {
        self.snapshot.state.allocation.property(entity_id)
    }

    pub fn is_partitioned(&self, entity_id: EntityId) -> bool {
        self.get_partition_property(entity_id)
            .map_or(false, PartitionProperty::is_partitioned)
    }

    pub fn get_partition_group(&self, id: PartitionGroupId) -> Option<&'a AllocationPartitionGroup> {
        self.snapshot.state.allocation.group(id)
    }

    /// Partition groups of an entity in declaration order
    pub fn get_partition_groups(&self, entity_id: EntityId) -> Vec<&'a AllocationPartitionGroup> {
        let alloc = &self.snapshot.state.allocation;
        self.get_partition_property(entity_id)
            .map(|p| p.group_ids.iter().filter_map(|id| alloc.group(*id)).collect())
            .unwrap_or_default()
    }

    pub fn get_partition(&self, id: PartitionId) -> Option<&'a AllocationPartition> {
        self.snapshot.state.allocation.partition(id)
    }

    /// Partitions of an entity in declaration order
    pub fn get_partitions(&self, entity_id: EntityId) -> Vec<&'a AllocationPartition> {
        let alloc = &self.snapshot.state.allocation;
        self.get_partition_property(entity_id)
            .map(|p| {
                p.partition_ids
                    .iter()
                    .filter_map(|id| alloc.partition(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ---- column allocations -----------------------------------------------

    pub fn get_column(&self, key: &AllocationColumnKey) -> Option<&'a AllocationColumn> {
        self.snapshot.state.allocation.column(key)
    }

    /// Allocation rows of one column inside one partition group of an entity
    pub fn column_allocs_by_partition_group(
        &self,
        entity_id: EntityId,
        group_id: PartitionGroupId,
        column_id: FieldId,
    ) -> Vec<&'a AllocationColumn> {
        self.columns(self.index().columns_by_group.get(&(group_id, column_id)))
            .into_iter()
            .filter(|c| c.logical_table_id == entity_id)
            .collect()
    }

    /// Every allocation of a logical column across adapters and partitions
    pub fn column_allocs_by_column(&self, column_id: FieldId) -> Vec<&'a AllocationColumn> {
        self.columns(self.index().columns_by_column.get(&column_id))
    }

    /// Columns a placement materializes, ordered by position
    pub fn column_allocs_on_placement(&self, placement_id: PlacementId) -> Vec<&'a AllocationColumn> {
        let mut columns = self.columns(self.index().columns_by_placement.get(&placement_id));
        columns.sort_by_key(|c| (c.partition_id, c.position));
        columns
    }

    /// Adapters holding at least one partition of a group
    pub fn adapters_by_partition_group(&self, group_id: PartitionGroupId) -> Vec<AdapterId> {
        self.index()
            .adapters_by_group
            .get(&group_id)
            .cloned()
            .unwrap_or_default()
    }
}
