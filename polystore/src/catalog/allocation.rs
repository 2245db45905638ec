// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Allocation catalog
//!
//! Records how logical entities are laid out on adapters. The indirection is
//! placement -> partition -> column: a placement says an adapter stores some
//! slice of an entity, an allocation says which partition that placement
//! holds, and allocation columns say which columns of that partition the
//! adapter materializes.

use super::entity::{
    AllocationColumn, AllocationColumnKey, AllocationEntity, AllocationPartition,
    AllocationPartitionGroup, AllocationPlacement, PartitionBounds, PartitionGroupSpec,
    PartitionProperty, PartitionType,
};
use super::error::{CatalogError, CatalogResult};
use super::id::{
    AdapterId, AllocationId, EntityId, FieldId, NamespaceId, PartitionGroupId, PartitionId,
    PlacementId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A partition group with its ids already allocated
#[derive(Debug, Clone)]
pub struct PlannedGroup {
    pub id: PartitionGroupId,
    pub spec: PartitionGroupSpec,
    pub partition_ids: Vec<PartitionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationCatalog {
    properties: BTreeMap<EntityId, PartitionProperty>,
    groups: BTreeMap<PartitionGroupId, AllocationPartitionGroup>,
    partitions: BTreeMap<PartitionId, AllocationPartition>,
    placements: BTreeMap<PlacementId, AllocationPlacement>,
    allocations: BTreeMap<AllocationId, AllocationEntity>,
    #[serde(with = "column_records")]
    columns: BTreeMap<AllocationColumnKey, AllocationColumn>,
}

/// Allocation columns are persisted as a plain list; the key is derived
mod column_records {
    use crate::catalog::entity::{AllocationColumn, AllocationColumnKey};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(
        columns: &BTreeMap<AllocationColumnKey, AllocationColumn>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(columns.values())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<AllocationColumnKey, AllocationColumn>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let records = Vec::<AllocationColumn>::deserialize(deserializer)?;
        Ok(records.into_iter().map(|c| (c.key(), c)).collect())
    }
}

impl AllocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- partitioning -----------------------------------------------------

    pub fn property(&self, entity_id: EntityId) -> Option<&PartitionProperty> {
        self.properties.get(&entity_id)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PartitionProperty> {
        self.properties.values()
    }

    pub fn group(&self, id: PartitionGroupId) -> Option<&AllocationPartitionGroup> {
        self.groups.get(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &AllocationPartitionGroup> {
        self.groups.values()
    }

    pub fn partition(&self, id: PartitionId) -> Option<&AllocationPartition> {
        self.partitions.get(&id)
    }

    pub fn partitions(&self) -> impl Iterator<Item = &AllocationPartition> {
        self.partitions.values()
    }

    /// Partition an entity horizontally
    ///
    /// Any previous layout is replaced. Rejected once the entity has a
    /// placement, since existing allocations would no longer line up with
    /// the partitions.
    pub fn partition_entity(
        &mut self,
        entity_id: EntityId,
        namespace_id: NamespaceId,
        partition_type: PartitionType,
        partition_column: Option<FieldId>,
        groups: Vec<PlannedGroup>,
    ) -> CatalogResult<PartitionProperty> {
        if !self.placements_of(entity_id).is_empty() {
            return Err(CatalogError::InvalidOperation(format!(
                "entity {} already has placements and cannot be repartitioned",
                entity_id
            )));
        }
        if groups.is_empty() {
            return Err(CatalogError::InvalidOperation(
                "at least one partition group is required".to_string(),
            ));
        }
        match partition_type {
            PartitionType::None if groups.len() != 1 => {
                return Err(CatalogError::InvalidOperation(
                    "an unpartitioned entity has exactly one partition group".to_string(),
                ))
            }
            PartitionType::None => {}
            _ if partition_column.is_none() => {
                return Err(CatalogError::InvalidOperation(format!(
                    "{} partitioning needs a partition column",
                    partition_type
                )))
            }
            _ => {}
        }
        for group in &groups {
            if group.partition_ids.is_empty()
                || group.partition_ids.len() != group.spec.partition_count
            {
                return Err(CatalogError::InvalidOperation(format!(
                    "partition group '{}' expects {} partition(s), got {}",
                    group.spec.name,
                    group.spec.partition_count,
                    group.partition_ids.len()
                )));
            }
        }

        self.remove_entity(entity_id);

        let mut property = PartitionProperty {
            entity_id,
            partition_type,
            partition_column,
            group_ids: Vec::with_capacity(groups.len()),
            partition_ids: Vec::new(),
        };
        for group in groups {
            self.groups.insert(
                group.id,
                AllocationPartitionGroup {
                    id: group.id,
                    entity_id,
                    namespace_id,
                    name: group.spec.name.clone(),
                    bounds: group.spec.bounds.clone(),
                },
            );
            property.group_ids.push(group.id);
            for partition_id in group.partition_ids {
                self.partitions.insert(
                    partition_id,
                    AllocationPartition {
                        id: partition_id,
                        group_id: group.id,
                        entity_id,
                        namespace_id,
                        bounds: group.spec.bounds.clone(),
                    },
                );
                property.partition_ids.push(partition_id);
            }
        }
        self.properties.insert(entity_id, property.clone());
        Ok(property)
    }

    /// Give an entity its implicit single partition if it has no layout yet
    ///
    /// Returns the new property, or `None` when one already existed.
    pub fn ensure_default_partition(
        &mut self,
        entity_id: EntityId,
        namespace_id: NamespaceId,
        group_id: PartitionGroupId,
        partition_id: PartitionId,
    ) -> CatalogResult<Option<PartitionProperty>> {
        if self.properties.contains_key(&entity_id) {
            return Ok(None);
        }
        let group = PlannedGroup {
            id: group_id,
            spec: PartitionGroupSpec::new("default", PartitionBounds::Unbounded),
            partition_ids: vec![partition_id],
        };
        self.partition_entity(entity_id, namespace_id, PartitionType::None, None, vec![group])
            .map(Some)
    }

    // ---- placements -------------------------------------------------------

    pub fn placement(&self, id: PlacementId) -> Option<&AllocationPlacement> {
        self.placements.get(&id)
    }

    pub fn placements(&self) -> impl Iterator<Item = &AllocationPlacement> {
        self.placements.values()
    }

    pub fn placements_of(&self, entity_id: EntityId) -> Vec<&AllocationPlacement> {
        self.placements
            .values()
            .filter(|p| p.logical_id == entity_id)
            .collect()
    }

    pub fn placements_on(&self, adapter_id: AdapterId) -> Vec<&AllocationPlacement> {
        self.placements
            .values()
            .filter(|p| p.adapter_id == adapter_id)
            .collect()
    }

    pub fn placement_on(
        &self,
        entity_id: EntityId,
        adapter_id: AdapterId,
    ) -> Option<&AllocationPlacement> {
        self.placements
            .values()
            .find(|p| p.logical_id == entity_id && p.adapter_id == adapter_id)
    }

    /// Record a placement and one allocation per held partition
    pub fn add_placement(
        &mut self,
        placement: AllocationPlacement,
        held: Vec<(AllocationId, PartitionId)>,
    ) -> CatalogResult<Vec<AllocationEntity>> {
        if self
            .placement_on(placement.logical_id, placement.adapter_id)
            .is_some()
        {
            return Err(CatalogError::AlreadyExists(format!(
                "placement of entity {} on adapter {}",
                placement.logical_id, placement.adapter_id
            )));
        }
        if held.is_empty() {
            return Err(CatalogError::InvalidOperation(
                "a placement must hold at least one partition".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for (_, partition_id) in &held {
            if !seen.insert(*partition_id) {
                return Err(CatalogError::InvalidOperation(format!(
                    "partition {} listed twice for placement {}",
                    partition_id, placement.id
                )));
            }
            match self.partitions.get(partition_id) {
                Some(partition) if partition.entity_id == placement.logical_id => {}
                _ => {
                    return Err(CatalogError::NotFound(format!(
                        "partition {} of entity {}",
                        partition_id, placement.logical_id
                    )))
                }
            }
        }

        let allocations: Vec<_> = held
            .into_iter()
            .map(|(id, partition_id)| AllocationEntity {
                id,
                placement_id: placement.id,
                partition_id,
                logical_id: placement.logical_id,
                namespace_id: placement.namespace_id,
                adapter_id: placement.adapter_id,
            })
            .collect();
        for allocation in &allocations {
            self.allocations.insert(allocation.id, allocation.clone());
        }
        self.placements.insert(placement.id, placement);
        Ok(allocations)
    }

    pub fn allocation(&self, id: AllocationId) -> Option<&AllocationEntity> {
        self.allocations.get(&id)
    }

    pub fn allocations(&self) -> impl Iterator<Item = &AllocationEntity> {
        self.allocations.values()
    }

    pub fn allocations_of_placement(&self, placement_id: PlacementId) -> Vec<&AllocationEntity> {
        self.allocations
            .values()
            .filter(|a| a.placement_id == placement_id)
            .collect()
    }

    pub fn allocation_for(
        &self,
        placement_id: PlacementId,
        partition_id: PartitionId,
    ) -> Option<&AllocationEntity> {
        self.allocations
            .values()
            .find(|a| a.placement_id == placement_id && a.partition_id == partition_id)
    }

    // ---- allocation columns -----------------------------------------------

    /// Record that a placement materializes a column of one held partition
    pub fn add_column(&mut self, column: AllocationColumn) -> CatalogResult<()> {
        let key = column.key();
        if self.columns.contains_key(&key) {
            return Err(CatalogError::AlreadyExists(format!(
                "allocation of column {} on placement {} partition {}",
                key.column_id, key.placement_id, key.partition_id
            )));
        }
        if self.allocation_for(key.placement_id, key.partition_id).is_none() {
            return Err(CatalogError::InvalidOperation(format!(
                "placement {} does not hold partition {}",
                key.placement_id, key.partition_id
            )));
        }
        self.columns.insert(key, column);
        Ok(())
    }

    pub fn column(&self, key: &AllocationColumnKey) -> Option<&AllocationColumn> {
        self.columns.get(key)
    }

    pub fn columns(&self) -> impl Iterator<Item = &AllocationColumn> {
        self.columns.values()
    }

    pub fn columns_of_placement(&self, placement_id: PlacementId) -> Vec<&AllocationColumn> {
        self.columns
            .values()
            .filter(|c| c.placement_id == placement_id)
            .collect()
    }

    pub fn columns_of_logical(&self, column_id: FieldId) -> Vec<&AllocationColumn> {
        self.columns
            .values()
            .filter(|c| c.column_id == column_id)
            .collect()
    }

    // ---- removal ----------------------------------------------------------

    pub fn remove_column(&mut self, key: &AllocationColumnKey) -> CatalogResult<AllocationColumn> {
        self.columns.remove(key).ok_or_else(|| {
            CatalogError::NotFound(format!(
                "allocation of column {} on placement {} partition {}",
                key.column_id, key.placement_id, key.partition_id
            ))
        })
    }

    /// Remove an allocation together with the columns materialized for it
    pub fn remove_allocation(&mut self, id: AllocationId) -> CatalogResult<AllocationEntity> {
        let allocation = self
            .allocations
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("allocation {}", id)))?;
        self.columns.retain(|k, _| {
            !(k.placement_id == allocation.placement_id
                && k.partition_id == allocation.partition_id)
        });
        Ok(allocation)
    }

    /// Remove a placement with its allocations and allocation columns
    pub fn remove_placement(&mut self, id: PlacementId) -> CatalogResult<AllocationPlacement> {
        let placement = self
            .placements
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("placement {}", id)))?;
        self.allocations.retain(|_, a| a.placement_id != id);
        self.columns.retain(|k, _| k.placement_id != id);
        Ok(placement)
    }

    pub fn remove_partition(&mut self, id: PartitionId) -> CatalogResult<AllocationPartition> {
        let partition = self
            .partitions
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("partition {}", id)))?;
        if let Some(property) = self.properties.get_mut(&partition.entity_id) {
            property.partition_ids.retain(|p| *p != id);
        }
        let group_emptied = !self
            .partitions
            .values()
            .any(|p| p.group_id == partition.group_id);
        if group_emptied {
            self.groups.remove(&partition.group_id);
            self.forget_group(partition.entity_id, partition.group_id);
        }
        Ok(partition)
    }

    pub fn remove_group(&mut self, id: PartitionGroupId) -> CatalogResult<AllocationPartitionGroup> {
        let group = self
            .groups
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("partition group {}", id)))?;
        self.partitions.retain(|_, p| p.group_id != id);
        self.forget_group(group.entity_id, id);
        Ok(group)
    }

    /// Drop a removed group from its entity's layout; a layout left without
    /// groups is forgotten so the entity can be laid out again
    fn forget_group(&mut self, entity_id: EntityId, group_id: PartitionGroupId) {
        let Some(property) = self.properties.get_mut(&entity_id) else {
            return;
        };
        property.group_ids.retain(|g| *g != group_id);
        let partitions = &self.partitions;
        property
            .partition_ids
            .retain(|p| partitions.contains_key(p));
        if property.group_ids.is_empty() {
            self.properties.remove(&entity_id);
        }
    }

    /// Refresh the column positions recorded on a table's allocation columns
    pub fn sync_positions(&mut self, table_id: EntityId, positions: &BTreeMap<FieldId, u32>) {
        for column in self.columns.values_mut() {
            if column.logical_table_id != table_id {
                continue;
            }
            if let Some(position) = positions.get(&column.column_id) {
                column.position = *position;
            }
        }
    }

    /// Forget the partition layout of an entity
    pub fn remove_entity(&mut self, entity_id: EntityId) -> Option<PartitionProperty> {
        self.groups.retain(|_, g| g.entity_id != entity_id);
        self.partitions.retain(|_, p| p.entity_id != entity_id);
        self.properties.remove(&entity_id)
    }
}
