// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! The complete, owned contents of a catalog
//!
//! `CatalogState` is what gets staged, validated, persisted and finally
//! frozen into a snapshot. It carries no indexes; those are built once per
//! snapshot.

use super::allocation::AllocationCatalog;
use super::entity::{
    AdapterInstance, AdapterTemplate, CatalogUser, LogicalEntity, LogicalNamespace,
    QueryInterface,
};
use super::error::{CatalogError, CatalogResult};
use super::id::{
    AdapterId, AdapterTemplateId, EntityId, InterfaceId, NamespaceId, ObservedIds, SnapshotId,
    UserId,
};
use super::logical::NamespaceCatalog;
use super::physical::PhysicalCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogState {
    pub(crate) logical: BTreeMap<NamespaceId, NamespaceCatalog>,
    pub(crate) allocation: AllocationCatalog,
    pub(crate) physical: PhysicalCatalog,
    pub(crate) templates: BTreeMap<AdapterTemplateId, AdapterTemplate>,
    pub(crate) adapters: BTreeMap<AdapterId, AdapterInstance>,
    pub(crate) interfaces: BTreeMap<InterfaceId, QueryInterface>,
    pub(crate) users: BTreeMap<UserId, CatalogUser>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &LogicalNamespace> {
        self.logical.values().map(NamespaceCatalog::namespace)
    }

    pub fn namespace(&self, id: NamespaceId) -> Option<&LogicalNamespace> {
        self.logical.get(&id).map(NamespaceCatalog::namespace)
    }

    pub(crate) fn namespace_catalog(&self, id: NamespaceId) -> CatalogResult<&NamespaceCatalog> {
        self.logical
            .get(&id)
            .ok_or_else(|| CatalogError::NamespaceNotFound(id.to_string()))
    }

    pub(crate) fn namespace_catalog_mut(
        &mut self,
        id: NamespaceId,
    ) -> CatalogResult<&mut NamespaceCatalog> {
        self.logical
            .get_mut(&id)
            .ok_or_else(|| CatalogError::NamespaceNotFound(id.to_string()))
    }

    /// Find a logical entity of any data model
    pub fn entity(&self, id: EntityId) -> Option<LogicalEntity> {
        self.logical
            .values()
            .find_map(|catalog| catalog.as_catalog().entity(id))
    }

    pub fn entities(&self) -> Vec<LogicalEntity> {
        self.logical
            .values()
            .flat_map(|catalog| catalog.as_catalog().entities())
            .collect()
    }

    /// Namespace owning an entity
    pub(crate) fn entity_namespace(&self, id: EntityId) -> CatalogResult<NamespaceId> {
        self.entity(id)
            .map(|e| e.namespace_id())
            .ok_or_else(|| CatalogError::EntityNotFound(id.to_string()))
    }

    pub fn adapter(&self, id: AdapterId) -> Option<&AdapterInstance> {
        self.adapters.get(&id)
    }

    pub fn template(&self, id: AdapterTemplateId) -> Option<&AdapterTemplate> {
        self.templates.get(&id)
    }

    /// Highest id of every kind, used to move the id counters past restored state
    pub(crate) fn observed_ids(&self, generation: SnapshotId) -> ObservedIds {
        fn max<I: Iterator<Item = u64>>(ids: I) -> Option<u64> {
            ids.max()
        }

        let relational: Vec<_> = self
            .logical
            .values()
            .filter_map(NamespaceCatalog::relational)
            .collect();

        ObservedIds {
            namespace: max(self.logical.keys().map(|id| id.as_u64())),
            entity: max(self.entities().iter().map(|e| e.id().as_u64())),
            field: max(relational
                .iter()
                .flat_map(|c| c.tables().flat_map(move |t| c.columns(t.id)))
                .map(|col| col.id.as_u64())),
            adapter: max(self.adapters.keys().map(|id| id.as_u64())),
            adapter_template: max(self.templates.keys().map(|id| id.as_u64())),
            interface: max(self.interfaces.keys().map(|id| id.as_u64())),
            key: max(relational
                .iter()
                .flat_map(|c| c.all_keys())
                .map(|k| k.id.as_u64())),
            index: max(relational
                .iter()
                .flat_map(|c| c.tables().flat_map(move |t| c.indexes(t.id)))
                .map(|i| i.id.as_u64())),
            constraint: max(relational
                .iter()
                .flat_map(|c| c.tables().flat_map(move |t| c.constraints(t.id)))
                .map(|con| con.id.as_u64())),
            user: max(self.users.keys().map(|id| id.as_u64())),
            group: max(self.allocation.groups().map(|g| g.id.as_u64())),
            partition: max(self.allocation.partitions().map(|p| p.id.as_u64())),
            placement: max(self.allocation.placements().map(|p| p.id.as_u64())),
            allocation: max(self.allocation.allocations().map(|a| a.id.as_u64())),
            physical: max(self.physical.iter().map(|p| p.id.as_u64())),
            snapshot: Some(generation.as_u64()),
        }
    }
}

/// What a `CatalogStore` keeps: the state of one published generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCatalog {
    pub generation: SnapshotId,
    pub state: CatalogState,
}
