// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Physical read view

use super::Snapshot;
use crate::catalog::entity::{DataModel, PhysicalEntity};
use crate::catalog::id::{AdapterId, AllocationId, PhysicalId};
use crate::catalog::state::CatalogState;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(super) struct PhysicalIndex {
    by_allocation: HashMap<AllocationId, PhysicalId>,
    by_adapter: HashMap<AdapterId, Vec<PhysicalId>>,
}

impl PhysicalIndex {
    pub(super) fn build(state: &CatalogState) -> Self {
        let mut index = Self::default();
        for entity in state.physical.iter() {
            index.by_allocation.insert(entity.allocation_id, entity.id);
            index
                .by_adapter
                .entry(entity.adapter_id)
                .or_default()
                .push(entity.id);
        }
        index
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicalSnapshot<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> PhysicalSnapshot<'a> {
    pub(super) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn get_physical(&self, id: PhysicalId) -> Option<&'a PhysicalEntity> {
        self.snapshot.state.physical.get(id)
    }

    pub fn get_physical_by_allocation(&self, allocation_id: AllocationId) -> Option<&'a PhysicalEntity> {
        let id = self.snapshot.physical_index.by_allocation.get(&allocation_id)?;
        self.get_physical(*id)
    }

    pub fn get_physicals_on_adapter(&self, adapter_id: AdapterId) -> Vec<&'a PhysicalEntity> {
        self.snapshot
            .physical_index
            .by_adapter
            .get(&adapter_id)
            .map(|ids| ids.iter().filter_map(|id| self.get_physical(*id)).collect())
            .unwrap_or_default()
    }

    fn typed(&self, id: PhysicalId, model: DataModel) -> Option<&'a PhysicalEntity> {
        self.get_physical(id).filter(|p| p.data_model == model)
    }

    pub fn get_physical_table(&self, id: PhysicalId) -> Option<&'a PhysicalEntity> {
        self.typed(id, DataModel::Relational)
    }

    pub fn get_physical_collection(&self, id: PhysicalId) -> Option<&'a PhysicalEntity> {
        self.typed(id, DataModel::Document)
    }

    pub fn get_physical_graph(&self, id: PhysicalId) -> Option<&'a PhysicalEntity> {
        self.typed(id, DataModel::Graph)
    }
}
