// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Physical catalog: adapter-side handles, one per allocation

use super::entity::PhysicalEntity;
use super::error::{CatalogError, CatalogResult};
use super::id::{AdapterId, AllocationId, PhysicalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalCatalog {
    entities: BTreeMap<PhysicalId, PhysicalEntity>,
}

impl PhysicalCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: PhysicalEntity) -> CatalogResult<()> {
        if let Some(existing) = self.by_allocation(entity.allocation_id) {
            return Err(CatalogError::AlreadyExists(format!(
                "physical entity {} for allocation {}",
                existing.id, entity.allocation_id
            )));
        }
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    pub fn get(&self, id: PhysicalId) -> Option<&PhysicalEntity> {
        self.entities.get(&id)
    }

    pub fn by_allocation(&self, allocation_id: AllocationId) -> Option<&PhysicalEntity> {
        self.entities
            .values()
            .find(|e| e.allocation_id == allocation_id)
    }

    pub fn on_adapter(&self, adapter_id: AdapterId) -> Vec<&PhysicalEntity> {
        self.entities
            .values()
            .filter(|e| e.adapter_id == adapter_id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicalEntity> {
        self.entities.values()
    }

    pub fn remove(&mut self, id: PhysicalId) -> CatalogResult<PhysicalEntity> {
        self.entities
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("physical entity {}", id)))
    }
}
