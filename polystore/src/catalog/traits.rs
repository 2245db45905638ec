// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Logical sub-catalog trait definition
//!
//! Every namespace owns exactly one logical sub-catalog whose concrete type is
//! fixed by the namespace's data model. The trait is the model-agnostic part of
//! that contract: entity enumeration, lookup, rename and removal. Model-specific
//! children (columns, keys, indexes) live on the concrete catalogs.

use super::entity::{DataModel, LogicalEntity, LogicalNamespace};
use super::error::{CatalogError, CatalogResult};
use super::id::EntityId;
use super::pattern::{names_equal, Pattern};

/// Core trait that every per-namespace logical catalog implements
pub trait LogicalCatalog: Send + Sync {
    /// The namespace record this catalog belongs to
    fn namespace(&self) -> &LogicalNamespace;

    /// Replace the namespace record, used by namespace rename
    ///
    /// The data model of a namespace is immutable, so implementations reject
    /// a record with a different model.
    fn set_namespace(&mut self, namespace: LogicalNamespace) -> CatalogResult<()>;

    /// All entities of this namespace, ordered by id
    fn entities(&self) -> Vec<LogicalEntity>;

    /// Look up one entity by id
    fn entity(&self, id: EntityId) -> Option<LogicalEntity>;

    /// Rename an entity, keeping names unique inside the namespace
    fn rename_entity(&mut self, id: EntityId, name: &str) -> CatalogResult<()>;

    /// Remove an entity together with every child it owns
    ///
    /// # Returns
    /// * `Ok(LogicalEntity)` with the removed record
    /// * `Err(CatalogError::EntityNotFound)` if the id is unknown
    fn remove_entity(&mut self, id: EntityId) -> CatalogResult<LogicalEntity>;

    fn data_model(&self) -> DataModel {
        self.namespace().data_model
    }

    fn entity_ids(&self) -> Vec<EntityId> {
        self.entities().iter().map(LogicalEntity::id).collect()
    }

    fn is_empty(&self) -> bool {
        self.entities().is_empty()
    }

    /// Exact-name lookup honouring the namespace's case sensitivity
    fn entity_by_name(&self, name: &str) -> Option<LogicalEntity> {
        let case_sensitive = self.namespace().case_sensitive;
        self.entities()
            .into_iter()
            .find(|e| names_equal(e.name(), name, case_sensitive))
    }

    /// Entities whose name matches `pattern`, or all of them
    fn entities_matching(&self, pattern: Option<&Pattern>) -> Vec<LogicalEntity> {
        let case_sensitive = self.namespace().case_sensitive;
        self.entities()
            .into_iter()
            .filter(|e| pattern.map_or(true, |p| p.matches(e.name(), case_sensitive)))
            .collect()
    }

    /// Fail with `AlreadyExists` if `name` is taken in this namespace
    fn ensure_name_free(&self, name: &str) -> CatalogResult<()> {
        match self.entity_by_name(name) {
            Some(existing) => Err(CatalogError::AlreadyExists(format!(
                "entity '{}' in namespace '{}'",
                existing.name(),
                self.namespace().name
            ))),
            None => Ok(()),
        }
    }
}
