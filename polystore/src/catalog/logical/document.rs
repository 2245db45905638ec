// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Document logical catalog

use crate::catalog::entity::{
    DataModel, EntityType, LogicalCollection, LogicalEntity, LogicalNamespace,
};
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::id::EntityId;
use crate::catalog::traits::LogicalCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Collections of one document namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCatalog {
    namespace: LogicalNamespace,
    collections: BTreeMap<EntityId, LogicalCollection>,
}

impl DocumentCatalog {
    pub fn new(namespace: LogicalNamespace) -> Self {
        Self {
            namespace,
            collections: BTreeMap::new(),
        }
    }

    pub fn add_collection(
        &mut self,
        id: EntityId,
        name: &str,
        entity_type: EntityType,
    ) -> CatalogResult<LogicalCollection> {
        self.ensure_name_free(name)?;
        let collection = LogicalCollection {
            id,
            namespace_id: self.namespace.id,
            name: name.to_string(),
            entity_type,
        };
        self.collections.insert(id, collection.clone());
        Ok(collection)
    }

    pub fn collection(&self, id: EntityId) -> Option<&LogicalCollection> {
        self.collections.get(&id)
    }

    pub fn collections(&self) -> impl Iterator<Item = &LogicalCollection> {
        self.collections.values()
    }
}

impl LogicalCatalog for DocumentCatalog {
    fn namespace(&self) -> &LogicalNamespace {
        &self.namespace
    }

    fn set_namespace(&mut self, namespace: LogicalNamespace) -> CatalogResult<()> {
        if namespace.data_model != DataModel::Document {
            return Err(CatalogError::DataModelMismatch {
                expected: DataModel::Document.to_string(),
                found: namespace.data_model.to_string(),
            });
        }
        self.namespace = namespace;
        Ok(())
    }

    fn entities(&self) -> Vec<LogicalEntity> {
        self.collections
            .values()
            .cloned()
            .map(LogicalEntity::Collection)
            .collect()
    }

    fn entity(&self, id: EntityId) -> Option<LogicalEntity> {
        self.collections
            .get(&id)
            .cloned()
            .map(LogicalEntity::Collection)
    }

    fn rename_entity(&mut self, id: EntityId, name: &str) -> CatalogResult<()> {
        if let Some(other) = self.entity_by_name(name) {
            if other.id() != id {
                return Err(CatalogError::AlreadyExists(format!(
                    "collection '{}' in namespace '{}'",
                    other.name(),
                    self.namespace.name
                )));
            }
        }
        let collection = self
            .collections
            .get_mut(&id)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("collection {}", id)))?;
        collection.name = name.to_string();
        Ok(())
    }

    fn remove_entity(&mut self, id: EntityId) -> CatalogResult<LogicalEntity> {
        self.collections
            .remove(&id)
            .map(LogicalEntity::Collection)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("collection {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::NamespaceId;

    #[test]
    fn test_collection_lifecycle() {
        let mut catalog = DocumentCatalog::new(LogicalNamespace::new(
            NamespaceId::new(3),
            "docs".to_string(),
            DataModel::Document,
            true,
        ));
        catalog
            .add_collection(EntityId::new(1), "users", EntityType::Entity)
            .unwrap();
        // Case-sensitive namespace: differently cased names coexist
        catalog
            .add_collection(EntityId::new(2), "Users", EntityType::Entity)
            .unwrap();
        assert!(catalog
            .add_collection(EntityId::new(3), "users", EntityType::Entity)
            .is_err());

        catalog.rename_entity(EntityId::new(2), "people").unwrap();
        assert_eq!(catalog.collection(EntityId::new(2)).unwrap().name, "people");

        catalog.remove_entity(EntityId::new(1)).unwrap();
        assert_eq!(catalog.entity_ids(), vec![EntityId::new(2)]);
    }

    #[test]
    fn test_data_model_is_fixed() {
        let ns = LogicalNamespace::new(
            NamespaceId::new(3),
            "docs".to_string(),
            DataModel::Document,
            false,
        );
        let mut catalog = DocumentCatalog::new(ns.clone());
        let mut relational = ns;
        relational.data_model = DataModel::Relational;
        assert!(matches!(
            catalog.set_namespace(relational),
            Err(CatalogError::DataModelMismatch { .. })
        ));
    }
}
