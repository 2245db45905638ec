// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph logical catalog: named property graphs of one graph namespace

use crate::catalog::entity::{DataModel, LogicalEntity, LogicalGraph, LogicalNamespace};
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::id::EntityId;
use crate::catalog::traits::LogicalCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphCatalog {
    namespace: LogicalNamespace,
    graphs: BTreeMap<EntityId, LogicalGraph>,
}

impl GraphCatalog {
    pub fn new(namespace: LogicalNamespace) -> Self {
        Self {
            namespace,
            graphs: BTreeMap::new(),
        }
    }

    pub fn add_graph(&mut self, id: EntityId, name: &str) -> CatalogResult<LogicalGraph> {
        self.ensure_name_free(name)?;
        let graph = LogicalGraph {
            id,
            namespace_id: self.namespace.id,
            name: name.to_string(),
        };
        self.graphs.insert(id, graph.clone());
        Ok(graph)
    }

    pub fn graph(&self, id: EntityId) -> Option<&LogicalGraph> {
        self.graphs.get(&id)
    }

    pub fn graphs(&self) -> impl Iterator<Item = &LogicalGraph> {
        self.graphs.values()
    }
}

impl LogicalCatalog for GraphCatalog {
    fn namespace(&self) -> &LogicalNamespace {
        &self.namespace
    }

    fn set_namespace(&mut self, namespace: LogicalNamespace) -> CatalogResult<()> {
        if namespace.data_model != DataModel::Graph {
            return Err(CatalogError::DataModelMismatch {
                expected: DataModel::Graph.to_string(),
                found: namespace.data_model.to_string(),
            });
        }
        self.namespace = namespace;
        Ok(())
    }

    fn entities(&self) -> Vec<LogicalEntity> {
        self.graphs.values().cloned().map(LogicalEntity::Graph).collect()
    }

    fn entity(&self, id: EntityId) -> Option<LogicalEntity> {
        self.graphs.get(&id).cloned().map(LogicalEntity::Graph)
    }

    fn rename_entity(&mut self, id: EntityId, name: &str) -> CatalogResult<()> {
        if let Some(other) = self.entity_by_name(name) {
            if other.id() != id {
                return Err(CatalogError::AlreadyExists(format!(
                    "graph '{}' in namespace '{}'",
                    other.name(),
                    self.namespace.name
                )));
            }
        }
        let graph = self
            .graphs
            .get_mut(&id)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("graph {}", id)))?;
        graph.name = name.to_string();
        Ok(())
    }

    fn remove_entity(&mut self, id: EntityId) -> CatalogResult<LogicalEntity> {
        self.graphs
            .remove(&id)
            .map(LogicalEntity::Graph)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("graph {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::NamespaceId;

    #[test]
    fn test_multiple_named_graphs() {
        let mut catalog = GraphCatalog::new(LogicalNamespace::new(
            NamespaceId::new(7),
            "social".to_string(),
            DataModel::Graph,
            false,
        ));
        catalog.add_graph(EntityId::new(1), "friends").unwrap();
        catalog.add_graph(EntityId::new(2), "follows").unwrap();
        assert!(catalog.add_graph(EntityId::new(3), "FRIENDS").is_err());
        assert_eq!(catalog.graphs().count(), 2);
        assert_eq!(
            catalog.entity(EntityId::new(2)).unwrap().data_model(),
            DataModel::Graph
        );
    }
}
