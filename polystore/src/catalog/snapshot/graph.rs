// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph read view

use super::{exactly_one, Snapshot};
use crate::catalog::entity::LogicalGraph;
use crate::catalog::error::CatalogResult;
use crate::catalog::id::{EntityId, NamespaceId};
use crate::catalog::logical::GraphCatalog;
use crate::catalog::pattern::Pattern;
use crate::catalog::traits::LogicalCatalog;

#[derive(Debug, Clone, Copy)]
pub struct GraphSnapshot<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> GraphSnapshot<'a> {
    pub(super) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    fn catalog(&self, namespace_id: NamespaceId) -> Option<&'a GraphCatalog> {
        self.snapshot
            .namespace_catalog(namespace_id)
            .and_then(|c| c.graph())
    }

    pub fn get_graph(&self, id: EntityId) -> Option<&'a LogicalGraph> {
        self.catalog(self.snapshot.entity_owner(id)?)?.graph(id)
    }

    pub fn get_graphs(
        &self,
        namespace_id: NamespaceId,
        pattern: Option<&Pattern>,
    ) -> Vec<&'a LogicalGraph> {
        let Some(catalog) = self.catalog(namespace_id) else {
            return Vec::new();
        };
        let case_sensitive = catalog.namespace().case_sensitive;
        catalog
            .graphs()
            .filter(|g| pattern.map_or(true, |p| p.matches(&g.name, case_sensitive)))
            .collect()
    }

    pub fn get_graph_by_name(&self, namespace_id: NamespaceId, name: &str) -> Option<&'a LogicalGraph> {
        self.get_graphs(namespace_id, Some(&Pattern::literal(name)))
            .into_iter()
            .next()
    }

    pub fn find_graph(
        &self,
        namespace_id: NamespaceId,
        pattern: &Pattern,
    ) -> CatalogResult<&'a LogicalGraph> {
        exactly_one(pattern, self.get_graphs(namespace_id, Some(pattern)))
    }
}
