// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Document read view

use super::{exactly_one, Snapshot};
use crate::catalog::entity::LogicalCollection;
use crate::catalog::error::CatalogResult;
use crate::catalog::id::{EntityId, NamespaceId};
use crate::catalog::logical::DocumentCatalog;
use crate::catalog::pattern::Pattern;
use crate::catalog::traits::LogicalCatalog;

#[derive(Debug, Clone, Copy)]
pub struct DocSnapshot<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> DocSnapshot<'a> {
    pub(super) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    fn catalog(&self, namespace_id: NamespaceId) -> Option<&'a DocumentCatalog> {
        self.snapshot
            .namespace_catalog(namespace_id)
            .and_then(|c| c.document())
    }

    pub fn get_collection(&self, id: EntityId) -> Option<&'a LogicalCollection> {
        self.catalog(self.snapshot.entity_owner(id)?)?.collection(id)
    }

    /// Collections of a namespace whose name matches `pattern`
    pub fn get_collections(
        &self,
        namespace_id: NamespaceId,
        pattern: Option<&Pattern>,
    ) -> Vec<&'a LogicalCollection> {
        let Some(catalog) = self.catalog(namespace_id) else {
            return Vec::new();
        };
        let case_sensitive = catalog.namespace().case_sensitive;
        catalog
            .collections()
            .filter(|c| pattern.map_or(true, |p| p.matches(&c.name, case_sensitive)))
            .collect()
    }

    pub fn get_collection_by_name(
        &self,
        namespace_id: NamespaceId,
        name: &str,
    ) -> Option<&'a LogicalCollection> {
        self.get_collections(namespace_id, Some(&Pattern::literal(name)))
            .into_iter()
            .next()
    }

    pub fn find_collection(
        &self,
        namespace_id: NamespaceId,
        pattern: &Pattern,
    ) -> CatalogResult<&'a LogicalCollection> {
        exactly_one(pattern, self.get_collections(namespace_id, Some(pattern)))
    }
}
