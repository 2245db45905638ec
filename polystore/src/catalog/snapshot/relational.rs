// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Relational read view

use super::{exactly_one, Snapshot};
use crate::catalog::entity::{
    LogicalColumn, LogicalConstraint, LogicalIndex, LogicalKey, LogicalTable,
};
use crate::catalog::error::CatalogResult;
use crate::catalog::id::{ConstraintId, EntityId, FieldId, IndexId, KeyId, NamespaceId};
use crate::catalog::logical::RelationalCatalog;
use crate::catalog::pattern::{names_equal, Pattern};
use crate::catalog::traits::LogicalCatalog;

/// Tables, columns, keys, constraints and indexes of a snapshot
#[derive(Debug, Clone, Copy)]
pub struct RelSnapshot<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> RelSnapshot<'a> {
    pub(super) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    fn catalog(&self, namespace_id: NamespaceId) -> Option<&'a RelationalCatalog> {
        self.snapshot
            .namespace_catalog(namespace_id)
            .and_then(|c| c.relational())
    }

    fn catalogs(&self) -> impl Iterator<Item = &'a RelationalCatalog> {
        self.snapshot
            .state
            .logical
            .values()
            .filter_map(|c| c.relational())
    }

    fn owning_catalog(&self, table_id: EntityId) -> Option<&'a RelationalCatalog> {
        self.catalog(self.snapshot.entity_owner(table_id)?)
    }

    pub fn get_table(&self, id: EntityId) -> Option<&'a LogicalTable> {
        self.owning_catalog(id)?.table(id)
    }

    pub fn get_table_by_name(
        &self,
        namespace_id: NamespaceId,
        name: &str,
    ) -> Option<&'a LogicalTable> {
        let catalog = self.catalog(namespace_id)?;
        let case_sensitive = catalog.namespace().case_sensitive;
        catalog
            .tables()
            .find(|t| names_equal(&t.name, name, case_sensitive))
    }

    /// Tables whose namespace matches `namespace` and whose name matches
    /// `table`; `None` matches everything
    pub fn get_tables(
        &self,
        namespace: Option<&Pattern>,
        table: Option<&Pattern>,
    ) -> Vec<&'a LogicalTable> {
        self.catalogs()
            .filter(|c| {
                let ns = c.namespace();
                namespace.map_or(true, |p| p.matches(&ns.name, ns.case_sensitive))
            })
            .flat_map(|c| {
                let case_sensitive = c.namespace().case_sensitive;
                c.tables()
                    .filter(move |t| table.map_or(true, |p| p.matches(&t.name, case_sensitive)))
            })
            .collect()
    }

    /// The single table of a namespace matching `pattern`
    pub fn find_table(
        &self,
        namespace_id: NamespaceId,
        pattern: &Pattern,
    ) -> CatalogResult<&'a LogicalTable> {
        let matches: Vec<&'a LogicalTable> = match self.catalog(namespace_id) {
            Some(catalog) => {
                let case_sensitive = catalog.namespace().case_sensitive;
                catalog
                    .tables()
                    .filter(|t| pattern.matches(&t.name, case_sensitive))
                    .collect()
            }
            None => Vec::new(),
        };
        exactly_one(pattern, matches)
    }

    pub fn get_column(&self, id: FieldId) -> Option<&'a LogicalColumn> {
        self.catalog(self.snapshot.field_owner(id)?)?.column(id)
    }

    /// Columns of a table ordered by position
    pub fn get_columns(&self, table_id: EntityId) -> Vec<&'a LogicalColumn> {
        self.owning_catalog(table_id)
            .map(|c| c.columns(table_id))
            .unwrap_or_default()
    }

    pub fn get_column_by_name(
        &self,
        table_id: EntityId,
        name: &str,
    ) -> Option<&'a LogicalColumn> {
        self.owning_catalog(table_id)?.column_by_name(table_id, name)
    }

    pub fn get_key(&self, id: KeyId) -> Option<&'a LogicalKey> {
        self.catalog(self.snapshot.key_owner(id)?)?.key(id)
    }

    pub fn get_keys(&self, table_id: EntityId) -> Vec<&'a LogicalKey> {
        self.owning_catalog(table_id)
            .map(|c| c.keys(table_id))
            .unwrap_or_default()
    }

    pub fn get_primary_key(&self, table_id: EntityId) -> Option<&'a LogicalKey> {
        self.owning_catalog(table_id)?.primary_key(table_id)
    }

    pub fn get_foreign_keys(&self, table_id: EntityId) -> Vec<&'a LogicalKey> {
        self.owning_catalog(table_id)
            .map(|c| c.foreign_keys(table_id))
            .unwrap_or_default()
    }

    /// Foreign keys of other tables that reference `table_id`
    pub fn get_exported_keys(&self, table_id: EntityId) -> Vec<&'a LogicalKey> {
        self.owning_catalog(table_id)
            .map(|c| c.exported_keys(table_id))
            .unwrap_or_default()
    }

    pub fn get_constraint(&self, id: ConstraintId) -> Option<&'a LogicalConstraint> {
        self.catalogs().find_map(|c| c.constraint(id))
    }

    pub fn get_constraints(&self, table_id: EntityId) -> Vec<&'a LogicalConstraint> {
        self.owning_catalog(table_id)
            .map(|c| c.constraints(table_id))
            .unwrap_or_default()
    }

    pub fn get_index(&self, id: IndexId) -> Option<&'a LogicalIndex> {
        self.catalog(self.snapshot.index_owner(id)?)?.index(id)
    }

    pub fn get_indexes(&self, table_id: EntityId) -> Vec<&'a LogicalIndex> {
        self.owning_catalog(table_id)
            .map(|c| c.indexes(table_id))
            .unwrap_or_default()
    }
}
