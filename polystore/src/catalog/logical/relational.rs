// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Relational logical catalog
//!
//! Holds the tables of one relational namespace together with their columns,
//! keys, constraints and indexes. Ids are allocated by the caller; this type
//! only validates and records.

use crate::catalog::entity::{
    Collation, ColumnSpec, ConstraintType, DataModel, EntityType, ForeignKeyInfo, ForeignKeySpec,
    IndexSpec, KeyKind, LogicalColumn, LogicalConstraint, LogicalEntity, LogicalIndex, LogicalKey,
    LogicalNamespace, LogicalTable,
};
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::id::{ConstraintId, EntityId, FieldId, IndexId, KeyId};
use crate::catalog::pattern::names_equal;
use crate::catalog::traits::LogicalCatalog;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationalCatalog {
    namespace: LogicalNamespace,
    tables: BTreeMap<EntityId, LogicalTable>,
    columns: BTreeMap<FieldId, LogicalColumn>,
    keys: BTreeMap<KeyId, LogicalKey>,
    constraints: BTreeMap<ConstraintId, LogicalConstraint>,
    indexes: BTreeMap<IndexId, LogicalIndex>,
}

impl RelationalCatalog {
    pub fn new(namespace: LogicalNamespace) -> Self {
        Self {
            namespace,
            tables: BTreeMap::new(),
            columns: BTreeMap::new(),
            keys: BTreeMap::new(),
            constraints: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    fn case_sensitive(&self) -> bool {
        self.namespace.case_sensitive
    }

    // ---- tables -----------------------------------------------------------

    pub fn add_table(
        &mut self,
        id: EntityId,
        name: &str,
        entity_type: EntityType,
        modifiable: bool,
    ) -> CatalogResult<LogicalTable> {
        self.ensure_name_free(name)?;
        let table = LogicalTable {
            id,
            namespace_id: self.namespace.id,
            name: name.to_string(),
            entity_type,
            modifiable,
        };
        self.tables.insert(id, table.clone());
        Ok(table)
    }

    pub fn table(&self, id: EntityId) -> Option<&LogicalTable> {
        self.tables.get(&id)
    }

    pub fn tables(&self) -> impl Iterator<Item = &LogicalTable> {
        self.tables.values()
    }

    fn require_table(&self, id: EntityId) -> CatalogResult<&LogicalTable> {
        self.tables
            .get(&id)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("table {}", id)))
    }

    // ---- columns ----------------------------------------------------------

    /// Append a column to a table
    ///
    /// Character columns without an explicit collation get the
    /// case-insensitive default; other types may not carry a collation.
    pub fn add_column(
        &mut self,
        id: FieldId,
        table_id: EntityId,
        spec: ColumnSpec,
    ) -> CatalogResult<LogicalColumn> {
        let table_name = self.require_table(table_id)?.name.clone();
        if self.column_by_name(table_id, &spec.name).is_some() {
            return Err(CatalogError::AlreadyExists(format!(
                "column '{}' in table '{}'",
                spec.name, table_name
            )));
        }

        let collation = match (spec.poly_type.is_character(), spec.collation) {
            (true, None) => Some(Collation::default()),
            (true, collation) => collation,
            (false, None) => None,
            (false, Some(_)) => {
                return Err(CatalogError::InvalidOperation(format!(
                    "collation is only allowed on character columns, '{}' is {}",
                    spec.name, spec.poly_type
                )))
            }
        };

        let column = LogicalColumn {
            id,
            table_id,
            namespace_id: self.namespace.id,
            name: spec.name,
            position: self.columns(table_id).len() as u32 + 1,
            poly_type: spec.poly_type,
            length: spec.length,
            nullable: spec.nullable,
            collation,
            default_value: spec.default_value,
        };
        self.columns.insert(id, column.clone());
        Ok(column)
    }

    pub fn column(&self, id: FieldId) -> Option<&LogicalColumn> {
        self.columns.get(&id)
    }

    /// Columns of a table ordered by position
    pub fn columns(&self, table_id: EntityId) -> Vec<&LogicalColumn> {
        let mut columns: Vec<_> = self
            .columns
            .values()
            .filter(|c| c.table_id == table_id)
            .collect();
        columns.sort_by_key(|c| c.position);
        columns
    }

    pub fn column_by_name(&self, table_id: EntityId, name: &str) -> Option<&LogicalColumn> {
        let case_sensitive = self.case_sensitive();
        self.columns
            .values()
            .find(|c| c.table_id == table_id && names_equal(&c.name, name, case_sensitive))
    }

    /// Keys that either contain the column or point at it
    pub fn keys_using_column(&self, column_id: FieldId) -> Vec<&LogicalKey> {
        self.keys
            .values()
            .filter(|k| {
                k.column_ids.contains(&column_id)
                    || k
                        .foreign()
                        .map_or(false, |fk| fk.referenced_column_ids.contains(&column_id))
            })
            .collect()
    }

    /// Drop a column that no key uses
    pub fn drop_column(&mut self, id: FieldId) -> CatalogResult<LogicalColumn> {
        let column = self
            .column(id)
            .ok_or_else(|| CatalogError::NotFound(format!("column {}", id)))?;
        if let Some(key) = self.keys_using_column(id).first() {
            return Err(CatalogError::StillReferenced {
                object: format!("column '{}'", column.name),
                referenced_by: format!("key {}", key.id),
            });
        }
        self.remove_column(id)
    }

    /// Remove a column and close the gap in the positions of its table
    pub(crate) fn remove_column(&mut self, id: FieldId) -> CatalogResult<LogicalColumn> {
        let removed = self
            .columns
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("column {}", id)))?;
        for column in self.columns.values_mut() {
            if column.table_id == removed.table_id && column.position > removed.position {
                column.position -= 1;
            }
        }
        Ok(removed)
    }

    fn validate_key_columns(&self, table_id: EntityId, columns: &[FieldId]) -> CatalogResult<()> {
        if columns.is_empty() {
            return Err(CatalogError::InvalidOperation(
                "a key needs at least one column".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for column_id in columns {
            match self.columns.get(column_id) {
                Some(column) if column.table_id == table_id => {}
                _ => {
                    return Err(CatalogError::NotFound(format!(
                        "column {} of table {}",
                        column_id, table_id
                    )))
                }
            }
            if !seen.insert(*column_id) {
                return Err(CatalogError::InvalidOperation(format!(
                    "column {} listed twice in key",
                    column_id
                )));
            }
        }
        Ok(())
    }

    // ---- keys and constraints ---------------------------------------------

    /// Set the primary key of a table; a table has at most one
    ///
    /// Primary key columns become non-nullable.
    pub fn set_primary_key(
        &mut self,
        key_id: KeyId,
        constraint_id: ConstraintId,
        table_id: EntityId,
        columns: Vec<FieldId>,
    ) -> CatalogResult<LogicalKey> {
        let table_name = self.require_table(table_id)?.name.clone();
        self.validate_key_columns(table_id, &columns)?;
        if self.primary_key(table_id).is_some() {
            return Err(CatalogError::AlreadyExists(format!(
                "primary key of table '{}'",
                table_name
            )));
        }

        for column_id in &columns {
            if let Some(column) = self.columns.get_mut(column_id) {
                column.nullable = false;
            }
        }

        let key = LogicalKey {
            id: key_id,
            table_id,
            namespace_id: self.namespace.id,
            column_ids: columns,
            kind: KeyKind::Primary,
        };
        self.keys.insert(key_id, key.clone());
        self.constraints.insert(
            constraint_id,
            LogicalConstraint {
                id: constraint_id,
                key_id,
                table_id,
                name: format!("pk_{}", table_name),
                constraint_type: ConstraintType::Primary,
            },
        );
        Ok(key)
    }

    pub fn add_unique_constraint(
        &mut self,
        key_id: KeyId,
        constraint_id: ConstraintId,
        table_id: EntityId,
        name: &str,
        columns: Vec<FieldId>,
    ) -> CatalogResult<LogicalConstraint> {
        self.require_table(table_id)?;
        self.validate_key_columns(table_id, &columns)?;
        self.ensure_constraint_name_free(table_id, name)?;

        self.keys.insert(
            key_id,
            LogicalKey {
                id: key_id,
                table_id,
                namespace_id: self.namespace.id,
                column_ids: columns,
                kind: KeyKind::Unique,
            },
        );
        let constraint = LogicalConstraint {
            id: constraint_id,
            key_id,
            table_id,
            name: name.to_string(),
            constraint_type: ConstraintType::Unique,
        };
        self.constraints.insert(constraint_id, constraint.clone());
        Ok(constraint)
    }

    /// Add a foreign key
    ///
    /// The referenced columns must form a primary or unique key of the
    /// referenced table, which lives in the same namespace, and both column
    /// lists must have the same length.
    pub fn add_foreign_key(
        &mut self,
        key_id: KeyId,
        constraint_id: ConstraintId,
        table_id: EntityId,
        spec: ForeignKeySpec,
    ) -> CatalogResult<LogicalKey> {
        self.require_table(table_id)?;
        self.require_table(spec.referenced_table_id)?;
        self.validate_key_columns(table_id, &spec.columns)?;
        self.validate_key_columns(spec.referenced_table_id, &spec.referenced_columns)?;
        self.ensure_constraint_name_free(table_id, &spec.name)?;

        if spec.columns.len() != spec.referenced_columns.len() {
            return Err(CatalogError::InvalidOperation(format!(
                "foreign key '{}' has {} column(s) but references {}",
                spec.name,
                spec.columns.len(),
                spec.referenced_columns.len()
            )));
        }

        let referenced_key_id = self
            .keys
            .values()
            .find(|k| {
                k.table_id == spec.referenced_table_id
                    && k.is_referenceable()
                    && k.column_ids == spec.referenced_columns
            })
            .map(|k| k.id)
            .ok_or_else(|| {
                CatalogError::InvalidOperation(format!(
                    "foreign key '{}' must reference a primary or unique key",
                    spec.name
                ))
            })?;

        let key = LogicalKey {
            id: key_id,
            table_id,
            namespace_id: self.namespace.id,
            column_ids: spec.columns,
            kind: KeyKind::Foreign(ForeignKeyInfo {
                name: spec.name.clone(),
                referenced_key_id,
                referenced_table_id: spec.referenced_table_id,
                referenced_column_ids: spec.referenced_columns,
                on_update: spec.on_update,
                on_delete: spec.on_delete,
            }),
        };
        self.keys.insert(key_id, key.clone());
        self.constraints.insert(
            constraint_id,
            LogicalConstraint {
                id: constraint_id,
                key_id,
                table_id,
                name: spec.name,
                constraint_type: ConstraintType::Foreign,
            },
        );
        Ok(key)
    }

    fn ensure_constraint_name_free(&self, table_id: EntityId, name: &str) -> CatalogResult<()> {
        if self.constraint_by_name(table_id, name).is_some() {
            return Err(CatalogError::AlreadyExists(format!(
                "constraint '{}' on table {}",
                name, table_id
            )));
        }
        Ok(())
    }

    pub fn key(&self, id: KeyId) -> Option<&LogicalKey> {
        self.keys.get(&id)
    }

    pub fn keys(&self, table_id: EntityId) -> Vec<&LogicalKey> {
        self.keys.values().filter(|k| k.table_id == table_id).collect()
    }

    pub fn all_keys(&self) -> impl Iterator<Item = &LogicalKey> {
        self.keys.values()
    }

    pub fn primary_key(&self, table_id: EntityId) -> Option<&LogicalKey> {
        self.keys
            .values()
            .find(|k| k.table_id == table_id && k.is_primary())
    }

    /// Foreign keys declared on a table
    pub fn foreign_keys(&self, table_id: EntityId) -> Vec<&LogicalKey> {
        self.keys
            .values()
            .filter(|k| k.table_id == table_id && k.foreign().is_some())
            .collect()
    }

    /// Foreign keys of any table that point at `table_id`
    pub fn exported_keys(&self, table_id: EntityId) -> Vec<&LogicalKey> {
        self.keys
            .values()
            .filter(|k| {
                k.foreign()
                    .map_or(false, |fk| fk.referenced_table_id == table_id)
            })
            .collect()
    }

    /// Foreign keys that point at one specific key
    pub fn referencing_keys(&self, key_id: KeyId) -> Vec<&LogicalKey> {
        self.keys
            .values()
            .filter(|k| k.foreign().map_or(false, |fk| fk.referenced_key_id == key_id))
            .collect()
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&LogicalConstraint> {
        self.constraints.get(&id)
    }

    pub fn constraints(&self, table_id: EntityId) -> Vec<&LogicalConstraint> {
        self.constraints
            .values()
            .filter(|c| c.table_id == table_id)
            .collect()
    }

    pub fn constraint_by_name(&self, table_id: EntityId, name: &str) -> Option<&LogicalConstraint> {
        let case_sensitive = self.case_sensitive();
        self.constraints
            .values()
            .find(|c| c.table_id == table_id && names_equal(&c.name, name, case_sensitive))
    }

    /// Drop a constraint and the key behind it
    ///
    /// A key still referenced by a foreign key cannot go. A key still used by
    /// an index stays behind as a plain key.
    pub fn drop_constraint(&mut self, id: ConstraintId) -> CatalogResult<LogicalConstraint> {
        let constraint = self
            .constraint(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("constraint {}", id)))?;
        if let Some(referencing) = self
            .referencing_keys(constraint.key_id)
            .into_iter()
            .find(|k| k.id != constraint.key_id)
        {
            return Err(CatalogError::StillReferenced {
                object: format!("constraint '{}'", constraint.name),
                referenced_by: format!("foreign key {}", referencing.id),
            });
        }

        self.constraints.remove(&id);
        let indexed = self.indexes.values().any(|i| i.key_id == constraint.key_id);
        if indexed {
            if let Some(key) = self.keys.get_mut(&constraint.key_id) {
                key.kind = KeyKind::Plain;
            }
        } else {
            self.keys.remove(&constraint.key_id);
        }
        Ok(constraint)
    }

    /// Remove a key with its constraints and indexes
    pub(crate) fn remove_key(&mut self, id: KeyId) -> CatalogResult<LogicalKey> {
        let key = self
            .keys
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("key {}", id)))?;
        self.constraints.retain(|_, c| c.key_id != id);
        self.indexes.retain(|_, i| i.key_id != id);
        Ok(key)
    }

    // ---- indexes ----------------------------------------------------------

    /// Add an index, reusing a key over the same columns when one exists
    pub fn add_index(
        &mut self,
        index_id: IndexId,
        key_id: KeyId,
        table_id: EntityId,
        spec: IndexSpec,
    ) -> CatalogResult<LogicalIndex> {
        self.require_table(table_id)?;
        self.validate_key_columns(table_id, &spec.columns)?;
        if self.index_by_name(&spec.name).is_some() {
            return Err(CatalogError::AlreadyExists(format!(
                "index '{}' in namespace '{}'",
                spec.name, self.namespace.name
            )));
        }

        let existing = self
            .keys
            .values()
            .find(|k| k.table_id == table_id && k.column_ids == spec.columns)
            .map(|k| k.id);
        let key_id = match existing {
            Some(id) => id,
            None => {
                self.keys.insert(
                    key_id,
                    LogicalKey {
                        id: key_id,
                        table_id,
                        namespace_id: self.namespace.id,
                        column_ids: spec.columns,
                        kind: KeyKind::Plain,
                    },
                );
                key_id
            }
        };

        let index = LogicalIndex {
            id: index_id,
            name: spec.name,
            key_id,
            table_id,
            unique: spec.unique,
            method: spec.method,
            location: spec.location,
        };
        self.indexes.insert(index_id, index.clone());
        Ok(index)
    }

    pub fn index(&self, id: IndexId) -> Option<&LogicalIndex> {
        self.indexes.get(&id)
    }

    pub fn indexes(&self, table_id: EntityId) -> Vec<&LogicalIndex> {
        self.indexes
            .values()
            .filter(|i| i.table_id == table_id)
            .collect()
    }

    pub fn index_by_name(&self, name: &str) -> Option<&LogicalIndex> {
        let case_sensitive = self.case_sensitive();
        self.indexes
            .values()
            .find(|i| names_equal(&i.name, name, case_sensitive))
    }

    /// Drop an index; a plain key left without users goes with it
    pub fn drop_index(&mut self, id: IndexId) -> CatalogResult<LogicalIndex> {
        let index = self
            .indexes
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("index {}", id)))?;
        let still_used = self.indexes.values().any(|i| i.key_id == index.key_id);
        let plain = self
            .keys
            .get(&index.key_id)
            .map_or(false, |k| matches!(k.kind, KeyKind::Plain));
        if plain && !still_used {
            self.keys.remove(&index.key_id);
        }
        Ok(index)
    }
}

impl LogicalCatalog for RelationalCatalog {
    fn namespace(&self) -> &LogicalNamespace {
        &self.namespace
    }

    fn set_namespace(&mut self, namespace: LogicalNamespace) -> CatalogResult<()> {
        if namespace.data_model != DataModel::Relational {
            return Err(CatalogError::DataModelMismatch {
                expected: DataModel::Relational.to_string(),
                found: namespace.data_model.to_string(),
            });
        }
        self.namespace = namespace;
        Ok(())
    }

    fn entities(&self) -> Vec<LogicalEntity> {
        self.tables
            .values()
            .cloned()
            .map(LogicalEntity::Table)
            .collect()
    }

    fn entity(&self, id: EntityId) -> Option<LogicalEntity> {
        self.tables.get(&id).cloned().map(LogicalEntity::Table)
    }

    fn rename_entity(&mut self, id: EntityId, name: &str) -> CatalogResult<()> {
        if let Some(other) = self.entity_by_name(name) {
            if other.id() != id {
                return Err(CatalogError::AlreadyExists(format!(
                    "entity '{}' in namespace '{}'",
                    other.name(),
                    self.namespace.name
                )));
            }
        }
        let table = self
            .tables
            .get_mut(&id)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("table {}", id)))?;
        table.name = name.to_string();
        Ok(())
    }

    fn remove_entity(&mut self, id: EntityId) -> CatalogResult<LogicalEntity> {
        let table = self
            .tables
            .remove(&id)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("table {}", id)))?;
        self.columns.retain(|_, c| c.table_id != id);
        self.keys.retain(|_, k| k.table_id != id);
        self.constraints.retain(|_, c| c.table_id != id);
        self.indexes.retain(|_, i| i.table_id != id);
        Ok(LogicalEntity::Table(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entity::PolyType;
    use crate::catalog::id::NamespaceId;

    fn catalog() -> RelationalCatalog {
        RelationalCatalog::new(LogicalNamespace::new(
            NamespaceId::new(1),
            "public".to_string(),
            DataModel::Relational,
            false,
        ))
    }

    /// Table `name` with columns `id` (1) and `ref_id` (2), ids derived from `base`
    fn table_with_columns(catalog: &mut RelationalCatalog, base: u64, name: &str) -> EntityId {
        let table = EntityId::new(base);
        catalog
            .add_table(table, name, EntityType::Entity, true)
            .unwrap();
        catalog
            .add_column(
                FieldId::new(base * 10 + 1),
                table,
                ColumnSpec::new("id", PolyType::Integer),
            )
            .unwrap();
        catalog
            .add_column(
                FieldId::new(base * 10 + 2),
                table,
                ColumnSpec::new("ref_id", PolyType::Integer),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_table_names_follow_namespace_case() {
        let mut catalog = catalog();
        catalog
            .add_table(EntityId::new(1), "Orders", EntityType::Entity, true)
            .unwrap();
        let err = catalog
            .add_table(EntityId::new(2), "ORDERS", EntityType::Entity, true)
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists(_)));
        assert_eq!(catalog.entity_by_name("orders").unwrap().id(), EntityId::new(1));
    }

    #[test]
    fn test_column_positions_and_collation() {
        let mut catalog = catalog();
        let table = table_with_columns(&mut catalog, 1, "t");
        let name = catalog
            .add_column(FieldId::new(13), table, ColumnSpec::new("name", PolyType::Varchar))
            .unwrap();
        assert_eq!(name.position, 3);
        assert_eq!(name.collation, Some(Collation::CaseInsensitive));

        let mut bad = ColumnSpec::new("n", PolyType::Integer);
        bad.collation = Some(Collation::CaseSensitive);
        assert!(catalog.add_column(FieldId::new(14), table, bad).is_err());

        catalog.drop_column(FieldId::new(11)).unwrap();
        let positions: Vec<_> = catalog
            .columns(table)
            .iter()
            .map(|c| (c.name.clone(), c.position))
            .collect();
        assert_eq!(
            positions,
            vec![("ref_id".to_string(), 1), ("name".to_string(), 2)]
        );
    }

    #[test]
    fn test_single_primary_key() {
        let mut catalog = catalog();
        let table = table_with_columns(&mut catalog, 1, "t");
        catalog
            .set_primary_key(KeyId::new(1), ConstraintId::new(1), table, vec![FieldId::new(11)])
            .unwrap();
        assert!(!catalog.column(FieldId::new(11)).unwrap().nullable);

        let err = catalog
            .set_primary_key(KeyId::new(2), ConstraintId::new(2), table, vec![FieldId::new(12)])
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists(_)));

        // Key columns cannot be dropped
        let err = catalog.drop_column(FieldId::new(11)).unwrap_err();
        assert!(matches!(err, CatalogError::StillReferenced { .. }));
    }

    #[test]
    fn test_foreign_key_must_reference_a_key() {
        let mut catalog = catalog();
        let a = table_with_columns(&mut catalog, 1, "a");
        let b = table_with_columns(&mut catalog, 2, "b");

        let spec = ForeignKeySpec::new("fk_a_b", vec![FieldId::new(12)], b, vec![FieldId::new(21)]);
        let err = catalog
            .add_foreign_key(KeyId::new(1), ConstraintId::new(1), a, spec.clone())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOperation(_)));

        catalog
            .set_primary_key(KeyId::new(2), ConstraintId::new(2), b, vec![FieldId::new(21)])
            .unwrap();
        let fk = catalog
            .add_foreign_key(KeyId::new(3), ConstraintId::new(3), a, spec)
            .unwrap();
        assert_eq!(fk.foreign().unwrap().referenced_key_id, KeyId::new(2));
        assert_eq!(catalog.exported_keys(b).len(), 1);
        assert_eq!(catalog.foreign_keys(a).len(), 1);

        // The referenced primary key is pinned by the foreign key
        let err = catalog.drop_constraint(ConstraintId::new(2)).unwrap_err();
        assert!(matches!(err, CatalogError::StillReferenced { .. }));

        catalog.drop_constraint(ConstraintId::new(3)).unwrap();
        catalog.drop_constraint(ConstraintId::new(2)).unwrap();
        assert!(catalog.keys(b).is_empty());
    }

    #[test]
    fn test_foreign_key_column_counts_must_match() {
        let mut catalog = catalog();
        let a = table_with_columns(&mut catalog, 1, "a");
        let b = table_with_columns(&mut catalog, 2, "b");
        catalog
            .set_primary_key(KeyId::new(1), ConstraintId::new(1), b, vec![FieldId::new(21)])
            .unwrap();
        let spec = ForeignKeySpec::new(
            "fk",
            vec![FieldId::new(11), FieldId::new(12)],
            b,
            vec![FieldId::new(21)],
        );
        let err = catalog
            .add_foreign_key(KeyId::new(2), ConstraintId::new(2), a, spec)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOperation(_)));
    }

    #[test]
    fn test_index_reuses_existing_key() {
        let mut catalog = catalog();
        let table = table_with_columns(&mut catalog, 1, "t");
        catalog
            .add_unique_constraint(
                KeyId::new(1),
                ConstraintId::new(1),
                table,
                "uq_id",
                vec![FieldId::new(11)],
            )
            .unwrap();

        let index = catalog
            .add_index(
                IndexId::new(1),
                KeyId::new(2),
                table,
                IndexSpec::new("idx_id", vec![FieldId::new(11)]).unique(),
            )
            .unwrap();
        assert_eq!(index.key_id, KeyId::new(1));
        assert!(catalog.key(KeyId::new(2)).is_none());

        // Dropping the constraint keeps the key for the index
        catalog.drop_constraint(ConstraintId::new(1)).unwrap();
        assert!(matches!(
            catalog.key(KeyId::new(1)).unwrap().kind,
            KeyKind::Plain
        ));

        catalog.drop_index(IndexId::new(1)).unwrap();
        assert!(catalog.keys(table).is_empty());
    }

    #[test]
    fn test_remove_entity_takes_children() {
        let mut catalog = catalog();
        let table = table_with_columns(&mut catalog, 1, "t");
        catalog
            .set_primary_key(KeyId::new(1), ConstraintId::new(1), table, vec![FieldId::new(11)])
            .unwrap();
        catalog
            .add_index(
                IndexId::new(1),
                KeyId::new(2),
                table,
                IndexSpec::new("idx_ref", vec![FieldId::new(12)]),
            )
            .unwrap();

        let removed = catalog.remove_entity(table).unwrap();
        assert_eq!(removed.name(), "t");
        assert!(catalog.columns(table).is_empty());
        assert!(catalog.keys(table).is_empty());
        assert!(catalog.constraints(table).is_empty());
        assert!(catalog.indexes(table).is_empty());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_rename_allows_case_change_of_same_table() {
        let mut catalog = catalog();
        let a = table_with_columns(&mut catalog, 1, "a");
        table_with_columns(&mut catalog, 2, "b");
        catalog.rename_entity(a, "A").unwrap();
        assert_eq!(catalog.table(a).unwrap().name, "A");
        assert!(catalog.rename_entity(a, "B").is_err());
    }
}
