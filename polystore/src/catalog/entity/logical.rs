// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Logical entity records: tables, collections, graphs and their children

use super::namespace::DataModel;
use crate::catalog::id::{
    AdapterId, ConstraintId, EntityId, FieldId, IndexId, KeyId, NamespaceId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an entity came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Created through DDL and owned by the system
    Entity,
    /// Mapped from an external data source, read-only
    Source,
    View,
}

impl Default for EntityType {
    fn default() -> Self {
        EntityType::Entity
    }
}

/// Column types understood by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolyType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Double,
    Date,
    Time,
    Timestamp,
    Char,
    Varchar,
    Text,
    Binary,
    Json,
}

impl fmt::Display for PolyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolyType::Boolean => "BOOLEAN",
            PolyType::TinyInt => "TINYINT",
            PolyType::SmallInt => "SMALLINT",
            PolyType::Integer => "INTEGER",
            PolyType::BigInt => "BIGINT",
            PolyType::Decimal => "DECIMAL",
            PolyType::Real => "REAL",
            PolyType::Double => "DOUBLE",
            PolyType::Date => "DATE",
            PolyType::Time => "TIME",
            PolyType::Timestamp => "TIMESTAMP",
            PolyType::Char => "CHAR",
            PolyType::Varchar => "VARCHAR",
            PolyType::Text => "TEXT",
            PolyType::Binary => "BINARY",
            PolyType::Json => "JSON",
        };
        write!(f, "{}", s)
    }
}

impl PolyType {
    pub fn is_character(&self) -> bool {
        matches!(self, PolyType::Char | PolyType::Varchar | PolyType::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collation {
    CaseSensitive,
    CaseInsensitive,
}

impl Default for Collation {
    fn default() -> Self {
        Collation::CaseInsensitive
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalTable {
    pub id: EntityId,
    pub namespace_id: NamespaceId,
    pub name: String,
    pub entity_type: EntityType,
    pub modifiable: bool,
}

/// Definition of a new column, resolved by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub poly_type: PolyType,
    pub length: Option<u32>,
    pub nullable: bool,
    pub collation: Option<Collation>,
    pub default_value: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, poly_type: PolyType) -> Self {
        Self {
            name: name.into(),
            poly_type,
            length: None,
            nullable: true,
            collation: None,
            default_value: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalColumn {
    pub id: FieldId,
    pub table_id: EntityId,
    pub namespace_id: NamespaceId,
    pub name: String,
    /// 1-based position inside the table
    pub position: u32,
    pub poly_type: PolyType,
    pub length: Option<u32>,
    pub nullable: bool,
    pub collation: Option<Collation>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForeignKeyOption {
    None,
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
}

impl Default for ForeignKeyOption {
    fn default() -> Self {
        ForeignKeyOption::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub name: String,
    pub referenced_key_id: KeyId,
    pub referenced_table_id: EntityId,
    pub referenced_column_ids: Vec<FieldId>,
    pub on_update: ForeignKeyOption,
    pub on_delete: ForeignKeyOption,
}

/// Definition of a new foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySpec {
    pub name: String,
    pub columns: Vec<FieldId>,
    pub referenced_table_id: EntityId,
    pub referenced_columns: Vec<FieldId>,
    pub on_update: ForeignKeyOption,
    pub on_delete: ForeignKeyOption,
}

impl ForeignKeySpec {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<FieldId>,
        referenced_table_id: EntityId,
        referenced_columns: Vec<FieldId>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            referenced_table_id,
            referenced_columns,
            on_update: ForeignKeyOption::default(),
            on_delete: ForeignKeyOption::default(),
        }
    }

    pub fn on_update(mut self, option: ForeignKeyOption) -> Self {
        self.on_update = option;
        self
    }

    pub fn on_delete(mut self, option: ForeignKeyOption) -> Self {
        self.on_delete = option;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyKind {
    /// Backs an index only
    Plain,
    Primary,
    Unique,
    Foreign(ForeignKeyInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalKey {
    pub id: KeyId,
    pub table_id: EntityId,
    pub namespace_id: NamespaceId,
    pub column_ids: Vec<FieldId>,
    pub kind: KeyKind,
}

impl LogicalKey {
    pub fn is_primary(&self) -> bool {
        matches!(self.kind, KeyKind::Primary)
    }

    pub fn foreign(&self) -> Option<&ForeignKeyInfo> {
        match &self.kind {
            KeyKind::Foreign(info) => Some(info),
            _ => None,
        }
    }

    /// Whether a foreign key may point at this key
    pub fn is_referenceable(&self) -> bool {
        matches!(self.kind, KeyKind::Primary | KeyKind::Unique)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    Primary,
    Unique,
    Foreign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalConstraint {
    pub id: ConstraintId,
    pub key_id: KeyId,
    pub table_id: EntityId,
    pub name: String,
    pub constraint_type: ConstraintType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexMethod {
    BTree,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalIndex {
    pub id: IndexId,
    pub name: String,
    pub key_id: KeyId,
    pub table_id: EntityId,
    pub unique: bool,
    pub method: IndexMethod,
    /// Adapter the index is materialized on, `None` for a polystore index
    pub location: Option<AdapterId>,
}

/// Definition of a new index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub columns: Vec<FieldId>,
    pub unique: bool,
    pub method: IndexMethod,
    pub location: Option<AdapterId>,
}

impl IndexSpec {
    pub fn new(name: impl Into<String>, columns: Vec<FieldId>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
            method: IndexMethod::BTree,
            location: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_method(mut self, method: IndexMethod) -> Self {
        self.method = method;
        self
    }

    pub fn on_adapter(mut self, adapter: AdapterId) -> Self {
        self.location = Some(adapter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalCollection {
    pub id: EntityId,
    pub namespace_id: NamespaceId,
    pub name: String,
    pub entity_type: EntityType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalGraph {
    pub id: EntityId,
    pub namespace_id: NamespaceId,
    pub name: String,
}

/// A logical entity of any data model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalEntity {
    Table(LogicalTable),
    Collection(LogicalCollection),
    Graph(LogicalGraph),
}

impl LogicalEntity {
    pub fn id(&self) -> EntityId {
        match self {
            LogicalEntity::Table(t) => t.id,
            LogicalEntity::Collection(c) => c.id,
            LogicalEntity::Graph(g) => g.id,
        }
    }

    pub fn namespace_id(&self) -> NamespaceId {
        match self {
            LogicalEntity::Table(t) => t.namespace_id,
            LogicalEntity::Collection(c) => c.namespace_id,
            LogicalEntity::Graph(g) => g.namespace_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LogicalEntity::Table(t) => &t.name,
            LogicalEntity::Collection(c) => &c.name,
            LogicalEntity::Graph(g) => &g.name,
        }
    }

    pub fn data_model(&self) -> DataModel {
        match self {
            LogicalEntity::Table(_) => DataModel::Relational,
            LogicalEntity::Collection(_) => DataModel::Document,
            LogicalEntity::Graph(_) => DataModel::Graph,
        }
    }
}
