//! Catalog fixture for integration tests
//!
//! Uses only the public crate API.

#![allow(dead_code)]

use polystore::catalog::id::{AdapterId, EntityId, FieldId, NamespaceId};
use polystore::{
    AdapterMode, AdapterSettings, CatalogConfig, CatalogManager, CatalogResult, ColumnSpec,
    DataModel, EntityType, PolyType,
};
use std::sync::Arc;

/// Isolated catalog with a committed namespace and two store adapters
pub struct CatalogFixture {
    pub catalog: Arc<CatalogManager>,
    pub namespace: NamespaceId,
    /// `hsqldb` store named "store1"
    pub adapter: AdapterId,
    /// `postgresql` store named "store2"
    pub second_adapter: AdapterId,
}

impl CatalogFixture {
    pub fn new() -> CatalogResult<Self> {
        Self::with_config(CatalogConfig::testing())
    }

    pub fn with_config(config: CatalogConfig) -> CatalogResult<Self> {
        let catalog = CatalogManager::open(config)?;
        catalog.create_adapter_template("hsqldb", AdapterMode::Store)?;
        catalog.create_adapter_template("postgresql", AdapterMode::Store)?;
        catalog.create_adapter_template("csv", AdapterMode::Source)?;
        let adapter =
            catalog.create_adapter("store1", "hsqldb", AdapterMode::Store, AdapterSettings::new())?;
        let second_adapter = catalog.create_adapter(
            "store2",
            "postgresql",
            AdapterMode::Store,
            AdapterSettings::new(),
        )?;
        let namespace = catalog.create_namespace("app", DataModel::Relational, false)?;
        catalog.commit()?;

        Ok(Self {
            catalog,
            namespace,
            adapter,
            second_adapter,
        })
    }

    /// Create and commit a table with integer columns named `columns`
    pub fn table(&self, name: &str, columns: &[&str]) -> CatalogResult<(EntityId, Vec<FieldId>)> {
        let table = self
            .catalog
            .create_table(self.namespace, name, EntityType::Entity, true)?;
        let mut ids = Vec::with_capacity(columns.len());
        for column in columns {
            ids.push(
                self.catalog
                    .add_column(table, ColumnSpec::new(*column, PolyType::Integer))?,
            );
        }
        self.catalog.commit()?;
        Ok((table, ids))
    }

    /// Create and commit a table whose first column is its primary key
    pub fn keyed_table(
        &self,
        name: &str,
        columns: &[&str],
    ) -> CatalogResult<(EntityId, Vec<FieldId>)> {
        let (table, ids) = self.table(name, columns)?;
        self.catalog.set_primary_key(table, vec![ids[0]])?;
        self.catalog.commit()?;
        Ok((table, ids))
    }
}
