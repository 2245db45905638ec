// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-namespace logical catalogs
//!
//! One sub-catalog per data model. A namespace's catalog is chosen from its
//! data model when the namespace is created and never changes afterwards.

pub mod document;
pub mod graph;
pub mod relational;

pub use document::DocumentCatalog;
pub use graph::GraphCatalog;
pub use relational::RelationalCatalog;

use super::entity::{DataModel, LogicalNamespace};
use super::error::{CatalogError, CatalogResult};
use super::traits::LogicalCatalog;
use serde::{Deserialize, Serialize};

/// The logical catalog of one namespace, tagged by data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NamespaceCatalog {
    Relational(RelationalCatalog),
    Document(DocumentCatalog),
    Graph(GraphCatalog),
}

impl NamespaceCatalog {
    /// Create the empty sub-catalog matching the namespace's data model
    pub fn for_namespace(namespace: LogicalNamespace) -> Self {
        match namespace.data_model {
            DataModel::Relational => NamespaceCatalog::Relational(RelationalCatalog::new(namespace)),
            DataModel::Document => NamespaceCatalog::Document(DocumentCatalog::new(namespace)),
            DataModel::Graph => NamespaceCatalog::Graph(GraphCatalog::new(namespace)),
        }
    }

    pub fn as_catalog(&self) -> &dyn LogicalCatalog {
        match self {
            NamespaceCatalog::Relational(c) => c,
            NamespaceCatalog::Document(c) => c,
            NamespaceCatalog::Graph(c) => c,
        }
    }

    pub fn as_catalog_mut(&mut self) -> &mut dyn LogicalCatalog {
        match self {
            NamespaceCatalog::Relational(c) => c,
            NamespaceCatalog::Document(c) => c,
            NamespaceCatalog::Graph(c) => c,
        }
    }

    pub fn namespace(&self) -> &LogicalNamespace {
        self.as_catalog().namespace()
    }

    fn mismatch(&self, expected: DataModel) -> CatalogError {
        CatalogError::DataModelMismatch {
            expected: expected.to_string(),
            found: self.namespace().data_model.to_string(),
        }
    }

    pub fn relational(&self) -> Option<&RelationalCatalog> {
        match self {
            NamespaceCatalog::Relational(c) => Some(c),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&DocumentCatalog> {
        match self {
            NamespaceCatalog::Document(c) => Some(c),
            _ => None,
        }
    }

    pub fn graph(&self) -> Option<&GraphCatalog> {
        match self {
            NamespaceCatalog::Graph(c) => Some(c),
            _ => None,
        }
    }

    pub fn relational_mut(&mut self) -> CatalogResult<&mut RelationalCatalog> {
        match self {
            NamespaceCatalog::Relational(c) => Ok(c),
            other => Err(other.mismatch(DataModel::Relational)),
        }
    }

    pub fn document_mut(&mut self) -> CatalogResult<&mut DocumentCatalog> {
        match self {
            NamespaceCatalog::Document(c) => Ok(c),
            other => Err(other.mismatch(DataModel::Document)),
        }
    }

    pub fn graph_mut(&mut self) -> CatalogResult<&mut GraphCatalog> {
        match self {
            NamespaceCatalog::Graph(c) => Ok(c),
            other => Err(other.mismatch(DataModel::Graph)),
        }
    }
}
