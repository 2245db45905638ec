// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Namespaces and data models

use crate::catalog::id::NamespaceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data model of a namespace, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataModel {
    Relational,
    Document,
    Graph,
}

impl fmt::Display for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataModel::Relational => "relational",
            DataModel::Document => "document",
            DataModel::Graph => "graph",
        };
        write!(f, "{}", s)
    }
}

impl Default for DataModel {
    fn default() -> Self {
        DataModel::Relational
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalNamespace {
    pub id: NamespaceId,
    pub name: String,
    pub data_model: DataModel,
    pub case_sensitive: bool,
}

impl LogicalNamespace {
    pub fn new(id: NamespaceId, name: String, data_model: DataModel, case_sensitive: bool) -> Self {
        Self {
            id,
            name,
            data_model,
            case_sensitive,
        }
    }

    pub(crate) fn with_name(&self, name: String) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }
}
