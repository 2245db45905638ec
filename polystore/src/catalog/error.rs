// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog and snapshot subsystem

use thiserror::Error;

/// Coarse classification of catalog failures
///
/// Callers use the category to decide between aborting the process
/// (configuration), fixing references and retrying (referential), retrying the
/// whole commit (commit) or treating the result as a miss (lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Referential,
    Commit,
    Lookup,
    Cycle,
    Lifecycle,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("A catalog is already installed in this process")]
    AlreadyInstalled,

    #[error("Unknown adapter kind: {0}")]
    UnknownAdapterKind(String),

    #[error("Invalid adapter settings for '{adapter}': {reason}")]
    InvalidSettings { adapter: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Adapter '{adapter}' is still deployed: {placements} placement(s) reference it")]
    StillDeployed { adapter: String, placements: usize },

    #[error("{object} is still referenced by {referenced_by}")]
    StillReferenced {
        object: String,
        referenced_by: String,
    },

    #[error("Data model mismatch: expected {expected}, found {found}")]
    DataModelMismatch { expected: String, found: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Commit rejected by constraint: {description}")]
    CommitConstraintViolated { description: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Pattern {pattern} matched {count} objects, expected exactly one")]
    Ambiguous { pattern: String, count: usize },

    #[error("Pattern {0} matched nothing")]
    NoMatch(String),

    #[error("Dependency cycle detected between: {}", nodes.join(", "))]
    CycleDetected { nodes: Vec<String> },

    #[error("Catalog is closed")]
    Closed,
}

impl CatalogError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::AlreadyInstalled
            | CatalogError::UnknownAdapterKind(_)
            | CatalogError::InvalidSettings { .. }
            | CatalogError::Configuration(_) => ErrorCategory::Configuration,
            CatalogError::NamespaceNotFound(_)
            | CatalogError::EntityNotFound(_)
            | CatalogError::AdapterNotFound(_)
            | CatalogError::NotFound(_)
            | CatalogError::AlreadyExists(_)
            | CatalogError::StillDeployed { .. }
            | CatalogError::StillReferenced { .. }
            | CatalogError::DataModelMismatch { .. }
            | CatalogError::InvalidOperation(_) => ErrorCategory::Referential,
            CatalogError::CommitConstraintViolated { .. } | CatalogError::Storage(_) => {
                ErrorCategory::Commit
            }
            CatalogError::Ambiguous { .. } | CatalogError::NoMatch(_) => ErrorCategory::Lookup,
            CatalogError::CycleDetected { .. } => ErrorCategory::Cycle,
            CatalogError::Closed => ErrorCategory::Lifecycle,
        }
    }

    /// Configuration errors leave the process unable to proceed
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
