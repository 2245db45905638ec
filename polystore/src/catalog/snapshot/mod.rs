// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Immutable point-in-time view of the whole catalog
//!
//! A `Snapshot` is built exactly once, inside commit, from the staged state.
//! It is never mutated afterwards; readers hold an `Arc<Snapshot>` for the
//! duration of their unit of work and see the same schema throughout.
//!
//! By-id lookups return `Option`, absence is not an error. Pattern lookups
//! use SQL-LIKE wildcards and follow the owning namespace's case
//! sensitivity. The `find_*` lookups require exactly one match.
//!
//! The read API is split by layer: [`Snapshot::rel`], [`Snapshot::doc`] and
//! [`Snapshot::graph`] for the logical models, [`Snapshot::alloc`] and
//! [`Snapshot::physical`] for placement and adapter-side handles.

mod alloc;
mod document;
mod graph;
mod physical;
mod relational;

pub use alloc::AllocSnapshot;
pub use document::DocSnapshot;
pub use graph::GraphSnapshot;
pub use physical::PhysicalSnapshot;
pub use relational::RelSnapshot;

use super::dependency::{build_dependency_graph, foreign_key_graph, DependencyPaths};
use super::entity::adapter::normalize_name;
use super::entity::{
    AdapterInstance, AdapterMode, AdapterTemplate, CatalogUser, LogicalEntity, LogicalNamespace,
    QueryInterface,
};
use super::error::{CatalogError, CatalogResult};
use super::id::{
    AdapterId, AdapterTemplateId, EntityId, FieldId, IndexId, InterfaceId, KeyId, NamespaceId,
    SnapshotId, UserId,
};
use super::logical::NamespaceCatalog;
use super::operations::CatalogObject;
use super::pattern::{names_equal, Pattern};
use super::state::CatalogState;
use std::collections::HashMap;

/// Which namespace owns each logical id
#[derive(Debug, Default)]
struct OwnerIndex {
    entities: HashMap<EntityId, NamespaceId>,
    fields: HashMap<FieldId, NamespaceId>,
    keys: HashMap<KeyId, NamespaceId>,
    indexes: HashMap<IndexId, NamespaceId>,
}

impl OwnerIndex {
    fn build(state: &CatalogState) -> Self {
        let mut owners = Self::default();
        for (namespace_id, catalog) in &state.logical {
            for entity in catalog.as_catalog().entity_ids() {
                owners.entities.insert(entity, *namespace_id);
            }
            if let Some(rel) = catalog.relational() {
                for table in rel.tables() {
                    for column in rel.columns(table.id) {
                        owners.fields.insert(column.id, *namespace_id);
                    }
                    for index in rel.indexes(table.id) {
                        owners.indexes.insert(index.id, *namespace_id);
                    }
                }
                for key in rel.all_keys() {
                    owners.keys.insert(key.id, *namespace_id);
                }
            }
        }
        owners
    }
}

/// An immutable, versioned view of the catalog at one commit generation
#[derive(Debug)]
pub struct Snapshot {
    id: SnapshotId,
    state: CatalogState,
    owners: OwnerIndex,
    alloc_index: alloc::AllocIndex,
    physical_index: physical::PhysicalIndex,
}

impl Snapshot {
    /// Freeze `state` as generation `id`, precomputing the lookup indexes
    pub fn build(id: SnapshotId, state: CatalogState) -> Self {
        let owners = OwnerIndex::build(&state);
        let alloc_index = alloc::AllocIndex::build(&state);
        let physical_index = physical::PhysicalIndex::build(&state);
        Self {
            id,
            state,
            owners,
            alloc_index,
            physical_index,
        }
    }

    /// Generation of this snapshot; later commits have larger ids
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    /// The raw state this snapshot was built from
    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn rel(&self) -> RelSnapshot<'_> {
        RelSnapshot::new(self)
    }

    pub fn doc(&self) -> DocSnapshot<'_> {
        DocSnapshot::new(self)
    }

    pub fn graph(&self) -> GraphSnapshot<'_> {
        GraphSnapshot::new(self)
    }

    pub fn alloc(&self) -> AllocSnapshot<'_> {
        AllocSnapshot::new(self)
    }

    pub fn physical(&self) -> PhysicalSnapshot<'_> {
        PhysicalSnapshot::new(self)
    }

    pub(crate) fn namespace_catalog(&self, id: NamespaceId) -> Option<&NamespaceCatalog> {
        self.state.logical.get(&id)
    }

    // ---- namespaces -------------------------------------------------------

    pub fn get_namespace(&self, id: NamespaceId) -> Option<&LogicalNamespace> {
        self.state.namespace(id)
    }

    /// Exact-name lookup; a case-insensitive namespace matches in any case
    pub fn get_namespace_by_name(&self, name: &str) -> Option<&LogicalNamespace> {
        self.state
            .namespaces()
            .find(|ns| names_equal(&ns.name, name, ns.case_sensitive))
    }

    /// Namespaces matching `pattern`, or all namespaces
    pub fn get_namespaces(&self, pattern: Option<&Pattern>) -> Vec<&LogicalNamespace> {
        self.state
            .namespaces()
            .filter(|ns| pattern.map_or(true, |p| p.matches(&ns.name, ns.case_sensitive)))
            .collect()
    }

    /// The single namespace matching `pattern`
    pub fn find_namespace(&self, pattern: &Pattern) -> CatalogResult<&LogicalNamespace> {
        exactly_one(pattern, self.get_namespaces(Some(pattern)))
    }

    // ---- logical entities of any model ------------------------------------

    pub fn get_entity(&self, id: EntityId) -> Option<LogicalEntity> {
        let namespace = self.owners.entities.get(&id)?;
        self.state
            .logical
            .get(namespace)
            .and_then(|c| c.as_catalog().entity(id))
    }

    pub fn get_entities(&self, namespace_id: NamespaceId) -> Vec<LogicalEntity> {
        self.namespace_catalog(namespace_id)
            .map(|c| c.as_catalog().entities())
            .unwrap_or_default()
    }

    pub(crate) fn entity_owner(&self, id: EntityId) -> Option<NamespaceId> {
        self.owners.entities.get(&id).copied()
    }

    pub(crate) fn field_owner(&self, id: FieldId) -> Option<NamespaceId> {
        self.owners.fields.get(&id).copied()
    }

    pub(crate) fn key_owner(&self, id: KeyId) -> Option<NamespaceId> {
        self.owners.keys.get(&id).copied()
    }

    pub(crate) fn index_owner(&self, id: IndexId) -> Option<NamespaceId> {
        self.owners.indexes.get(&id).copied()
    }

    // ---- adapters, interfaces and users -----------------------------------

    pub fn get_adapter(&self, id: AdapterId) -> Option<&AdapterInstance> {
        self.state.adapters.get(&id)
    }

    /// Unique names are stored lower-cased, so the lookup ignores case
    pub fn get_adapter_by_name(&self, unique_name: &str) -> Option<&AdapterInstance> {
        let name = normalize_name(unique_name);
        self.state.adapters.values().find(|a| a.unique_name == name)
    }

    pub fn get_adapters(&self) -> Vec<&AdapterInstance> {
        self.state.adapters.values().collect()
    }

    pub fn get_adapter_template(&self, id: AdapterTemplateId) -> Option<&AdapterTemplate> {
        self.state.templates.get(&id)
    }

    pub fn get_adapter_template_by_name(
        &self,
        adapter_name: &str,
        mode: AdapterMode,
    ) -> Option<&AdapterTemplate> {
        self.state
            .templates
            .values()
            .find(|t| t.matches(adapter_name, mode))
    }

    pub fn get_adapter_templates(&self) -> Vec<&AdapterTemplate> {
        self.state.templates.values().collect()
    }

    pub fn get_interface(&self, id: InterfaceId) -> Option<&QueryInterface> {
        self.state.interfaces.get(&id)
    }

    pub fn get_interface_by_name(&self, unique_name: &str) -> Option<&QueryInterface> {
        let name = normalize_name(unique_name);
        self.state
            .interfaces
            .values()
            .find(|i| i.unique_name == name)
    }

    pub fn get_interfaces(&self) -> Vec<&QueryInterface> {
        self.state.interfaces.values().collect()
    }

    pub fn get_user(&self, id: UserId) -> Option<&CatalogUser> {
        self.state.users.get(&id)
    }

    pub fn get_user_by_name(&self, name: &str) -> Option<&CatalogUser> {
        self.state.users.values().find(|u| u.name == name)
    }

    pub fn get_users(&self) -> Vec<&CatalogUser> {
        self.state.users.values().collect()
    }

    // ---- dependencies -----------------------------------------------------

    /// Everything that has to go if `object` is dropped, in a safe order
    ///
    /// Dependents come before their referents; `object` itself is last.
    ///
    /// # Returns
    /// * `Ok(Vec<CatalogObject>)` with the drop sequence
    /// * `Err(CatalogError::NotFound)` if the object is not in this snapshot
    /// * `Err(CatalogError::CycleDetected)` if the affected objects form a cycle
    pub fn drop_plan(&self, object: CatalogObject) -> CatalogResult<Vec<CatalogObject>> {
        drop_plan(&self.state, object)
    }

    /// Foreign-key reachability between tables
    ///
    /// A path from A to B means A references B, directly or through other
    /// tables.
    pub fn foreign_key_paths(&self) -> DependencyPaths<EntityId> {
        DependencyPaths::build(&foreign_key_graph(&self.state))
    }
}

/// Drop sequence for `object` over any catalog state
pub(crate) fn drop_plan(
    state: &CatalogState,
    object: CatalogObject,
) -> CatalogResult<Vec<CatalogObject>> {
    let graph = build_dependency_graph(state);
    if !graph.contains(object) {
        return Err(CatalogError::NotFound(object.to_string()));
    }
    graph.drop_order(object)
}

pub(crate) fn exactly_one<T>(pattern: &Pattern, mut matches: Vec<T>) -> CatalogResult<T> {
    match matches.len() {
        0 => Err(CatalogError::NoMatch(pattern.to_string())),
        1 => Ok(matches.remove(0)),
        count => Err(CatalogError::Ambiguous {
            pattern: pattern.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entity::DataModel;

    fn state_with_namespaces(names: &[(&str, bool)]) -> CatalogState {
        let mut state = CatalogState::new();
        for (i, (name, case_sensitive)) in names.iter().enumerate() {
            let ns = LogicalNamespace::new(
                NamespaceId::new(i as u64),
                name.to_string(),
                DataModel::Relational,
                *case_sensitive,
            );
            state.logical.insert(ns.id, NamespaceCatalog::for_namespace(ns));
        }
        state
    }

    #[test]
    fn test_namespace_pattern_follows_case_flag() {
        let snapshot = Snapshot::build(
            SnapshotId::new(1),
            state_with_namespaces(&[
                ("sales", false),
                ("Sales2", false),
                ("SALES_ARCHIVE", false),
                ("SalesStrict", true),
                ("hr", false),
            ]),
        );
        let names: Vec<_> = snapshot
            .get_namespaces(Some(&Pattern::new("sales%")))
            .iter()
            .map(|ns| ns.name.clone())
            .collect();
        assert_eq!(names, vec!["sales", "Sales2", "SALES_ARCHIVE"]);
        assert_eq!(snapshot.get_namespaces(None).len(), 5);
    }

    #[test]
    fn test_find_namespace_needs_exactly_one() {
        let snapshot = Snapshot::build(
            SnapshotId::new(1),
            state_with_namespaces(&[("sales", false), ("Sales2", false)]),
        );
        assert_eq!(
            snapshot.find_namespace(&Pattern::new("sales_")).unwrap().name,
            "Sales2"
        );
        assert!(matches!(
            snapshot.find_namespace(&Pattern::new("sales%")),
            Err(CatalogError::Ambiguous { count: 2, .. })
        ));
        assert!(matches!(
            snapshot.find_namespace(&Pattern::new("hr")),
            Err(CatalogError::NoMatch(_))
        ));
    }

    #[test]
    fn test_exact_name_lookup() {
        let snapshot = Snapshot::build(
            SnapshotId::new(1),
            state_with_namespaces(&[("Public", false), ("Strict", true)]),
        );
        assert!(snapshot.get_namespace_by_name("PUBLIC").is_some());
        assert!(snapshot.get_namespace_by_name("strict").is_none());
        assert!(snapshot.get_namespace_by_name("Strict").is_some());
    }
}
