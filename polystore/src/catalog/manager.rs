// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog manager - the single mutation entry point
//!
//! Every create, drop, rename and update goes through `CatalogManager`. A
//! mutation validates its preconditions, takes fresh ids from the
//! `IdBuilder` and stages its delta on a private working copy of the catalog
//! state. Nothing becomes visible until `commit()`, which builds a candidate
//! snapshot, runs every attached commit constraint against it, persists it
//! and only then swaps it in as the current snapshot.
//!
//! Mutations are serialized by one staging lock. Readers never take it: they
//! clone the current `Arc<Snapshot>` and keep using it for the rest of their
//! unit of work.

use super::allocation::PlannedGroup;
use super::constraint::{CommitConstraint, ConstraintHandle, ConstraintSet};
use super::entity::adapter::normalize_name;
use super::entity::{
    AdapterCapabilities, AdapterInstance, AdapterKind, AdapterMode, AdapterSettings,
    AdapterTemplate, AllocationColumn, AllocationColumnKey, AllocationPlacement, CatalogUser,
    ColumnSpec, DataModel, EntityType, ForeignKeySpec, IndexSpec, LogicalNamespace,
    PartitionGroupSpec, PartitionProperty, PartitionType, PhysicalEntity, PlacementType,
    QueryInterface,
};
use super::error::{CatalogError, CatalogResult};
use super::events::{CatalogEvent, EventChannel};
use super::id::{
    AdapterId, AdapterTemplateId, AllocationId, ConstraintId, EntityId, FieldId, IdBuilder,
    IndexId, InterfaceId, KeyId, NamespaceId, PartitionId, PhysicalId, PlacementId, SnapshotId,
    UserId,
};
use super::logical::{NamespaceCatalog, RelationalCatalog};
use super::operations::{CatalogChange, CatalogObject};
use super::pattern::names_equal;
use super::registry::{resolve_settings, AdapterRegistry};
use super::snapshot::{self, Snapshot};
use super::state::{CatalogState, PersistedCatalog};
use super::store::CatalogStore;
use crate::config::CatalogConfig;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Working copy of the catalog plus the changes applied to it since the
/// last commit
#[derive(Debug)]
struct Staging {
    state: CatalogState,
    changes: Vec<CatalogChange>,
}

impl Staging {
    fn new(state: CatalogState) -> Self {
        Self {
            state,
            changes: Vec::new(),
        }
    }
}

/// Single writer, many readers catalog orchestrator
pub struct CatalogManager {
    config: CatalogConfig,
    ids: IdBuilder,
    registry: RwLock<AdapterRegistry>,
    staging: Mutex<Staging>,
    current: RwLock<Arc<Snapshot>>,
    constraints: Mutex<ConstraintSet>,
    store: Arc<dyn CatalogStore>,
    events: EventChannel,
    closed: AtomicBool,
}

impl std::fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogManager")
            .field("generation", &self.current.read().id())
            .field("store", &self.store.name())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

impl CatalogManager {
    /// Open a catalog as described by `config`
    ///
    /// State found in the configured store is restored; an empty store is
    /// bootstrapped with the default objects when `bootstrap_defaults` is set.
    ///
    /// # Arguments
    /// * `config` - Catalog configuration
    ///
    /// # Returns
    /// * `Ok(Arc<CatalogManager>)` ready to be shared between threads
    /// * `Err(CatalogError::Configuration)` if the configuration is invalid
    /// * `Err(CatalogError::Storage)` if stored state cannot be read
    pub fn open(config: CatalogConfig) -> CatalogResult<Arc<Self>> {
        config.validate()?;
        let store = config.store.open();
        Self::open_with_store(config, store)
    }

    /// Open a catalog on an explicitly constructed store
    pub fn open_with_store(
        config: CatalogConfig,
        store: Arc<dyn CatalogStore>,
    ) -> CatalogResult<Arc<Self>> {
        config.validate()?;
        let registry = AdapterRegistry::with_builtin_kinds();
        let ids = IdBuilder::new();

        let (snapshot, restored) = match store.load()? {
            Some(persisted) => {
                ids.observe(persisted.state.observed_ids(persisted.generation));
                let mut state = persisted.state;
                for template in state.templates.values_mut() {
                    registry.bind_hook(template);
                }
                log::info!(
                    "Restored catalog generation {} from {} store",
                    persisted.generation,
                    store.name()
                );
                (Snapshot::build(persisted.generation, state), true)
            }
            None => (Snapshot::build(ids.new_snapshot_id(), CatalogState::new()), false),
        };

        let manager = Arc::new(Self {
            events: EventChannel::new(config.event_capacity),
            ids,
            registry: RwLock::new(registry),
            staging: Mutex::new(Staging::new(snapshot.state().clone())),
            current: RwLock::new(Arc::new(snapshot)),
            constraints: Mutex::new(ConstraintSet::with_builtin()),
            store,
            closed: AtomicBool::new(false),
            config,
        });

        if !restored && manager.config.bootstrap_defaults {
            manager.bootstrap()?;
        }
        Ok(manager)
    }

    /// Create the default users, namespace, adapter templates and store
    fn bootstrap(&self) -> CatalogResult<()> {
        self.create_user("system", "")?;
        self.create_user("pa", "")?;
        self.create_namespace(
            &self.config.default_namespace,
            DataModel::Relational,
            self.config.default_namespace_case_sensitive,
        )?;
        let kinds: Vec<(String, AdapterMode)> = self
            .registry
            .read()
            .kinds()
            .map(|k| (k.adapter_name.clone(), k.mode))
            .collect();
        for (name, mode) in kinds {
            self.create_adapter_template(&name, mode)?;
        }
        self.create_adapter("hsqldb", "hsqldb", AdapterMode::Store, AdapterSettings::new())?;
        let generation = self.commit()?;
        log::info!("Bootstrapped default catalog as generation {}", generation);
        Ok(())
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn ids(&self) -> &IdBuilder {
        &self.ids
    }

    /// The latest committed snapshot
    ///
    /// The returned snapshot never changes. Hold on to it for the whole unit
    /// of work to get repeatable reads.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> CatalogResult<()> {
        if self.is_closed() {
            Err(CatalogError::Closed)
        } else {
            Ok(())
        }
    }

    /// Run one mutation against a copy of the staged state
    ///
    /// The copy only replaces the staged state when `f` succeeds, so a
    /// rejected mutation leaves no trace besides the ids it burned.
    fn stage<T, F>(&self, f: F) -> CatalogResult<T>
    where
        F: FnOnce(&mut CatalogState, &mut Vec<CatalogChange>) -> CatalogResult<T>,
    {
        self.ensure_open()?;
        let mut staging = self.staging.lock();
        let mut working = staging.state.clone();
        let mut changes = Vec::new();
        let value = f(&mut working, &mut changes)?;
        for change in &changes {
            log::debug!("Staged: {}", change);
        }
        staging.state = working;
        staging.changes.extend(changes);
        Ok(value)
    }

    // ---- transaction control ----------------------------------------------

    /// Publish everything staged since the last commit
    ///
    /// Runs every attached commit constraint against the candidate snapshot,
    /// persists it and then makes it current. Any failure discards all staged
    /// changes and leaves the current snapshot untouched.
    ///
    /// # Returns
    /// * `Ok(SnapshotId)` with the generation now current; unchanged when
    ///   nothing was staged
    /// * `Err(CatalogError::CommitConstraintViolated)` if a constraint failed
    /// * `Err(CatalogError::Storage)` if the store could not persist the state
    pub fn commit(&self) -> CatalogResult<SnapshotId> {
        self.ensure_open()?;
        let mut staging = self.staging.lock();
        if staging.changes.is_empty() {
            return Ok(self.current.read().id());
        }

        let generation = self.ids.new_snapshot_id();
        let candidate = Snapshot::build(generation, staging.state.clone());
        let published = self
            .constraints
            .lock()
            .validate(&candidate)
            .and_then(|()| {
                self.store.persist(&PersistedCatalog {
                    generation,
                    state: staging.state.clone(),
                })
            });

        if let Err(err) = published {
            log::warn!("Commit of generation {} rejected: {}", generation, err);
            let committed = self.current.read().state().clone();
            *staging = Staging::new(committed);
            return Err(err);
        }

        let changes = std::mem::take(&mut staging.changes);
        *self.current.write() = Arc::new(candidate);
        drop(staging);

        log::info!(
            "Committed catalog generation {} ({} change(s))",
            generation,
            changes.len()
        );
        self.events.publish(CatalogEvent::new(generation, changes));
        Ok(generation)
    }

    /// Discard everything staged since the last commit
    pub fn rollback(&self) {
        let mut staging = self.staging.lock();
        if !staging.changes.is_empty() {
            log::debug!("Rolled back {} staged change(s)", staging.changes.len());
        }
        *staging = Staging::new(self.current.read().state().clone());
    }

    /// Mark the catalog changed so the next commit publishes a new generation
    pub fn change(&self) -> CatalogResult<()> {
        self.stage(|_, changes| {
            changes.push(CatalogChange::Marked);
            Ok(())
        })
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.staging.lock().changes.is_empty()
    }

    /// Changes staged since the last commit, oldest first
    pub fn pending_changes(&self) -> Vec<CatalogChange> {
        self.staging.lock().changes.clone()
    }

    /// Reset to an empty catalog and publish it as a new generation
    pub fn clear(&self) -> CatalogResult<SnapshotId> {
        self.stage(|state, changes| {
            *state = CatalogState::new();
            changes.push(CatalogChange::Cleared);
            Ok(())
        })?;
        self.commit()
    }

    /// Reject all further mutations and release the process-wide slot
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.rollback();
            super::context::release(self);
            log::info!("Closed catalog at generation {}", self.current.read().id());
        }
    }

    /// Receive one event per published generation
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Attach a predicate that every future commit must satisfy
    ///
    /// # Arguments
    /// * `description` - Reported when the predicate rejects a commit
    /// * `predicate` - Evaluated against the candidate snapshot
    ///
    /// # Returns
    /// * `ConstraintHandle` for `detach_commit_constraint`
    pub fn attach_commit_constraint<F>(
        &self,
        description: impl Into<String>,
        predicate: F,
    ) -> ConstraintHandle
    where
        F: Fn(&Snapshot) -> bool + Send + Sync + 'static,
    {
        self.constraints
            .lock()
            .attach(CommitConstraint::new(description, predicate))
    }

    /// Returns `false` if the handle was not attached
    pub fn detach_commit_constraint(&self, handle: ConstraintHandle) -> bool {
        self.constraints.lock().detach(handle).is_some()
    }

    // ---- namespaces -------------------------------------------------------

    /// Create a namespace
    ///
    /// Two namespaces conflict when their names are equal, or equal ignoring
    /// case and either of them is case-insensitive.
    ///
    /// # Arguments
    /// * `name` - Namespace name
    /// * `data_model` - Data model, fixed for the namespace's lifetime
    /// * `case_sensitive` - Whether names inside the namespace are case-sensitive
    ///
    /// # Returns
    /// * `Ok(NamespaceId)` of the staged namespace
    /// * `Err(CatalogError::AlreadyExists)` if the name conflicts
    pub fn create_namespace(
        &self,
        name: &str,
        data_model: DataModel,
        case_sensitive: bool,
    ) -> CatalogResult<NamespaceId> {
        let name = valid_name("namespace", name)?;
        self.stage(|state, changes| {
            ensure_namespace_name_free(state, &name, case_sensitive, None)?;
            let id = self.ids.new_namespace_id();
            let namespace = LogicalNamespace::new(id, name, data_model, case_sensitive);
            state
                .logical
                .insert(id, NamespaceCatalog::for_namespace(namespace));
            changes.push(CatalogChange::Created(CatalogObject::Namespace(id)));
            Ok(id)
        })
    }

    pub fn rename_namespace(&self, id: NamespaceId, new_name: &str) -> CatalogResult<()> {
        let new_name = valid_name("namespace", new_name)?;
        self.stage(|state, changes| {
            let current = state.namespace_catalog(id)?.namespace().clone();
            ensure_namespace_name_free(state, &new_name, current.case_sensitive, Some(id))?;
            state
                .namespace_catalog_mut(id)?
                .as_catalog_mut()
                .set_namespace(current.with_name(new_name.clone()))?;
            changes.push(CatalogChange::Renamed {
                object: CatalogObject::Namespace(id),
                from: current.name,
                to: new_name,
            });
            Ok(())
        })
    }

    /// Drop an empty namespace
    ///
    /// # Returns
    /// * `Err(CatalogError::StillReferenced)` while the namespace has entities;
    ///   use `drop_cascade` to remove them together
    pub fn drop_namespace(&self, id: NamespaceId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            let catalog = state.namespace_catalog(id)?;
            if let Some(entity) = catalog.as_catalog().entities().first() {
                return Err(CatalogError::StillReferenced {
                    object: format!("namespace '{}'", catalog.namespace().name),
                    referenced_by: format!("entity '{}'", entity.name()),
                });
            }
            state.logical.remove(&id);
            changes.push(CatalogChange::Dropped(CatalogObject::Namespace(id)));
            Ok(())
        })
    }

    // ---- adapter templates ------------------------------------------------

    /// Register an adapter kind with this process
    ///
    /// A kind registered under a taken name and mode replaces the old one.
    /// Templates already in the catalog pick up the change on the next
    /// `create_adapter_template` for that kind.
    pub fn register_adapter_kind(&self, kind: AdapterKind) -> Option<AdapterKind> {
        self.registry.write().register(kind)
    }

    pub fn adapter_kinds(&self) -> Vec<AdapterKind> {
        self.registry.read().kinds().cloned().collect()
    }

    /// Record a registered adapter kind as a catalog template
    ///
    /// Creating a template for a kind that already has one updates that
    /// template in place and keeps its id.
    ///
    /// # Returns
    /// * `Ok(AdapterTemplateId)` of the created or updated template
    /// * `Err(CatalogError::UnknownAdapterKind)` if no such kind is registered
    pub fn create_adapter_template(
        &self,
        adapter_name: &str,
        mode: AdapterMode,
    ) -> CatalogResult<AdapterTemplateId> {
        let kind = self.registry.read().resolve(adapter_name, mode)?.clone();
        self.stage(|state, changes| {
            let existing = state
                .templates
                .values()
                .find(|t| t.matches(adapter_name, mode))
                .map(|t| t.id);
            match existing {
                Some(id) => {
                    state
                        .templates
                        .insert(id, AdapterTemplate::from_kind(id, kind));
                    changes.push(CatalogChange::Updated(CatalogObject::AdapterTemplate(id)));
                    Ok(id)
                }
                None => {
                    let id = self.ids.new_adapter_template_id();
                    state
                        .templates
                        .insert(id, AdapterTemplate::from_kind(id, kind));
                    changes.push(CatalogChange::Created(CatalogObject::AdapterTemplate(id)));
                    Ok(id)
                }
            }
        })
    }

    /// Drop a template no deployed adapter uses
    pub fn drop_adapter_template(&self, id: AdapterTemplateId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            let template = state
                .template(id)
                .ok_or_else(|| CatalogError::NotFound(format!("adapter template {}", id)))?;
            if let Some(adapter) = state.adapters.values().find(|a| a.template_id == id) {
                return Err(CatalogError::StillReferenced {
                    object: format!("adapter template '{}'", template.adapter_name),
                    referenced_by: format!("adapter '{}'", adapter.unique_name),
                });
            }
            state.templates.remove(&id);
            changes.push(CatalogChange::Dropped(CatalogObject::AdapterTemplate(id)));
            Ok(())
        })
    }

    // ---- adapters ---------------------------------------------------------

    /// Deploy an adapter instance
    ///
    /// The template's default settings are merged with `overrides`, keys the
    /// template does not publish are rejected, and the template's settings
    /// hook runs last.
    ///
    /// # Arguments
    /// * `unique_name` - Instance name, stored lower-cased and globally unique
    /// * `adapter_name` - Name of the adapter kind
    /// * `mode` - Capability type of the kind
    /// * `overrides` - Settings replacing the template defaults
    ///
    /// # Returns
    /// * `Ok(AdapterId)` of the staged instance
    /// * `Err(CatalogError::NotFound)` if no template exists for the kind
    /// * `Err(CatalogError::InvalidSettings)` if the settings are rejected
    /// * `Err(CatalogError::AlreadyExists)` if the unique name is taken
    pub fn create_adapter(
        &self,
        unique_name: &str,
        adapter_name: &str,
        mode: AdapterMode,
        overrides: AdapterSettings,
    ) -> CatalogResult<AdapterId> {
        let unique_name = normalize_name(&valid_name("adapter", unique_name)?);
        self.stage(|state, changes| {
            if state.adapters.values().any(|a| a.unique_name == unique_name) {
                return Err(CatalogError::AlreadyExists(format!("adapter '{}'", unique_name)));
            }
            let template = state
                .templates
                .values()
                .find(|t| t.matches(adapter_name, mode))
                .ok_or_else(|| {
                    CatalogError::NotFound(format!("adapter template {} ({})", adapter_name, mode))
                })?;
            let settings = resolve_settings(template, &template.default_settings, &overrides)?;

            let id = self.ids.new_adapter_id();
            let adapter = AdapterInstance {
                id,
                unique_name,
                template_id: template.id,
                adapter_name: template.adapter_name.clone(),
                mode,
                settings,
                capabilities: AdapterCapabilities {
                    writable: mode == AdapterMode::Store,
                    supports_partitioning: template.supports_partitioning,
                    data_models: template.data_models.clone(),
                },
            };
            state.adapters.insert(id, adapter);
            changes.push(CatalogChange::Created(CatalogObject::Adapter(id)));
            Ok(id)
        })
    }

    /// Apply setting overrides to a deployed adapter
    ///
    /// The current settings are the base; the template hook validates the
    /// merged result.
    pub fn update_adapter_settings(
        &self,
        id: AdapterId,
        overrides: AdapterSettings,
    ) -> CatalogResult<()> {
        self.stage(|state, changes| {
            let adapter = state
                .adapter(id)
                .ok_or_else(|| CatalogError::AdapterNotFound(id.to_string()))?;
            let template = state.template(adapter.template_id).ok_or_else(|| {
                CatalogError::NotFound(format!("adapter template {}", adapter.template_id))
            })?;
            let settings = resolve_settings(template, &adapter.settings, &overrides)?;
            if let Some(adapter) = state.adapters.get_mut(&id) {
                adapter.settings = settings;
            }
            changes.push(CatalogChange::Updated(CatalogObject::Adapter(id)));
            Ok(())
        })
    }

    /// Undeploy an adapter
    ///
    /// Placements are checked against the committed snapshot, which is what
    /// concurrent readers may be using, and against the staged state.
    ///
    /// # Returns
    /// * `Err(CatalogError::StillDeployed)` while any placement references it
    /// * `Err(CatalogError::StillReferenced)` while an index is located on it
    pub fn drop_adapter(&self, id: AdapterId) -> CatalogResult<()> {
        let committed = self.snapshot();
        self.stage(|state, changes| {
            let adapter = state
                .adapter(id)
                .ok_or_else(|| CatalogError::AdapterNotFound(id.to_string()))?;
            let placements = committed
                .alloc()
                .get_placements_on_adapter(id)
                .len()
                .max(state.allocation.placements_on(id).len());
            if placements > 0 {
                return Err(CatalogError::StillDeployed {
                    adapter: adapter.unique_name.clone(),
                    placements,
                });
            }
            let located_index = state
                .logical
                .values()
                .filter_map(NamespaceCatalog::relational)
                .flat_map(|rel| rel.tables().flat_map(move |t| rel.indexes(t.id)))
                .find(|i| i.location == Some(id))
                .map(|i| i.name.clone());
            if let Some(index) = located_index {
                return Err(CatalogError::StillReferenced {
                    object: format!("adapter '{}'", adapter.unique_name),
                    referenced_by: format!("index '{}'", index),
                });
            }
            state.adapters.remove(&id);
            changes.push(CatalogChange::Dropped(CatalogObject::Adapter(id)));
            Ok(())
        })
    }

    // ---- query interfaces and users ---------------------------------------

    pub fn create_query_interface(
        &self,
        unique_name: &str,
        interface_name: &str,
        settings: BTreeMap<String, String>,
    ) -> CatalogResult<InterfaceId> {
        let unique_name = normalize_name(&valid_name("query interface", unique_name)?);
        self.stage(|state, changes| {
            if state.interfaces.values().any(|i| i.unique_name == unique_name) {
                return Err(CatalogError::AlreadyExists(format!(
                    "query interface '{}'",
                    unique_name
                )));
            }
            let id = self.ids.new_interface_id();
            state.interfaces.insert(
                id,
                QueryInterface {
                    id,
                    unique_name,
                    interface_name: interface_name.to_string(),
                    settings,
                },
            );
            changes.push(CatalogChange::Created(CatalogObject::Interface(id)));
            Ok(id)
        })
    }

    pub fn drop_query_interface(&self, id: InterfaceId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            state
                .interfaces
                .remove(&id)
                .ok_or_else(|| CatalogError::NotFound(format!("query interface {}", id)))?;
            changes.push(CatalogChange::Dropped(CatalogObject::Interface(id)));
            Ok(())
        })
    }

    pub fn create_user(&self, name: &str, password: &str) -> CatalogResult<UserId> {
        let name = valid_name("user", name)?;
        self.stage(|state, changes| {
            if state.users.values().any(|u| u.name == name) {
                return Err(CatalogError::AlreadyExists(format!("user '{}'", name)));
            }
            let id = self.ids.new_user_id();
            state.users.insert(
                id,
                CatalogUser {
                    id,
                    name,
                    password: password.to_string(),
                },
            );
            changes.push(CatalogChange::Created(CatalogObject::User(id)));
            Ok(id)
        })
    }

    pub fn drop_user(&self, id: UserId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            state
                .users
                .remove(&id)
                .ok_or_else(|| CatalogError::NotFound(format!("user {}", id)))?;
            changes.push(CatalogChange::Dropped(CatalogObject::User(id)));
            Ok(())
        })
    }

    // ---- relational entities ----------------------------------------------

    /// Create a table in a relational namespace
    ///
    /// # Returns
    /// * `Ok(EntityId)` of the staged table
    /// * `Err(CatalogError::DataModelMismatch)` if the namespace is not relational
    /// * `Err(CatalogError::AlreadyExists)` if the name is taken in the namespace
    pub fn create_table(
        &self,
        namespace_id: NamespaceId,
        name: &str,
        entity_type: EntityType,
        modifiable: bool,
    ) -> CatalogResult<EntityId> {
        let name = valid_name("table", name)?;
        self.stage(|state, changes| {
            let rel = state.namespace_catalog_mut(namespace_id)?.relational_mut()?;
            let id = self.ids.new_entity_id();
            rel.add_table(id, &name, entity_type, modifiable)?;
            changes.push(CatalogChange::Created(CatalogObject::Entity(id)));
            Ok(id)
        })
    }

    pub fn add_column(&self, table_id: EntityId, spec: ColumnSpec) -> CatalogResult<FieldId> {
        valid_name("column", &spec.name)?;
        self.stage(|state, changes| {
            let rel = table_catalog(state, table_id)?;
            let id = self.ids.new_field_id();
            rel.add_column(id, table_id, spec)?;
            changes.push(CatalogChange::Created(CatalogObject::Column(id)));
            Ok(id)
        })
    }

    /// Drop a column that no key, allocation or partitioning references
    pub fn drop_column(&self, column_id: FieldId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            if let Some(allocated) = state.allocation.columns_of_logical(column_id).first() {
                return Err(CatalogError::StillReferenced {
                    object: format!("column {}", column_id),
                    referenced_by: CatalogObject::AllocationColumn(allocated.key()).to_string(),
                });
            }
            if let Some(property) = state
                .allocation
                .properties()
                .find(|p| p.partition_column == Some(column_id))
            {
                return Err(CatalogError::StillReferenced {
                    object: format!("column {}", column_id),
                    referenced_by: format!("partitioning of entity {}", property.entity_id),
                });
            }
            let rel = owning_relational(state, |rel| rel.column(column_id).is_some())
                .ok_or_else(|| CatalogError::NotFound(format!("column {}", column_id)))?;
            let removed = rel.drop_column(column_id)?;
            sync_allocated_positions(state, removed.table_id);
            changes.push(CatalogChange::Dropped(CatalogObject::Column(column_id)));
            Ok(())
        })
    }

    /// Set the primary key of a table
    ///
    /// # Returns
    /// * `Ok(KeyId)` of the primary key
    /// * `Err(CatalogError::AlreadyExists)` if the table already has one
    pub fn set_primary_key(&self, table_id: EntityId, columns: Vec<FieldId>) -> CatalogResult<KeyId> {
        self.stage(|state, changes| {
            let rel = table_catalog(state, table_id)?;
            let key_id = self.ids.new_key_id();
            let key = rel.set_primary_key(key_id, self.ids.new_constraint_id(), table_id, columns)?;
            changes.push(CatalogChange::Created(CatalogObject::Key(key.id)));
            Ok(key.id)
        })
    }

    pub fn add_unique_constraint(
        &self,
        table_id: EntityId,
        name: &str,
        columns: Vec<FieldId>,
    ) -> CatalogResult<ConstraintId> {
        let name = valid_name("constraint", name)?;
        self.stage(|state, changes| {
            let rel = table_catalog(state, table_id)?;
            let constraint = rel.add_unique_constraint(
                self.ids.new_key_id(),
                self.ids.new_constraint_id(),
                table_id,
                &name,
                columns,
            )?;
            changes.push(CatalogChange::Created(CatalogObject::Key(constraint.key_id)));
            Ok(constraint.id)
        })
    }

    /// Add a foreign key
    ///
    /// The referenced table must live in the same namespace, and the
    /// referenced columns must form its primary key or a unique key.
    pub fn add_foreign_key(&self, table_id: EntityId, spec: ForeignKeySpec) -> CatalogResult<KeyId> {
        valid_name("foreign key", &spec.name)?;
        self.stage(|state, changes| {
            let namespace = state.entity_namespace(table_id)?;
            let referenced = state.entity_namespace(spec.referenced_table_id)?;
            if namespace != referenced {
                return Err(CatalogError::InvalidOperation(format!(
                    "foreign key '{}' references table {} in another namespace",
                    spec.name, spec.referenced_table_id
                )));
            }
            let rel = state.namespace_catalog_mut(namespace)?.relational_mut()?;
            let key = rel.add_foreign_key(
                self.ids.new_key_id(),
                self.ids.new_constraint_id(),
                table_id,
                spec,
            )?;
            changes.push(CatalogChange::Created(CatalogObject::Key(key.id)));
            Ok(key.id)
        })
    }

    /// Drop a constraint with the key it defines
    ///
    /// A key still used by an index survives as a plain key.
    pub fn drop_constraint(&self, constraint_id: ConstraintId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            let rel = owning_relational(state, |rel| rel.constraint(constraint_id).is_some())
                .ok_or_else(|| CatalogError::NotFound(format!("constraint {}", constraint_id)))?;
            let constraint = rel.drop_constraint(constraint_id)?;
            let object = CatalogObject::Key(constraint.key_id);
            if rel.key(constraint.key_id).is_some() {
                changes.push(CatalogChange::Updated(object));
            } else {
                changes.push(CatalogChange::Dropped(object));
            }
            Ok(())
        })
    }

    /// Create an index, optionally located on one adapter
    pub fn create_index(&self, table_id: EntityId, spec: IndexSpec) -> CatalogResult<IndexId> {
        valid_name("index", &spec.name)?;
        self.stage(|state, changes| {
            if let Some(adapter_id) = spec.location {
                if state.adapter(adapter_id).is_none() {
                    return Err(CatalogError::AdapterNotFound(adapter_id.to_string()));
                }
            }
            let rel = table_catalog(state, table_id)?;
            let key_id = self.ids.new_key_id();
            let index = rel.add_index(self.ids.new_index_id(), key_id, table_id, spec)?;
            if index.key_id == key_id {
                changes.push(CatalogChange::Created(CatalogObject::Key(key_id)));
            }
            changes.push(CatalogChange::Created(CatalogObject::Index(index.id)));
            Ok(index.id)
        })
    }

    pub fn drop_index(&self, index_id: IndexId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            let rel = owning_relational(state, |rel| rel.index(index_id).is_some())
                .ok_or_else(|| CatalogError::NotFound(format!("index {}", index_id)))?;
            let index = rel.drop_index(index_id)?;
            changes.push(CatalogChange::Dropped(CatalogObject::Index(index_id)));
            if rel.key(index.key_id).is_none() {
                changes.push(CatalogChange::Dropped(CatalogObject::Key(index.key_id)));
            }
            Ok(())
        })
    }

    // ---- document and graph entities --------------------------------------

    pub fn create_collection(
        &self,
        namespace_id: NamespaceId,
        name: &str,
        entity_type: EntityType,
    ) -> CatalogResult<EntityId> {
        let name = valid_name("collection", name)?;
        self.stage(|state, changes| {
            let doc = state.namespace_catalog_mut(namespace_id)?.document_mut()?;
            let id = self.ids.new_entity_id();
            doc.add_collection(id, &name, entity_type)?;
            changes.push(CatalogChange::Created(CatalogObject::Entity(id)));
            Ok(id)
        })
    }

    pub fn create_graph(&self, namespace_id: NamespaceId, name: &str) -> CatalogResult<EntityId> {
        let name = valid_name("graph", name)?;
        self.stage(|state, changes| {
            let graph = state.namespace_catalog_mut(namespace_id)?.graph_mut()?;
            let id = self.ids.new_entity_id();
            graph.add_graph(id, &name)?;
            changes.push(CatalogChange::Created(CatalogObject::Entity(id)));
            Ok(id)
        })
    }

    // ---- entities of any model --------------------------------------------

    pub fn rename_entity(&self, entity_id: EntityId, new_name: &str) -> CatalogResult<()> {
        let new_name = valid_name("entity", new_name)?;
        self.stage(|state, changes| {
            let namespace = state.entity_namespace(entity_id)?;
            let catalog = state.namespace_catalog_mut(namespace)?.as_catalog_mut();
            let from = catalog
                .entity(entity_id)
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            catalog.rename_entity(entity_id, &new_name)?;
            changes.push(CatalogChange::Renamed {
                object: CatalogObject::Entity(entity_id),
                from,
                to: new_name,
            });
            Ok(())
        })
    }

    /// Drop an entity with the children it owns
    ///
    /// Columns, keys, constraints, indexes and the partition layout go with
    /// the entity.
    ///
    /// # Returns
    /// * `Err(CatalogError::StillReferenced)` while another table's foreign
    ///   key references it or a placement still stores it
    pub fn drop_entity(&self, entity_id: EntityId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            let namespace = state.entity_namespace(entity_id)?;
            let catalog = state.namespace_catalog(namespace)?;
            let name = catalog
                .as_catalog()
                .entity(entity_id)
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            if let Some(rel) = catalog.relational() {
                if let Some(fk) = rel
                    .exported_keys(entity_id)
                    .into_iter()
                    .find(|k| k.table_id != entity_id)
                {
                    return Err(CatalogError::StillReferenced {
                        object: format!("table '{}'", name),
                        referenced_by: format!("foreign key {} of table {}", fk.id, fk.table_id),
                    });
                }
            }
            if let Some(placement) = state.allocation.placements_of(entity_id).first() {
                return Err(CatalogError::StillReferenced {
                    object: format!("entity '{}'", name),
                    referenced_by: format!("placement {}", placement.id),
                });
            }

            remove_object(state, CatalogObject::Entity(entity_id))?;
            changes.push(CatalogChange::Dropped(CatalogObject::Entity(entity_id)));
            Ok(())
        })
    }

    // ---- allocation -------------------------------------------------------

    /// Partition an entity horizontally
    ///
    /// Must happen before the entity is placed anywhere. Every group gets as
    /// many partitions as its spec asks for.
    ///
    /// # Arguments
    /// * `entity_id` - Entity to partition
    /// * `partition_type` - Partition function
    /// * `partition_column` - Column the function is applied to; required
    ///   unless `partition_type` is `None`
    /// * `groups` - One spec per partition group, in order
    pub fn partition_entity(
        &self,
        entity_id: EntityId,
        partition_type: PartitionType,
        partition_column: Option<FieldId>,
        groups: Vec<PartitionGroupSpec>,
    ) -> CatalogResult<PartitionProperty> {
        self.stage(|state, changes| {
            let namespace = state.entity_namespace(entity_id)?;
            if let Some(column_id) = partition_column {
                let owned = state
                    .namespace_catalog(namespace)?
                    .relational()
                    .and_then(|rel| rel.column(column_id))
                    .map_or(false, |c| c.table_id == entity_id);
                if !owned {
                    return Err(CatalogError::NotFound(format!(
                        "column {} of entity {}",
                        column_id, entity_id
                    )));
                }
            }

            let planned: Vec<PlannedGroup> = groups
                .into_iter()
                .map(|spec| PlannedGroup {
                    id: self.ids.new_partition_group_id(),
                    partition_ids: (0..spec.partition_count)
                        .map(|_| self.ids.new_partition_id())
                        .collect(),
                    spec,
                })
                .collect();
            let previous: Vec<_> = state
                .allocation
                .property(entity_id)
                .map(|p| p.group_ids.clone())
                .unwrap_or_default();

            let property = state.allocation.partition_entity(
                entity_id,
                namespace,
                partition_type,
                partition_column,
                planned,
            )?;
            for group in previous {
                changes.push(CatalogChange::Dropped(CatalogObject::PartitionGroup(group)));
            }
            record_layout(changes, &property);
            changes.push(CatalogChange::Updated(CatalogObject::Entity(entity_id)));
            Ok(property)
        })
    }

    /// Place an entity on an adapter
    ///
    /// Entity and adapter must both be committed. An entity without a
    /// partition layout gets its single implicit partition here.
    ///
    /// # Arguments
    /// * `entity_id` - Entity to place
    /// * `adapter_id` - Adapter that stores it
    /// * `placement_type` - Manual or automatic placement
    /// * `partitions` - Partitions the adapter holds; `None` for all of them
    ///
    /// # Returns
    /// * `Ok(PlacementId)` of the staged placement
    /// * `Err(CatalogError::EntityNotFound)` / `Err(CatalogError::AdapterNotFound)`
    ///   if either side is not committed
    /// * `Err(CatalogError::AlreadyExists)` if the entity is already placed there
    pub fn create_placement(
        &self,
        entity_id: EntityId,
        adapter_id: AdapterId,
        placement_type: PlacementType,
        partitions: Option<Vec<PartitionId>>,
    ) -> CatalogResult<PlacementId> {
        let committed = self.snapshot();
        let entity = committed
            .get_entity(entity_id)
            .ok_or_else(|| CatalogError::EntityNotFound(entity_id.to_string()))?;
        let adapter = committed
            .get_adapter(adapter_id)
            .ok_or_else(|| CatalogError::AdapterNotFound(adapter_id.to_string()))?;
        if !adapter.capabilities().supports(entity.data_model()) {
            return Err(CatalogError::DataModelMismatch {
                expected: adapter
                    .capabilities()
                    .data_models
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("|"),
                found: entity.data_model().to_string(),
            });
        }
        let supports_partitioning = adapter.capabilities().supports_partitioning;
        let namespace_id = entity.namespace_id();

        self.stage(|state, changes| {
            if state.entity(entity_id).is_none() {
                return Err(CatalogError::EntityNotFound(entity_id.to_string()));
            }
            if state.adapter(adapter_id).is_none() {
                return Err(CatalogError::AdapterNotFound(adapter_id.to_string()));
            }
            if state.allocation.property(entity_id).is_none() {
                let created = state.allocation.ensure_default_partition(
                    entity_id,
                    namespace_id,
                    self.ids.new_partition_group_id(),
                    self.ids.new_partition_id(),
                )?;
                if let Some(property) = created {
                    record_layout(changes, &property);
                }
            }
            let all = state
                .allocation
                .property(entity_id)
                .map(|p| p.partition_ids.clone())
                .unwrap_or_default();
            let held = match partitions {
                Some(held) => {
                    let covers_all = held.iter().collect::<BTreeSet<_>>()
                        == all.iter().collect::<BTreeSet<_>>();
                    if !supports_partitioning && !covers_all {
                        return Err(CatalogError::InvalidOperation(format!(
                            "adapter {} cannot hold a subset of partitions",
                            adapter_id
                        )));
                    }
                    held
                }
                None => all,
            };

            let id = self.ids.new_placement_id();
            let allocations = state.allocation.add_placement(
                AllocationPlacement {
                    id,
                    logical_id: entity_id,
                    namespace_id,
                    adapter_id,
                    placement_type,
                },
                held.into_iter()
                    .map(|p| (self.ids.new_allocation_id(), p))
                    .collect(),
            )?;
            changes.push(CatalogChange::Created(CatalogObject::Placement(id)));
            for allocation in allocations {
                changes.push(CatalogChange::Created(CatalogObject::Allocation(allocation.id)));
            }
            Ok(id)
        })
    }

    /// Materialize one column of one held partition on a placement
    pub fn add_column_allocation(
        &self,
        placement_id: PlacementId,
        partition_id: PartitionId,
        column_id: FieldId,
    ) -> CatalogResult<AllocationColumnKey> {
        self.stage(|state, changes| {
            let key = allocate_column(state, placement_id, partition_id, column_id)?;
            changes.push(CatalogChange::Created(CatalogObject::AllocationColumn(key)));
            Ok(key)
        })
    }

    /// Materialize `columns` on every partition the placement holds
    ///
    /// Columns already allocated are left alone.
    pub fn place_columns(
        &self,
        placement_id: PlacementId,
        columns: &[FieldId],
    ) -> CatalogResult<Vec<AllocationColumnKey>> {
        self.stage(|state, changes| {
            let partitions: Vec<PartitionId> = state
                .allocation
                .allocations_of_placement(placement_id)
                .iter()
                .map(|a| a.partition_id)
                .collect();
            if partitions.is_empty() {
                return Err(CatalogError::NotFound(format!("placement {}", placement_id)));
            }
            let mut created = Vec::new();
            for partition_id in partitions {
                for column_id in columns {
                    let key = AllocationColumnKey {
                        placement_id,
                        partition_id,
                        column_id: *column_id,
                    };
                    if state.allocation.column(&key).is_some() {
                        continue;
                    }
                    allocate_column(state, placement_id, partition_id, *column_id)?;
                    changes.push(CatalogChange::Created(CatalogObject::AllocationColumn(key)));
                    created.push(key);
                }
            }
            Ok(created)
        })
    }

    pub fn drop_column_allocation(&self, key: AllocationColumnKey) -> CatalogResult<()> {
        self.stage(|state, changes| {
            state.allocation.remove_column(&key)?;
            changes.push(CatalogChange::Dropped(CatalogObject::AllocationColumn(key)));
            Ok(())
        })
    }

    /// Drop a placement with its allocations and allocation columns
    ///
    /// # Returns
    /// * `Err(CatalogError::StillReferenced)` while a physical entity is bound
    ///   to one of its allocations; `drop_cascade` removes those too
    pub fn drop_placement(&self, placement_id: PlacementId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            if state.allocation.placement(placement_id).is_none() {
                return Err(CatalogError::NotFound(format!("placement {}", placement_id)));
            }
            let allocations: Vec<AllocationId> = state
                .allocation
                .allocations_of_placement(placement_id)
                .iter()
                .map(|a| a.id)
                .collect();
            for allocation_id in &allocations {
                if let Some(physical) = state.physical.by_allocation(*allocation_id) {
                    return Err(CatalogError::StillReferenced {
                        object: format!("placement {}", placement_id),
                        referenced_by: format!("physical entity '{}'", physical.physical_name),
                    });
                }
            }
            let columns: Vec<AllocationColumnKey> = state
                .allocation
                .columns_of_placement(placement_id)
                .iter()
                .map(|c| c.key())
                .collect();

            state.allocation.remove_placement(placement_id)?;
            for key in columns {
                changes.push(CatalogChange::Dropped(CatalogObject::AllocationColumn(key)));
            }
            for id in allocations {
                changes.push(CatalogChange::Dropped(CatalogObject::Allocation(id)));
            }
            changes.push(CatalogChange::Dropped(CatalogObject::Placement(placement_id)));
            Ok(())
        })
    }

    // ---- physical ---------------------------------------------------------

    /// Bind an adapter-side handle to an allocation
    pub fn create_physical(
        &self,
        allocation_id: AllocationId,
        physical_namespace_name: &str,
        physical_name: &str,
    ) -> CatalogResult<PhysicalId> {
        let physical_name = valid_name("physical entity", physical_name)?;
        self.stage(|state, changes| {
            let allocation = state
                .allocation
                .allocation(allocation_id)
                .ok_or_else(|| CatalogError::NotFound(format!("allocation {}", allocation_id)))?
                .clone();
            let data_model = state
                .entity(allocation.logical_id)
                .map(|e| e.data_model())
                .ok_or_else(|| CatalogError::EntityNotFound(allocation.logical_id.to_string()))?;
            let id = self.ids.new_physical_id();
            state.physical.add(PhysicalEntity {
                id,
                allocation_id,
                placement_id: allocation.placement_id,
                partition_id: allocation.partition_id,
                logical_id: allocation.logical_id,
                namespace_id: allocation.namespace_id,
                adapter_id: allocation.adapter_id,
                data_model,
                physical_namespace_name: physical_namespace_name.to_string(),
                physical_name,
            })?;
            changes.push(CatalogChange::Created(CatalogObject::Physical(id)));
            Ok(id)
        })
    }

    pub fn drop_physical(&self, id: PhysicalId) -> CatalogResult<()> {
        self.stage(|state, changes| {
            state.physical.remove(id)?;
            changes.push(CatalogChange::Dropped(CatalogObject::Physical(id)));
            Ok(())
        })
    }

    // ---- cascading drops --------------------------------------------------

    /// Drop an object together with everything that depends on it
    ///
    /// The drop sequence comes from the dependency resolver over the staged
    /// state. A dependency cycle rejects the whole drop before anything is
    /// removed.
    ///
    /// # Returns
    /// * `Ok(Vec<CatalogObject>)` with the dropped objects in drop order
    /// * `Err(CatalogError::NotFound)` if the object does not exist
    /// * `Err(CatalogError::CycleDetected)` if the affected objects form a cycle
    pub fn drop_cascade(&self, object: CatalogObject) -> CatalogResult<Vec<CatalogObject>> {
        self.stage(|state, changes| {
            let plan = snapshot::drop_plan(state, object)?;
            for target in &plan {
                match remove_object(state, *target) {
                    Ok(()) => {}
                    Err(err) if is_already_gone(&err) => {}
                    Err(err) => return Err(err),
                }
                changes.push(CatalogChange::Dropped(*target));
            }
            log::debug!("Cascade from {} dropped {} object(s)", object, plan.len());
            Ok(plan)
        })
    }
}

// ---- staging helpers ------------------------------------------------------

fn valid_name(kind: &str, name: &str) -> CatalogResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidOperation(format!(
            "{} name must not be empty",
            kind
        )));
    }
    Ok(trimmed.to_string())
}

fn ensure_namespace_name_free(
    state: &CatalogState,
    name: &str,
    case_sensitive: bool,
    except: Option<NamespaceId>,
) -> CatalogResult<()> {
    let conflict = state
        .namespaces()
        .filter(|ns| Some(ns.id) != except)
        .find(|ns| names_equal(&ns.name, name, case_sensitive && ns.case_sensitive));
    match conflict {
        Some(existing) => Err(CatalogError::AlreadyExists(format!(
            "namespace '{}'",
            existing.name
        ))),
        None => Ok(()),
    }
}

fn table_catalog(state: &mut CatalogState, table_id: EntityId) -> CatalogResult<&mut RelationalCatalog> {
    let namespace = state.entity_namespace(table_id)?;
    state.namespace_catalog_mut(namespace)?.relational_mut()
}

fn owning_relational<F>(state: &mut CatalogState, has: F) -> Option<&mut RelationalCatalog>
where
    F: Fn(&RelationalCatalog) -> bool,
{
    state
        .logical
        .values_mut()
        .filter_map(|c| c.relational_mut().ok())
        .find(|rel| has(rel))
}

fn record_layout(changes: &mut Vec<CatalogChange>, property: &PartitionProperty) {
    for group in &property.group_ids {
        changes.push(CatalogChange::Created(CatalogObject::PartitionGroup(*group)));
    }
    for partition in &property.partition_ids {
        changes.push(CatalogChange::Created(CatalogObject::Partition(*partition)));
    }
}

fn allocate_column(
    state: &mut CatalogState,
    placement_id: PlacementId,
    partition_id: PartitionId,
    column_id: FieldId,
) -> CatalogResult<AllocationColumnKey> {
    let placement = state
        .allocation
        .placement(placement_id)
        .ok_or_else(|| CatalogError::NotFound(format!("placement {}", placement_id)))?
        .clone();
    let column = state
        .namespace_catalog(placement.namespace_id)?
        .relational()
        .ok_or_else(|| {
            CatalogError::InvalidOperation(format!(
                "placement {} does not store a table",
                placement_id
            ))
        })?
        .column(column_id)
        .filter(|c| c.table_id == placement.logical_id)
        .ok_or_else(|| {
            CatalogError::NotFound(format!(
                "column {} of table {}",
                column_id, placement.logical_id
            ))
        })?
        .clone();

    let record = AllocationColumn {
        placement_id,
        partition_id,
        column_id,
        logical_table_id: placement.logical_id,
        namespace_id: placement.namespace_id,
        adapter_id: placement.adapter_id,
        placement_type: placement.placement_type,
        position: column.position,
    };
    let key = record.key();
    state.allocation.add_column(record)?;
    Ok(key)
}

/// Copy the current logical column positions of a table onto its
/// allocation columns
fn sync_allocated_positions(state: &mut CatalogState, table_id: EntityId) {
    let positions: BTreeMap<FieldId, u32> = state
        .logical
        .values()
        .filter_map(NamespaceCatalog::relational)
        .find(|rel| rel.table(table_id).is_some())
        .map(|rel| {
            rel.columns(table_id)
                .into_iter()
                .map(|c| (c.id, c.position))
                .collect()
        })
        .unwrap_or_default();
    state.allocation.sync_positions(table_id, &positions);
}

fn is_already_gone(err: &CatalogError) -> bool {
    matches!(
        err,
        CatalogError::NotFound(_)
            | CatalogError::EntityNotFound(_)
            | CatalogError::NamespaceNotFound(_)
            | CatalogError::AdapterNotFound(_)
    )
}

/// Remove one object without any reference checks
///
/// Owned children of the object go with it. Callers check references first,
/// or remove in dependency order.
fn remove_object(state: &mut CatalogState, object: CatalogObject) -> CatalogResult<()> {
    let missing = || CatalogError::NotFound(object.to_string());
    match object {
        CatalogObject::Namespace(id) => {
            state.logical.remove(&id).ok_or_else(missing)?;
        }
        CatalogObject::Entity(id) => {
            let namespace = state.entity_namespace(id)?;
            state
                .namespace_catalog_mut(namespace)?
                .as_catalog_mut()
                .remove_entity(id)?;
            state.allocation.remove_entity(id);
        }
        CatalogObject::Column(id) => {
            let removed = owning_relational(state, |rel| rel.column(id).is_some())
                .ok_or_else(missing)?
                .remove_column(id)?;
            sync_allocated_positions(state, removed.table_id);
            // A layout partitioned on the column goes with it
            let partitioned: Vec<EntityId> = state
                .allocation
                .properties()
                .filter(|p| p.partition_column == Some(id))
                .map(|p| p.entity_id)
                .collect();
            for entity_id in partitioned {
                state.allocation.remove_entity(entity_id);
            }
        }
        CatalogObject::Key(id) => {
            owning_relational(state, |rel| rel.key(id).is_some())
                .ok_or_else(missing)?
                .remove_key(id)?;
        }
        CatalogObject::Index(id) => {
            owning_relational(state, |rel| rel.index(id).is_some())
                .ok_or_else(missing)?
                .drop_index(id)?;
        }
        CatalogObject::AdapterTemplate(id) => {
            state.templates.remove(&id).ok_or_else(missing)?;
        }
        CatalogObject::Adapter(id) => {
            state.adapters.remove(&id).ok_or_else(missing)?;
        }
        CatalogObject::Interface(id) => {
            state.interfaces.remove(&id).ok_or_else(missing)?;
        }
        CatalogObject::User(id) => {
            state.users.remove(&id).ok_or_else(missing)?;
        }
        CatalogObject::PartitionGroup(id) => {
            state.allocation.remove_group(id)?;
        }
        CatalogObject::Partition(id) => {
            state.allocation.remove_partition(id)?;
        }
        CatalogObject::Placement(id) => {
            state.allocation.remove_placement(id)?;
        }
        CatalogObject::Allocation(id) => {
            state.allocation.remove_allocation(id)?;
        }
        CatalogObject::AllocationColumn(key) => {
            state.allocation.remove_column(&key)?;
        }
        CatalogObject::Physical(id) => {
            state.physical.remove(id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entity::PolyType;

    fn open() -> Arc<CatalogManager> {
        CatalogManager::open(CatalogConfig::testing()).unwrap()
    }

    #[test]
    fn test_empty_commit_keeps_generation() {
        let catalog = open();
        let before = catalog.snapshot().id();
        assert!(!catalog.has_pending_changes());
        assert_eq!(catalog.commit().unwrap(), before);
    }

    #[test]
    fn test_failed_mutation_leaves_staging_untouched() {
        let catalog = open();
        let ns = catalog
            .create_namespace("app", DataModel::Relational, false)
            .unwrap();
        let table = catalog.create_table(ns, "t", EntityType::Entity, true).unwrap();
        let pending = catalog.pending_changes().len();

        assert!(matches!(
            catalog.create_table(ns, "T", EntityType::Entity, true),
            Err(CatalogError::AlreadyExists(_))
        ));
        assert!(catalog.add_column(EntityId::new(999), ColumnSpec::new("c", PolyType::Integer)).is_err());
        assert_eq!(catalog.pending_changes().len(), pending);
        assert!(catalog.add_column(table, ColumnSpec::new("c", PolyType::Integer)).is_ok());
    }

    #[test]
    fn test_namespace_conflict_follows_case_flags() {
        let catalog = open();
        catalog
            .create_namespace("Strict", DataModel::Relational, true)
            .unwrap();
        // Both sides case-sensitive: different spellings coexist
        catalog
            .create_namespace("strict", DataModel::Document, true)
            .unwrap();
        // A case-insensitive newcomer conflicts with either
        assert!(matches!(
            catalog.create_namespace("STRICT", DataModel::Graph, false),
            Err(CatalogError::AlreadyExists(_))
        ));
        assert!(catalog
            .create_namespace("Strict", DataModel::Graph, true)
            .is_err());
    }

    #[test]
    fn test_entity_in_wrong_model_namespace_is_rejected() {
        let catalog = open();
        let docs = catalog
            .create_namespace("docs", DataModel::Document, false)
            .unwrap();
        assert!(matches!(
            catalog.create_table(docs, "t", EntityType::Entity, true),
            Err(CatalogError::DataModelMismatch { .. })
        ));
        assert!(catalog.create_collection(docs, "c", EntityType::Entity).is_ok());
    }

    #[test]
    fn test_closed_catalog_rejects_mutations() {
        let catalog = open();
        catalog.close();
        assert!(catalog.is_closed());
        assert_eq!(
            catalog.create_namespace("x", DataModel::Relational, false),
            Err(CatalogError::Closed)
        );
        assert_eq!(catalog.commit(), Err(CatalogError::Closed));
        // Reads keep working on the last snapshot
        assert!(catalog.snapshot().get_namespaces(None).is_empty());
    }

    #[test]
    fn test_bootstrap_defaults() {
        let config = CatalogConfig {
            test_mode: true,
            ..CatalogConfig::default()
        };
        let catalog = CatalogManager::open(config).unwrap();
        let snapshot = catalog.snapshot();
        assert!(snapshot.get_user_by_name("system").is_some());
        assert!(snapshot.get_user_by_name("pa").is_some());
        assert!(snapshot.get_namespace_by_name("PUBLIC").is_some());
        assert_eq!(snapshot.get_adapter_templates().len(), 3);
        let hsqldb = snapshot.get_adapter_by_name("HSQLDB").unwrap();
        assert_eq!(hsqldb.setting("maxConnections"), Some("25"));
        assert!(hsqldb.capabilities().writable);
    }
}
