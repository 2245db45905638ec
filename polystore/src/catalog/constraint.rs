// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Commit constraints
//!
//! A commit constraint is a predicate over a candidate snapshot. Every
//! attached constraint runs, in attach order, on every commit; the first one
//! returning `false` aborts the commit and its description is reported.

use super::error::{CatalogError, CatalogResult};
use super::snapshot::Snapshot;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Snapshot) -> bool + Send + Sync>;

/// A named predicate gating publication of a snapshot
#[derive(Clone)]
pub struct CommitConstraint {
    description: String,
    predicate: Predicate,
}

impl CommitConstraint {
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Snapshot) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn holds(&self, snapshot: &Snapshot) -> bool {
        (self.predicate)(snapshot)
    }
}

impl fmt::Debug for CommitConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitConstraint")
            .field("description", &self.description)
            .finish()
    }
}

/// Returned by attach, used to detach the constraint again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle(u64);

impl fmt::Display for ConstraintHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint#{}", self.0)
    }
}

/// Ordered set of attached commit constraints
#[derive(Debug, Default)]
pub struct ConstraintSet {
    next: u64,
    constraints: Vec<(ConstraintHandle, CommitConstraint)>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding the referential-integrity constraints every catalog carries
    pub fn with_builtin() -> Self {
        let mut set = Self::new();
        for constraint in builtin_constraints() {
            set.attach(constraint);
        }
        set
    }

    pub fn attach(&mut self, constraint: CommitConstraint) -> ConstraintHandle {
        let handle = ConstraintHandle(self.next);
        self.next += 1;
        log::debug!("Attached commit constraint {}: {}", handle, constraint.description());
        self.constraints.push((handle, constraint));
        handle
    }

    /// Remove a constraint; returns it if the handle was attached
    pub fn detach(&mut self, handle: ConstraintHandle) -> Option<CommitConstraint> {
        let position = self.constraints.iter().position(|(h, _)| *h == handle)?;
        Some(self.constraints.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Run every constraint against `snapshot`
    ///
    /// # Returns
    /// * `Ok(())` if all constraints hold
    /// * `Err(CatalogError::CommitConstraintViolated)` naming the first failing one
    pub fn validate(&self, snapshot: &Snapshot) -> CatalogResult<()> {
        for (_, constraint) in &self.constraints {
            if !constraint.holds(snapshot) {
                return Err(CatalogError::CommitConstraintViolated {
                    description: constraint.description().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Referential invariants checked on every commit
pub fn builtin_constraints() -> Vec<CommitConstraint> {
    vec![
        CommitConstraint::new("every entity references a live namespace", |s| {
            s.state().logical.iter().all(|(id, catalog)| {
                let namespace_id = catalog.namespace().id;
                namespace_id == *id
                    && catalog
                        .as_catalog()
                        .entities()
                        .iter()
                        .all(|e| e.namespace_id() == namespace_id)
            })
        }),
        CommitConstraint::new(
            "every placement references a live entity and adapter",
            |s| {
                s.state().allocation.placements().all(|p| {
                    s.get_entity(p.logical_id).is_some() && s.get_adapter(p.adapter_id).is_some()
                })
            },
        ),
        CommitConstraint::new(
            "allocation columns reference a live placement, partition and column",
            |s| {
                let alloc = s.alloc();
                s.state().allocation.columns().all(|c| {
                    alloc.get_placement(c.placement_id).is_some()
                        && alloc.get_partition(c.partition_id).is_some()
                        && s.rel().get_column(c.column_id).is_some()
                })
            },
        ),
        CommitConstraint::new(
            "every placement holds at least one partition of its entity's layout",
            |s| {
                let alloc = s.alloc();
                s.state().allocation.placements().all(|p| {
                    let Some(property) = alloc.get_partition_property(p.logical_id) else {
                        return false;
                    };
                    let allocations = alloc.get_allocations(p.id);
                    !allocations.is_empty()
                        && allocations
                            .iter()
                            .all(|a| property.partition_ids.contains(&a.partition_id))
                })
            },
        ),
        CommitConstraint::new("physical entities reference a live allocation", |s| {
            s.state()
                .physical
                .iter()
                .all(|p| s.alloc().get_allocation(p.allocation_id).is_some())
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::SnapshotId;
    use crate::catalog::state::CatalogState;

    fn empty_snapshot() -> Snapshot {
        Snapshot::build(SnapshotId::new(0), CatalogState::new())
    }

    #[test]
    fn test_first_failing_constraint_is_reported() {
        let mut set = ConstraintSet::new();
        set.attach(CommitConstraint::new("always", |_| true));
        set.attach(CommitConstraint::new("never", |_| false));
        set.attach(CommitConstraint::new("also never", |_| false));

        match set.validate(&empty_snapshot()) {
            Err(CatalogError::CommitConstraintViolated { description }) => {
                assert_eq!(description, "never")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_detach_removes_only_that_constraint() {
        let mut set = ConstraintSet::new();
        let keep = set.attach(CommitConstraint::new("keep", |_| true));
        let reject = set.attach(CommitConstraint::new("reject", |_| false));
        assert!(set.validate(&empty_snapshot()).is_err());

        assert!(set.detach(reject).is_some());
        assert!(set.detach(reject).is_none());
        assert_eq!(set.len(), 1);
        assert!(set.validate(&empty_snapshot()).is_ok());
        assert_ne!(keep, reject);
    }

    #[test]
    fn test_builtin_constraints_accept_empty_catalog() {
        let set = ConstraintSet::with_builtin();
        assert_eq!(set.len(), 5);
        assert!(set.validate(&empty_snapshot()).is_ok());
    }
}
