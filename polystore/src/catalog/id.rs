// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Identifier types and the per-kind id allocator
//!
//! Every catalog object kind has its own newtype id and its own counter. Ids of
//! different kinds may coincide numerically but are never comparable, the type
//! system keeps them apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Id of a namespace (schema, document database or graph namespace)
    NamespaceId
);
catalog_id!(
    /// Id of a logical entity: table, collection or graph
    EntityId
);
catalog_id!(
    /// Id of a column or document field
    FieldId
);
catalog_id!(AdapterId);
catalog_id!(AdapterTemplateId);
catalog_id!(InterfaceId);
catalog_id!(KeyId);
catalog_id!(IndexId);
catalog_id!(ConstraintId);
catalog_id!(UserId);
catalog_id!(PartitionGroupId);
catalog_id!(PartitionId);
catalog_id!(PlacementId);
catalog_id!(
    /// Id of the allocation of one partition on one placement
    AllocationId
);
catalog_id!(PhysicalId);
catalog_id!(
    /// Generation number of a published snapshot
    SnapshotId
);

/// Lock-free id allocator with one monotonic counter per kind
///
/// Ids handed out for a mutation that is later rolled back are never reissued,
/// they are simply abandoned.
#[derive(Debug, Default)]
pub struct IdBuilder {
    namespace: AtomicU64,
    entity: AtomicU64,
    field: AtomicU64,
    adapter: AtomicU64,
    adapter_template: AtomicU64,
    interface: AtomicU64,
    key: AtomicU64,
    index: AtomicU64,
    constraint: AtomicU64,
    user: AtomicU64,
    group: AtomicU64,
    partition: AtomicU64,
    placement: AtomicU64,
    allocation: AtomicU64,
    physical: AtomicU64,
    snapshot: AtomicU64,
}

fn next(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::SeqCst)
}

/// Move a counter forward so that the next id is strictly greater than `seen`
fn advance(counter: &AtomicU64, seen: u64) {
    counter.fetch_max(seen.saturating_add(1), Ordering::SeqCst);
}

impl IdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_namespace_id(&self) -> NamespaceId {
        NamespaceId(next(&self.namespace))
    }

    pub fn new_entity_id(&self) -> EntityId {
        EntityId(next(&self.entity))
    }

    pub fn new_field_id(&self) -> FieldId {
        FieldId(next(&self.field))
    }

    pub fn new_adapter_id(&self) -> AdapterId {
        AdapterId(next(&self.adapter))
    }

    pub fn new_adapter_template_id(&self) -> AdapterTemplateId {
        AdapterTemplateId(next(&self.adapter_template))
    }

    pub fn new_interface_id(&self) -> InterfaceId {
        InterfaceId(next(&self.interface))
    }

    pub fn new_key_id(&self) -> KeyId {
        KeyId(next(&self.key))
    }

    pub fn new_index_id(&self) -> IndexId {
        IndexId(next(&self.index))
    }

    pub fn new_constraint_id(&self) -> ConstraintId {
        ConstraintId(next(&self.constraint))
    }

    pub fn new_user_id(&self) -> UserId {
        UserId(next(&self.user))
    }

    pub fn new_partition_group_id(&self) -> PartitionGroupId {
        PartitionGroupId(next(&self.group))
    }

    pub fn new_partition_id(&self) -> PartitionId {
        PartitionId(next(&self.partition))
    }

    pub fn new_placement_id(&self) -> PlacementId {
        PlacementId(next(&self.placement))
    }

    pub fn new_allocation_id(&self) -> AllocationId {
        AllocationId(next(&self.allocation))
    }

    pub fn new_physical_id(&self) -> PhysicalId {
        PhysicalId(next(&self.physical))
    }

    pub fn new_snapshot_id(&self) -> SnapshotId {
        SnapshotId(next(&self.snapshot))
    }

    /// Advance counters past every id present in restored state
    pub(crate) fn observe(&self, seen: ObservedIds) {
        let pairs = [
            (&self.namespace, seen.namespace),
            (&self.entity, seen.entity),
            (&self.field, seen.field),
            (&self.adapter, seen.adapter),
            (&self.adapter_template, seen.adapter_template),
            (&self.interface, seen.interface),
            (&self.key, seen.key),
            (&self.index, seen.index),
            (&self.constraint, seen.constraint),
            (&self.user, seen.user),
            (&self.group, seen.group),
            (&self.partition, seen.partition),
            (&self.placement, seen.placement),
            (&self.allocation, seen.allocation),
            (&self.physical, seen.physical),
            (&self.snapshot, seen.snapshot),
        ];
        for (counter, max) in pairs {
            if let Some(max) = max {
                advance(counter, max);
            }
        }
    }
}

/// Highest id per kind found in persisted state
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ObservedIds {
    pub namespace: Option<u64>,
    pub entity: Option<u64>,
    pub field: Option<u64>,
    pub adapter: Option<u64>,
    pub adapter_template: Option<u64>,
    pub interface: Option<u64>,
    pub key: Option<u64>,
    pub index: Option<u64>,
    pub constraint: Option<u64>,
    pub user: Option<u64>,
    pub group: Option<u64>,
    pub partition: Option<u64>,
    pub placement: Option<u64>,
    pub allocation: Option<u64>,
    pub physical: Option<u64>,
    pub snapshot: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_ids_are_strictly_increasing_per_kind() {
        let ids = IdBuilder::new();
        let first = ids.new_entity_id();
        let second = ids.new_entity_id();
        let third = ids.new_entity_id();
        assert!(first < second && second < third);

        // Other kinds have their own counter
        assert_eq!(ids.new_namespace_id().as_u64(), 0);
        assert_eq!(ids.new_namespace_id().as_u64(), 1);
    }

    #[test]
    fn test_concurrent_allocation_is_unique() {
        let ids = Arc::new(IdBuilder::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || {
                    let mut local = Vec::with_capacity(500);
                    for _ in 0..500 {
                        local.push(ids.new_placement_id());
                    }
                    local
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let local = handle.join().unwrap();
            assert!(local.windows(2).all(|w| w[0] < w[1]));
            for id in local {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn test_observe_never_moves_backwards() {
        let ids = IdBuilder::new();
        for _ in 0..10 {
            ids.new_key_id();
        }
        ids.observe(ObservedIds {
            key: Some(3),
            adapter: Some(41),
            ..Default::default()
        });
        assert_eq!(ids.new_key_id().as_u64(), 10);
        assert_eq!(ids.new_adapter_id().as_u64(), 42);
    }
}
