// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog objects and change records
//!
//! `CatalogObject` names every object the catalog can create or drop, across
//! all three layers. `CatalogChange` is the unit recorded while a mutation is
//! staged and broadcast to subscribers after a successful commit.

use super::entity::AllocationColumnKey;
use super::id::{
    AdapterId, AdapterTemplateId, AllocationId, EntityId, FieldId, IndexId, InterfaceId, KeyId,
    NamespaceId, PartitionGroupId, PartitionId, PhysicalId, PlacementId, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to one catalog object of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogObject {
    Namespace(NamespaceId),
    Entity(EntityId),
    Column(FieldId),
    /// A key together with the constraint defined on it
    Key(KeyId),
    Index(IndexId),
    AdapterTemplate(AdapterTemplateId),
    Adapter(AdapterId),
    Interface(InterfaceId),
    User(UserId),
    PartitionGroup(PartitionGroupId),
    Partition(PartitionId),
    Placement(PlacementId),
    Allocation(AllocationId),
    AllocationColumn(AllocationColumnKey),
    Physical(PhysicalId),
}

impl CatalogObject {
    /// Lower-case kind name, as used in messages
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogObject::Namespace(_) => "namespace",
            CatalogObject::Entity(_) => "entity",
            CatalogObject::Column(_) => "column",
            CatalogObject::Key(_) => "key",
            CatalogObject::Index(_) => "index",
            CatalogObject::AdapterTemplate(_) => "adapter template",
            CatalogObject::Adapter(_) => "adapter",
            CatalogObject::Interface(_) => "interface",
            CatalogObject::User(_) => "user",
            CatalogObject::PartitionGroup(_) => "partition group",
            CatalogObject::Partition(_) => "partition",
            CatalogObject::Placement(_) => "placement",
            CatalogObject::Allocation(_) => "allocation",
            CatalogObject::AllocationColumn(_) => "allocation column",
            CatalogObject::Physical(_) => "physical entity",
        }
    }
}

impl fmt::Display for CatalogObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogObject::Namespace(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Entity(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Column(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Key(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Index(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::AdapterTemplate(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Adapter(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Interface(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::User(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::PartitionGroup(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Partition(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Placement(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::Allocation(id) => write!(f, "{} {}", self.kind(), id),
            CatalogObject::AllocationColumn(key) => write!(
                f,
                "{} {}/{}/{}",
                self.kind(),
                key.placement_id,
                key.partition_id,
                key.column_id
            ),
            CatalogObject::Physical(id) => write!(f, "{} {}", self.kind(), id),
        }
    }
}

/// One staged modification of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogChange {
    Created(CatalogObject),
    Dropped(CatalogObject),
    Renamed {
        object: CatalogObject,
        from: String,
        to: String,
    },
    /// Settings or layout of an existing object changed
    Updated(CatalogObject),
    /// Explicit `change()` without a concrete delta
    Marked,
    /// The whole catalog was reset
    Cleared,
}

impl CatalogChange {
    pub fn object(&self) -> Option<CatalogObject> {
        match self {
            CatalogChange::Created(o) | CatalogChange::Dropped(o) | CatalogChange::Updated(o) => {
                Some(*o)
            }
            CatalogChange::Renamed { object, .. } => Some(*object),
            CatalogChange::Marked | CatalogChange::Cleared => None,
        }
    }
}

impl fmt::Display for CatalogChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogChange::Created(o) => write!(f, "created {}", o),
            CatalogChange::Dropped(o) => write!(f, "dropped {}", o),
            CatalogChange::Renamed { object, from, to } => {
                write!(f, "renamed {} from '{}' to '{}'", object, from, to)
            }
            CatalogChange::Updated(o) => write!(f, "updated {}", o),
            CatalogChange::Marked => write!(f, "marked changed"),
            CatalogChange::Cleared => write!(f, "cleared catalog"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let change = CatalogChange::Renamed {
            object: CatalogObject::Namespace(NamespaceId::new(2)),
            from: "a".into(),
            to: "b".into(),
        };
        assert_eq!(change.to_string(), "renamed namespace 2 from 'a' to 'b'");

        let key = AllocationColumnKey {
            placement_id: PlacementId::new(1),
            partition_id: PartitionId::new(2),
            column_id: FieldId::new(3),
        };
        assert_eq!(
            CatalogChange::Dropped(CatalogObject::AllocationColumn(key)).to_string(),
            "dropped allocation column 1/2/3"
        );
        assert_eq!(CatalogChange::Cleared.object(), None);
    }
}
