//! Placement, partitioning and physical binding of logical entities

#[path = "testutils/mod.rs"]
mod testutils;

use polystore::catalog::entity::{AdapterKind, AllocationColumnKey};
use polystore::{
    AdapterMode, AdapterSettings, CatalogError, CatalogObject, DataModel, EntityType,
    PartitionBounds, PartitionGroupSpec, PartitionType, PlacementType,
};
use testutils::fixture::CatalogFixture;

fn hash_groups(groups: u32) -> Vec<PartitionGroupSpec> {
    (0..groups)
        .map(|i| PartitionGroupSpec::new(format!("p{}", i), PartitionBounds::Bucket(i)))
        .collect()
}

#[test]
fn test_partition_round_trip() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("measurements", &["c1", "c2"]).unwrap();

    let property = catalog
        .partition_entity(table, PartitionType::Hash, Some(columns[0]), hash_groups(2))
        .unwrap();
    catalog.commit().unwrap();
    let (g1, g2) = (property.group_ids[0], property.group_ids[1]);
    let (p1, p2) = (property.partition_ids[0], property.partition_ids[1]);

    let placement = catalog
        .create_placement(table, fixture.adapter, PlacementType::Manual, None)
        .unwrap();
    catalog
        .add_column_allocation(placement, p1, columns[0])
        .unwrap();
    catalog
        .add_column_allocation(placement, p2, columns[0])
        .unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let alloc = snapshot.alloc();
    assert!(alloc.is_partitioned(table));
    assert_eq!(alloc.get_partitions(table).len(), 2);

    let rows = alloc.column_allocs_by_partition_group(table, g1, columns[0]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].partition_id, p1);
    assert_eq!(rows[0].placement_id, placement);

    let rows = alloc.column_allocs_by_partition_group(table, g2, columns[0]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].partition_id, p2);

    assert!(alloc
        .column_allocs_by_partition_group(table, g1, columns[1])
        .is_empty());
    assert_eq!(alloc.column_allocs_by_column(columns[0]).len(), 2);
    assert_eq!(alloc.adapters_by_partition_group(g1), vec![fixture.adapter]);
}

#[test]
fn test_unpartitioned_entity_gets_single_implicit_partition() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("plain", &["a", "b"]).unwrap();

    let placement = catalog
        .create_placement(table, fixture.adapter, PlacementType::Automatic, None)
        .unwrap();
    let created = catalog.place_columns(placement, &columns).unwrap();
    assert_eq!(created.len(), 2);
    // Placing the same columns again is a no-op
    assert!(catalog.place_columns(placement, &columns).unwrap().is_empty());
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let alloc = snapshot.alloc();
    assert!(!alloc.is_partitioned(table));
    assert_eq!(alloc.get_partitions(table).len(), 1);
    assert_eq!(alloc.get_allocations(placement).len(), 1);

    let on_placement = alloc.column_allocs_on_placement(placement);
    let positions: Vec<u32> = on_placement.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![1, 2]);
}

#[test]
fn test_replicas_are_listed_per_adapter_without_partition_duplicates() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("replicated", &["id"]).unwrap();
    catalog
        .partition_entity(table, PartitionType::Hash, Some(columns[0]), hash_groups(3))
        .unwrap();
    catalog.commit().unwrap();

    let first = catalog
        .create_placement(table, fixture.adapter, PlacementType::Manual, None)
        .unwrap();
    let second = catalog
        .create_placement(table, fixture.second_adapter, PlacementType::Manual, None)
        .unwrap();
    catalog.place_columns(first, &columns).unwrap();
    catalog.place_columns(second, &columns).unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let alloc = snapshot.alloc();
    assert_eq!(alloc.get_placements(table).len(), 2);
    assert_eq!(
        alloc.get_placement_on(table, fixture.adapter).map(|p| p.id),
        Some(first)
    );
    assert_eq!(alloc.get_allocations_on_adapter(fixture.second_adapter).len(), 3);
    // Three partitions on two replicas
    assert_eq!(alloc.column_allocs_by_column(columns[0]).len(), 6);

    // A second placement on the same adapter is rejected
    assert!(matches!(
        catalog.create_placement(table, fixture.adapter, PlacementType::Manual, None),
        Err(CatalogError::AlreadyExists(_))
    ));
}

#[test]
fn test_placement_requires_committed_entity_and_adapter() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;

    let staged = catalog
        .create_table(fixture.namespace, "staged", EntityType::Entity, true)
        .unwrap();
    assert!(matches!(
        catalog.create_placement(staged, fixture.adapter, PlacementType::Manual, None),
        Err(CatalogError::EntityNotFound(_))
    ));
    catalog.commit().unwrap();

    let adapter = catalog
        .create_adapter("late", "hsqldb", AdapterMode::Store, AdapterSettings::new())
        .unwrap();
    assert!(matches!(
        catalog.create_placement(staged, adapter, PlacementType::Manual, None),
        Err(CatalogError::AdapterNotFound(_))
    ));
    catalog.commit().unwrap();
    assert!(catalog
        .create_placement(staged, adapter, PlacementType::Manual, None)
        .is_ok());
}

#[test]
fn test_adapter_cannot_host_foreign_data_model() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let graphs = catalog
        .create_namespace("graphs", DataModel::Graph, false)
        .unwrap();
    let graph = catalog.create_graph(graphs, "social").unwrap();
    catalog.commit().unwrap();

    assert!(matches!(
        catalog.create_placement(graph, fixture.second_adapter, PlacementType::Manual, None),
        Err(CatalogError::DataModelMismatch { .. })
    ));
}

#[test]
fn test_referential_guard_on_adapter_drop() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("guarded", &["a"]).unwrap();
    let placement = catalog
        .create_placement(table, fixture.adapter, PlacementType::Manual, None)
        .unwrap();
    catalog.place_columns(placement, &columns).unwrap();
    catalog.commit().unwrap();

    match catalog.drop_adapter(fixture.adapter) {
        Err(CatalogError::StillDeployed { adapter, placements }) => {
            assert_eq!(adapter, "store1");
            assert_eq!(placements, 1);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // Dropping the placement alone is not enough until it is committed
    catalog.drop_placement(placement).unwrap();
    assert!(matches!(
        catalog.drop_adapter(fixture.adapter),
        Err(CatalogError::StillDeployed { .. })
    ));
    catalog.commit().unwrap();

    catalog.drop_adapter(fixture.adapter).unwrap();
    catalog.commit().unwrap();
    assert!(catalog.snapshot().get_adapter(fixture.adapter).is_none());
    assert!(catalog
        .snapshot()
        .alloc()
        .column_allocs_by_column(columns[0])
        .is_empty());
}

#[test]
fn test_allocation_column_triples_are_unique() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("triples", &["a"]).unwrap();
    let placement = catalog
        .create_placement(table, fixture.adapter, PlacementType::Manual, None)
        .unwrap();
    // The implicit partition is staged with the placement
    assert!(catalog.snapshot().alloc().get_partitions(table).is_empty());
    catalog.commit().unwrap();

    let partition = catalog.snapshot().alloc().get_partitions(table)[0].id;
    let key = catalog
        .add_column_allocation(placement, partition, columns[0])
        .unwrap();
    assert_eq!(
        key,
        AllocationColumnKey {
            placement_id: placement,
            partition_id: partition,
            column_id: columns[0],
        }
    );
    assert!(matches!(
        catalog.add_column_allocation(placement, partition, columns[0]),
        Err(CatalogError::AlreadyExists(_))
    ));
}

#[test]
fn test_repartitioning_is_rejected_once_placed() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("fixed", &["a"]).unwrap();
    catalog
        .create_placement(table, fixture.adapter, PlacementType::Manual, None)
        .unwrap();

    assert!(matches!(
        catalog.partition_entity(table, PartitionType::Hash, Some(columns[0]), hash_groups(2)),
        Err(CatalogError::InvalidOperation(_))
    ));
    // A column of another table cannot drive partitioning
    let (other, other_columns) = {
        catalog.commit().unwrap();
        fixture.table("other", &["b"]).unwrap()
    };
    assert!(matches!(
        catalog.partition_entity(other, PartitionType::Hash, Some(columns[0]), hash_groups(2)),
        Err(CatalogError::NotFound(_))
    ));
    assert!(catalog
        .partition_entity(other, PartitionType::Hash, Some(other_columns[0]), hash_groups(2))
        .is_ok());
}

#[test]
fn test_physical_binding() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, _) = fixture.table("bound", &["a"]).unwrap();
    let placement = catalog
        .create_placement(table, fixture.adapter, PlacementType::Manual, None)
        .unwrap();
    catalog.commit().unwrap();

    let allocation = catalog.snapshot().alloc().get_allocations(placement)[0].id;
    let physical = catalog
        .create_physical(allocation, "public", "tab7_part0")
        .unwrap();
    assert!(matches!(
        catalog.create_physical(allocation, "public", "again"),
        Err(CatalogError::AlreadyExists(_))
    ));
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let phys = snapshot.physical();
    assert_eq!(phys.get_physical_table(physical).unwrap().physical_name, "tab7_part0");
    assert!(phys.get_physical_collection(physical).is_none());
    assert_eq!(
        phys.get_physical_by_allocation(allocation).map(|p| p.id),
        Some(physical)
    );
    assert_eq!(phys.get_physicals_on_adapter(fixture.adapter).len(), 1);

    // The placement cannot go while a physical entity is bound to it
    assert!(matches!(
        catalog.drop_placement(placement),
        Err(CatalogError::StillReferenced { .. })
    ));
    let dropped = catalog
        .drop_cascade(CatalogObject::Placement(placement))
        .unwrap();
    assert_eq!(dropped.first(), Some(&CatalogObject::Physical(physical)));
    assert_eq!(dropped.last(), Some(&CatalogObject::Placement(placement)));
    catalog.commit().unwrap();
    assert!(catalog.snapshot().physical().get_physical(physical).is_none());
}

#[test]
fn test_partition_listed_twice_is_rejected() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("doubled", &["id"]).unwrap();
    let property = catalog
        .partition_entity(table, PartitionType::Hash, Some(columns[0]), hash_groups(2))
        .unwrap();
    catalog.commit().unwrap();
    let (p1, p2) = (property.partition_ids[0], property.partition_ids[1]);

    assert!(matches!(
        catalog.create_placement(table, fixture.adapter, PlacementType::Manual, Some(vec![p1, p1])),
        Err(CatalogError::InvalidOperation(_))
    ));
    assert!(!catalog.has_pending_changes());

    // An adapter that cannot split an entity must hold every partition
    let mut kind = AdapterKind::new("whole", AdapterMode::Store);
    kind.supports_partitioning = false;
    catalog.register_adapter_kind(kind);
    catalog
        .create_adapter_template("whole", AdapterMode::Store)
        .unwrap();
    let whole = catalog
        .create_adapter("whole1", "whole", AdapterMode::Store, AdapterSettings::new())
        .unwrap();
    catalog.commit().unwrap();

    for partial in [vec![p1], vec![p1, p1]] {
        assert!(matches!(
            catalog.create_placement(table, whole, PlacementType::Manual, Some(partial)),
            Err(CatalogError::InvalidOperation(_))
        ));
    }
    let placement = catalog
        .create_placement(table, whole, PlacementType::Manual, Some(vec![p2, p1]))
        .unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let mut held: Vec<_> = snapshot
        .alloc()
        .get_allocations(placement)
        .iter()
        .map(|a| a.partition_id)
        .collect();
    held.sort();
    assert_eq!(held, vec![p1, p2]);
}

#[test]
fn test_allocated_positions_follow_column_drop() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.table("shifting", &["a", "b", "c"]).unwrap();
    let placement = catalog
        .create_placement(table, fixture.adapter, PlacementType::Manual, None)
        .unwrap();
    catalog.place_columns(placement, &columns[1..]).unwrap();
    catalog.commit().unwrap();

    catalog.drop_column(columns[0]).unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let allocated = snapshot.alloc().column_allocs_on_placement(placement);
    let positions: Vec<u32> = allocated.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![1, 2]);
    for column in allocated {
        assert_eq!(
            column.position,
            snapshot.rel().get_column(column.column_id).unwrap().position
        );
    }
}
