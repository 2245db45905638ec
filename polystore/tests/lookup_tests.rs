//! Name and pattern lookups through the snapshot read API

#[path = "testutils/mod.rs"]
mod testutils;

use polystore::{
    AdapterMode, AdapterSettings, CatalogError, ColumnSpec, DataModel, EntityType, Pattern,
    PolyType,
};
use std::collections::BTreeMap;
use testutils::fixture::CatalogFixture;

#[test]
fn test_namespace_pattern_matches_case_insensitively() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    for name in ["sales", "Sales2", "SALES_ARCHIVE"] {
        catalog
            .create_namespace(name, DataModel::Relational, false)
            .unwrap();
    }
    catalog.create_namespace("wholesale", DataModel::Document, false).unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let mut names: Vec<&str> = snapshot
        .get_namespaces(Some(&Pattern::new("sales%")))
        .into_iter()
        .map(|ns| ns.name.as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["SALES_ARCHIVE", "Sales2", "sales"]);

    assert_eq!(
        snapshot
            .get_namespaces(Some(&Pattern::new("sales_")))
            .first()
            .map(|ns| ns.name.as_str()),
        Some("Sales2")
    );
}

#[test]
fn test_exactly_one_lookups() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    catalog
        .create_table(fixture.namespace, "orders", EntityType::Entity, true)
        .unwrap();
    catalog
        .create_table(fixture.namespace, "order_items", EntityType::Entity, true)
        .unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let rel = snapshot.rel();
    assert_eq!(
        rel.find_table(fixture.namespace, &Pattern::new("ORDERS"))
            .unwrap()
            .name,
        "orders"
    );
    match rel.find_table(fixture.namespace, &Pattern::new("order%")) {
        Err(CatalogError::Ambiguous { count, .. }) => assert_eq!(count, 2),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(matches!(
        rel.find_table(fixture.namespace, &Pattern::new("invoices")),
        Err(CatalogError::NoMatch(_))
    ));

    // By-id misses are absent values, not errors
    assert!(snapshot.get_namespace(polystore::catalog::id::NamespaceId::new(404)).is_none());
}

#[test]
fn test_case_sensitive_namespace_keeps_distinct_names() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let strict = catalog
        .create_namespace("strict", DataModel::Relational, true)
        .unwrap();
    catalog.create_table(strict, "Users", EntityType::Entity, true).unwrap();
    catalog.create_table(strict, "users", EntityType::Entity, true).unwrap();
    assert!(matches!(
        catalog.create_table(fixture.namespace, "A", EntityType::Entity, true).and_then(|_| {
            catalog.create_table(fixture.namespace, "a", EntityType::Entity, true)
        }),
        Err(CatalogError::AlreadyExists(_))
    ));
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    assert!(snapshot.rel().get_table_by_name(strict, "USERS").is_none());
    assert_eq!(
        snapshot
            .rel()
            .get_tables(Some(&Pattern::literal("strict")), Some(&Pattern::new("users")))
            .len(),
        1
    );
}

#[test]
fn test_model_views_only_see_their_model() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let docs = catalog
        .create_namespace("docs", DataModel::Document, false)
        .unwrap();
    let graphs = catalog
        .create_namespace("graphs", DataModel::Graph, false)
        .unwrap();
    let collection = catalog
        .create_collection(docs, "events", EntityType::Entity)
        .unwrap();
    let graph = catalog.create_graph(graphs, "social").unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    assert!(snapshot.doc().get_collection(collection).is_some());
    assert!(snapshot.rel().get_table(collection).is_none());
    assert!(snapshot.graph().get_graph(graph).is_some());
    assert!(snapshot.doc().get_collection(graph).is_none());
    assert_eq!(
        snapshot
            .doc()
            .find_collection(docs, &Pattern::new("ev%"))
            .unwrap()
            .id,
        collection
    );
    assert_eq!(snapshot.get_entities(graphs).len(), 1);

    catalog.rename_entity(collection, "audit").unwrap();
    catalog.commit().unwrap();
    assert_eq!(
        catalog.snapshot().doc().get_collection(collection).unwrap().name,
        "audit"
    );
}

#[test]
fn test_adapter_settings_and_names() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;

    // Unique names are normalized and global
    assert!(matches!(
        catalog.create_adapter("STORE1", "hsqldb", AdapterMode::Store, AdapterSettings::new()),
        Err(CatalogError::AlreadyExists(_))
    ));

    let mut overrides = AdapterSettings::new();
    overrides.insert("port".to_string(), "70000".to_string());
    assert!(matches!(
        catalog.create_adapter("pg", "postgresql", AdapterMode::Store, overrides),
        Err(CatalogError::InvalidSettings { .. })
    ));

    let mut overrides = AdapterSettings::new();
    overrides.insert("directory".to_string(), "  /data/csv ".to_string());
    let csv = catalog
        .create_adapter("files", "csv", AdapterMode::Source, overrides)
        .unwrap();
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    let adapter = snapshot.get_adapter(csv).unwrap();
    assert_eq!(adapter.setting("directory"), Some("/data/csv"));
    assert_eq!(adapter.setting("maxStringLength"), Some("255"));
    assert!(!adapter.capabilities().writable);

    let mut update = AdapterSettings::new();
    update.insert("maxStringLength".to_string(), "1024".to_string());
    catalog.update_adapter_settings(csv, update).unwrap();
    catalog.commit().unwrap();
    let snapshot = catalog.snapshot();
    let adapter = snapshot.get_adapter(csv).unwrap();
    assert_eq!(adapter.setting("maxStringLength"), Some("1024"));
    assert_eq!(adapter.setting("directory"), Some("/data/csv"));
}

#[test]
fn test_templates_interfaces_and_users() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let snapshot = catalog.snapshot();
    let hsqldb = snapshot
        .get_adapter_template_by_name("hsqldb", AdapterMode::Store)
        .unwrap()
        .id;

    // Re-creating a template updates it in place
    assert_eq!(
        catalog
            .create_adapter_template("hsqldb", AdapterMode::Store)
            .unwrap(),
        hsqldb
    );
    assert!(matches!(
        catalog.drop_adapter_template(hsqldb),
        Err(CatalogError::StillReferenced { .. })
    ));
    assert!(matches!(
        catalog.create_adapter_template("mongodb", AdapterMode::Store),
        Err(CatalogError::UnknownAdapterKind(_))
    ));

    let mut settings = BTreeMap::new();
    settings.insert("port".to_string(), "20591".to_string());
    let http = catalog
        .create_query_interface("HTTP", "http", settings)
        .unwrap();
    let user = catalog.create_user("analyst", "pw").unwrap();
    assert!(matches!(
        catalog.create_user("analyst", "other"),
        Err(CatalogError::AlreadyExists(_))
    ));
    catalog.commit().unwrap();

    let snapshot = catalog.snapshot();
    assert_eq!(snapshot.get_interface_by_name("http").unwrap().id, http);
    assert_eq!(snapshot.get_user_by_name("analyst").unwrap().id, user);

    catalog.drop_query_interface(http).unwrap();
    catalog.drop_user(user).unwrap();
    catalog.commit().unwrap();
    assert!(catalog.snapshot().get_interfaces().is_empty());
    assert!(catalog.snapshot().get_user(user).is_none());
}

#[test]
fn test_column_drop_guards() {
    let fixture = CatalogFixture::new().unwrap();
    let catalog = &fixture.catalog;
    let (table, columns) = fixture.keyed_table("guarded", &["id", "note"]).unwrap();
    catalog
        .add_column(table, ColumnSpec::new("extra", PolyType::Varchar).with_length(32))
        .unwrap();
    catalog.commit().unwrap();

    // The primary key column is referenced by its key
    assert!(matches!(
        catalog.drop_column(columns[0]),
        Err(CatalogError::StillReferenced { .. })
    ));
    catalog.drop_column(columns[1]).unwrap();
    catalog.commit().unwrap();
    assert_eq!(catalog.snapshot().rel().get_columns(table).len(), 2);
}
