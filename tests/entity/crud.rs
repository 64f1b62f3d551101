//! Create, load, save and reload

use crate::common::*;

#[tokio::test]
async fn create_then_load_42_ids() {
    let (_store, table) = item_table().await;
    let array = random_array(42);

    let created = table
        .create(item("my-test-item", "first", array.clone()))
        .await
        .unwrap();
    assert_eq!(created.slug_id_array("data"), Some(&array));

    let loaded = table.load(&item_keys("my-test-item", "first")).await.unwrap();
    let loaded_array = loaded.slug_id_array("data").unwrap();
    assert_eq!(loaded_array, &array);
    assert_eq!(loaded_array, created.slug_id_array("data").unwrap());
    assert_eq!(loaded.etag(), created.etag());
    assert_eq!(loaded.state(), EntityState::Created);
}

#[tokio::test]
async fn create_existing_identity_fails() {
    let (store, table) = item_table().await;
    table.create(item("a", "b", random_array(1))).await.unwrap();

    let err = table
        .create(item("a", "b", random_array(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EntityAlreadyExists { .. }));
    assert_eq!(store.row_count(TABLE), Some(1));

    let loaded = table.load(&item_keys("a", "b")).await.unwrap();
    assert_eq!(loaded.slug_id_array("data").unwrap().len(), 1);
}

#[tokio::test]
async fn load_absent_identity_fails() {
    let (_store, table) = item_table().await;
    let err = table.load(&item_keys("nobody", "here")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn operations_before_ensure_table_fail() {
    let store = std::sync::Arc::new(InMemoryTableStore::new());
    let table = EntityTable::new(store, TABLE, item_schema());
    let err = table.create(item("a", "b", random_array(1))).await.unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));
}

#[tokio::test]
async fn ensure_table_is_idempotent() {
    let (_store, table) = item_table().await;
    table.create(item("a", "b", random_array(3))).await.unwrap();
    table.ensure_table().await.unwrap();
    assert!(table.load(&item_keys("a", "b")).await.is_ok());
}

#[tokio::test]
async fn keys_with_reserved_characters() {
    let (_store, table) = item_table().await;
    let created = table
        .create(item("dir/file#1?", "", random_array(2)))
        .await
        .unwrap();
    assert_eq!(created.partition_key(), "dir!2Ffile!231!3F");
    assert_eq!(created.row_key(), "!");

    let loaded = table.load(&item_keys("dir/file#1?", "")).await.unwrap();
    assert_eq!(loaded.get("id"), Some(&Value::from("dir/file#1?")));
}

#[tokio::test]
async fn save_persists_changes_and_states() {
    let (store, table) = item_table().await;
    let mut entity = table.create(item("a", "b", random_array(3))).await.unwrap();
    assert_eq!(entity.state(), EntityState::Created);

    let extra = SlugId::v4();
    entity.slug_id_array_mut("data").unwrap().push(extra);
    assert_eq!(entity.state(), EntityState::Modified);
    assert_eq!(entity.changed_properties(), vec!["data"]);

    let before = entity.etag().clone();
    table.save(&mut entity).await.unwrap();
    assert_eq!(entity.state(), EntityState::Saved);
    assert_ne!(entity.etag(), &before);

    let loaded = table.load(&item_keys("a", "b")).await.unwrap();
    assert_eq!(loaded.slug_id_array("data").unwrap().len(), 4);
    assert_eq!(loaded.slug_id_array("data").unwrap().index_of(&extra), Some(3));
    assert_eq!(loaded.etag(), entity.etag());
    assert_eq!(raw_row(&store, &loaded).await.len(), 5);
}

#[tokio::test]
async fn save_without_changes_does_not_write() {
    let (_store, table) = item_table().await;
    let mut entity = table.create(item("a", "b", random_array(3))).await.unwrap();
    let etag = entity.etag().clone();

    table.save(&mut entity).await.unwrap();
    assert_eq!(entity.etag(), &etag);
    assert_eq!(entity.state(), EntityState::Created);
}

#[tokio::test]
async fn key_properties_are_immutable() {
    let (_store, table) = item_table().await;
    let mut entity = table.create(item("a", "b", random_array(1))).await.unwrap();
    assert!(matches!(
        entity.set("name", "c"),
        Err(Error::InvalidOperation(_))
    ));
    assert!(matches!(
        entity.set("data", "not ids"),
        Err(Error::InvalidValue { .. })
    ));
}

#[tokio::test]
async fn reload_discards_local_edits() {
    let (_store, table) = item_table().await;
    let original = random_array(5);
    let mut entity = table
        .create(item("a", "b", original.clone()))
        .await
        .unwrap();

    entity.set("data", random_array(1)).unwrap();
    table.reload(&mut entity).await.unwrap();
    assert_eq!(entity.slug_id_array("data"), Some(&original));
    assert_eq!(entity.state(), EntityState::Created);
}

#[tokio::test]
async fn richer_schema_round_trip() {
    init_tracing();
    let store = std::sync::Arc::new(InMemoryTableStore::new());
    let schema = Schema::configure(
        SchemaDefinition::new(3)
            .partition_key(KeyBuilder::constant_key("docs"))
            .row_key(KeyBuilder::composite_key(["owner", "slug"]))
            .property("owner", "String")
            .property("slug", "SlugId")
            .property("body", "Text")
            .property("meta", "JSON")
            .property("raw", "Blob")
            .property("score", "Number")
            .property("public", "Boolean")
            .property("created", "Date"),
        &TypeRegistry::builtin(),
    )
    .unwrap();
    let table = EntityTable::new(store, "docs", schema)
        .with_max_chunk_size(1024)
        .unwrap();
    table.ensure_table().await.unwrap();

    let slug = SlugId::nice();
    let body = "lorem ipsum ".repeat(500);
    let meta = serde_json::json!({"tags": ["a", "b"], "n": 3});
    let mut props = Properties::new();
    props.insert("owner".to_string(), Value::from("alice"));
    props.insert("slug".to_string(), Value::from(slug));
    props.insert("body".to_string(), Value::Text(body.clone()));
    props.insert("meta".to_string(), Value::from(meta.clone()));
    props.insert("raw".to_string(), Value::from(vec![7u8; 3000]));
    props.insert("score".to_string(), Value::from(9.5));
    let created = table.create(props).await.unwrap();
    assert_eq!(created.row_key(), format!("alice~{}", slug));

    let mut keys = Properties::new();
    keys.insert("owner".to_string(), Value::from("alice"));
    keys.insert("slug".to_string(), Value::from(slug));
    let loaded = table.load(&keys).await.unwrap();
    assert_eq!(loaded.get("body"), Some(&Value::Text(body)));
    assert_eq!(loaded.get("meta"), Some(&Value::from(meta)));
    assert_eq!(loaded.get("raw"), Some(&Value::from(vec![7u8; 3000])));
    assert_eq!(loaded.get("score"), Some(&Value::from(9.5)));
    assert_eq!(loaded.get("public"), Some(&Value::from(false)));
    assert_eq!(loaded.properties(), created.properties());
}
