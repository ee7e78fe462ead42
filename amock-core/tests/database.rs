use std::path::PathBuf;
use std::sync::Arc;

use amock_core::{CoreError, Database, TableOrigin, TableSource};
use amock_schema::RawSchema;
use amock_store::{InMemoryStore, JsonFileStore, TableStore};
use amock_types::{Record, RecordId, MAX_SEQUENCE};
use serde_json::{json, Value};

fn raw(v: Value) -> RawSchema {
    serde_json::from_value(v).unwrap()
}

fn obj(v: Value) -> Record {
    v.as_object().cloned().unwrap()
}

fn users_schema() -> RawSchema {
    raw(json!({
        "id!": "id",
        "name": "string.name",
        "email!": "string.email",
        "nickname?": "string.username",
        "age": "number.int:18-99",
        "role": "enum:admin,user,guest"
    }))
}

async fn users_db(init_count: usize) -> (Arc<InMemoryStore>, Database) {
    let store = Arc::new(InMemoryStore::new());
    let mut db = Database::new(store.clone());
    db.create_table_from_raw("users", &users_schema(), None, init_count)
        .await
        .unwrap();
    (store, db)
}

#[tokio::test]
async fn synthesize_then_rehydrate_keeps_records_and_counter() {
    let dir = tempfile::tempdir().unwrap();
    let schema_doc = dir.path().join("users.json");
    std::fs::write(&schema_doc, serde_json::to_string(&users_schema()).unwrap()).unwrap();
    let sources = vec![TableSource {
        name: "users".into(),
        definition: schema_doc.clone(),
    }];

    let data_root = dir.path().join(".amock");
    let store: Arc<dyn TableStore> = Arc::new(JsonFileStore::open(&data_root).unwrap());
    let first = Database::hydrate(store, &sources, 7).await.unwrap();
    assert_eq!(first.origin("users").await.unwrap(), TableOrigin::Synthesized);
    assert_eq!(first.last_auto_id("users").await.unwrap(), 8);
    let records = first.list("users").await.unwrap();
    assert_eq!(records.len(), 7);
    drop(first);

    // The raw document is not consulted again once both files exist.
    std::fs::write(&schema_doc, "not json").unwrap();
    let store: Arc<dyn TableStore> = Arc::new(JsonFileStore::open(&data_root).unwrap());
    let second = Database::hydrate(store, &sources, 7).await.unwrap();
    assert_eq!(second.origin("users").await.unwrap(), TableOrigin::Rehydrated);
    assert_eq!(second.last_auto_id("users").await.unwrap(), 8);
    assert_eq!(second.list("users").await.unwrap(), records);
}

#[tokio::test]
async fn counter_survives_deleting_the_newest_record() {
    let dir = tempfile::tempdir().unwrap();
    let schema_doc = dir.path().join("users.json");
    std::fs::write(&schema_doc, serde_json::to_string(&users_schema()).unwrap()).unwrap();
    let sources = vec![TableSource {
        name: "users".into(),
        definition: schema_doc,
    }];
    let data_root = dir.path().join(".amock");

    let store = Arc::new(JsonFileStore::open(&data_root).unwrap());
    let db = Database::hydrate(store.clone(), &sources, 5).await.unwrap();
    let added = db.insert("users", &obj(json!({"email": "new@example.com"}))).await.unwrap();
    assert_eq!(added["id"], json!(6));
    db.remove("users", &RecordId::from("6")).await.unwrap().unwrap();
    db.remove("users", &RecordId::from("5")).await.unwrap().unwrap();
    assert_eq!(db.last_auto_id("users").await.unwrap(), 7);
    drop(db);

    let db = Database::hydrate(store, &sources, 5).await.unwrap();
    assert_eq!(db.origin("users").await.unwrap(), TableOrigin::Rehydrated);
    assert_eq!(db.last_auto_id("users").await.unwrap(), 7);
    let next = db.insert("users", &obj(json!({"email": "again@example.com"}))).await.unwrap();
    assert_eq!(next["id"], json!(7));
}

#[tokio::test]
async fn stored_records_ahead_of_the_saved_counter_still_win() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let mut db = Database::new(store.clone());
    db.create_table_from_raw("users", &users_schema(), None, 2).await.unwrap();
    drop(db);

    // A hand-edited collection with a higher id than the saved counter.
    let mut rows = store.read("users").await.unwrap();
    rows.push(obj(json!({"id": 30, "email": "edit@example.com"})));
    store.write("users", &rows).await.unwrap();

    let sources = vec![TableSource {
        name: "users".into(),
        definition: PathBuf::from("unused.json"),
    }];
    let db = Database::hydrate(store, &sources, 2).await.unwrap();
    assert_eq!(db.last_auto_id("users").await.unwrap(), 31);
}

#[tokio::test]
async fn explicit_ids_at_the_top_of_the_range() {
    let (store, db) = users_db(1).await;

    for id in [json!(i64::MAX), json!(u64::MAX)] {
        let err = db
            .insert("users", &obj(json!({"id": id, "email": "top@example.com"})))
            .await
            .unwrap_err();
        match err {
            CoreError::Validation { field, reason } => {
                assert_eq!(field, "id");
                assert_eq!(reason, "Sequence ID out of range for field: id");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(db.last_auto_id("users").await.unwrap(), 2);
    }

    // The largest accepted id still leaves one auto id to hand out.
    db.insert("users", &obj(json!({"id": MAX_SEQUENCE - 1, "email": "a@example.com"})))
        .await
        .unwrap();
    assert_eq!(db.last_auto_id("users").await.unwrap(), MAX_SEQUENCE);
    let last = db.insert("users", &obj(json!({"email": "b@example.com"}))).await.unwrap();
    assert_eq!(last["id"], json!(MAX_SEQUENCE));

    let before = store.read("users").await.unwrap();
    let err = db
        .insert("users", &obj(json!({"email": "c@example.com"})))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Generator { field, .. } if field == "id"));
    assert_eq!(store.read("users").await.unwrap(), before);
    assert_eq!(db.last_auto_id("users").await.unwrap(), MAX_SEQUENCE + 1);
}

#[tokio::test]
async fn literal_sequence_start_counts_up_from_it() {
    let store = Arc::new(InMemoryStore::new());
    let mut db = Database::new(store.clone());
    db.create_table_from_raw("orders", &raw(json!({"id": "id:100", "total": "number.float"})), None, 3)
        .await
        .unwrap();
    let ids: Vec<_> = store
        .read("orders")
        .await
        .unwrap()
        .iter()
        .map(|r| r["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!(100), json!(101), json!(102)]);
    assert_eq!(db.last_auto_id("orders").await.unwrap(), 103);
}

#[tokio::test]
async fn missing_schema_file_triggers_regeneration() {
    let dir = tempfile::tempdir().unwrap();
    let schema_doc = dir.path().join("users.json");
    std::fs::write(&schema_doc, serde_json::to_string(&users_schema()).unwrap()).unwrap();
    let sources = vec![TableSource {
        name: "users".into(),
        definition: schema_doc,
    }];
    let data_root = dir.path().join("data-root");

    let store = Arc::new(JsonFileStore::open(&data_root).unwrap());
    Database::hydrate(store.clone(), &sources, 2).await.unwrap();
    std::fs::remove_file(store.schema_path("users")).unwrap();

    let db = Database::hydrate(store.clone(), &sources, 4).await.unwrap();
    assert_eq!(db.origin("users").await.unwrap(), TableOrigin::Synthesized);
    assert_eq!(db.list("users").await.unwrap().len(), 4);
    assert!(store.schema_path("users").is_file());
}

#[tokio::test]
async fn bad_spec_string_is_fatal_at_hydration() {
    let store = Arc::new(InMemoryStore::new());
    let mut db = Database::new(store);
    let err = db
        .create_table_from_raw("t", &raw(json!({"id": "id", "x": "number.huge"})), None, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Generator { .. }));

    let missing = TableSource {
        name: "ghost".into(),
        definition: PathBuf::from("/nonexistent/ghost.json"),
    };
    assert!(matches!(db.load_table(&missing, 1).await, Err(CoreError::Schema(_))));
}

#[tokio::test]
async fn sequential_inserts_get_increasing_ids() {
    let (_store, db) = users_db(3).await;
    let mut ids = Vec::new();
    for i in 0..5 {
        let rec = db
            .insert("users", &obj(json!({"email": format!("u{i}@example.com")})))
            .await
            .unwrap();
        ids.push(rec["id"].as_u64().unwrap());
        assert!(rec.contains_key("name"));
        assert!(rec.contains_key("nickname"));
    }
    assert_eq!(ids, vec![4, 5, 6, 7, 8]);
    assert_eq!(db.last_auto_id("users").await.unwrap(), 9);
}

#[tokio::test]
async fn explicit_ids_are_unique_and_advance_the_counter() {
    let (_store, db) = users_db(2).await;

    let err = db
        .insert("users", &obj(json!({"id": 2, "email": "dup@example.com"})))
        .await
        .unwrap_err();
    match err {
        CoreError::Validation { field, reason } => {
            assert_eq!(field, "id");
            assert_eq!(reason, "Duplicate ID for field: id");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(db.last_auto_id("users").await.unwrap(), 3);

    db.insert("users", &obj(json!({"id": 40, "email": "a@example.com"})))
        .await
        .unwrap();
    assert_eq!(db.last_auto_id("users").await.unwrap(), 41);
    let next = db
        .insert("users", &obj(json!({"email": "b@example.com"})))
        .await
        .unwrap();
    assert_eq!(next["id"], json!(41));
}

#[tokio::test]
async fn required_nullable_and_unknown_fields() {
    let (store, db) = users_db(1).await;
    let before = store.read("users").await.unwrap();

    let err = db.insert("users", &obj(json!({"name": "x"}))).await.unwrap_err();
    assert_eq!(err.to_string(), "Missing required field: email");

    let err = db
        .insert("users", &obj(json!({"email": "e@x.io", "shoe": 9})))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownField(f) if f == "shoe"));

    let err = db
        .insert("users", &obj(json!({"email": "e@x.io", "role": "root"})))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { field, .. } if field == "role"));

    assert_eq!(store.read("users").await.unwrap(), before);

    let rec = db
        .insert("users", &obj(json!({"email": "e@x.io", "nickname": null})))
        .await
        .unwrap();
    assert_eq!(rec["nickname"], Value::Null);
}

#[tokio::test]
async fn failed_batch_leaves_collection_and_counter_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let mut db = Database::new(store.clone());
    db.create_table_from_raw("users", &users_schema(), None, 3)
        .await
        .unwrap();

    let path = store.collection_path("users");
    let bytes_before = std::fs::read(&path).unwrap();
    let counter_before = db.last_auto_id("users").await.unwrap();

    let batch = vec![
        json!({"email": "one@example.com"}),
        json!({"email": "two@example.com", "age": "old"}),
        json!({"email": "three@example.com"}),
    ];
    let err = db.insert_batch("users", &batch).await.unwrap_err();
    assert!(matches!(err, CoreError::BatchItem { index: 1, .. }));
    assert!(matches!(err.root(), CoreError::Validation { field, .. } if field == "age"));

    assert_eq!(std::fs::read(&path).unwrap(), bytes_before);
    assert_eq!(db.last_auto_id("users").await.unwrap(), counter_before);

    let ok = db
        .insert_batch("users", &[json!({"email": "a@b.c"}), json!({"email": "d@e.f"})])
        .await
        .unwrap();
    assert_eq!(ok.len(), 2);
    assert_eq!(ok[0]["id"], json!(4));
    assert_eq!(ok[1]["id"], json!(5));
    assert_eq!(db.list("users").await.unwrap().len(), 5);
}

#[tokio::test]
async fn duplicate_ids_within_one_batch_are_rejected() {
    let (store, db) = users_db(0).await;
    let batch = [json!({"id": 9, "email": "a"}), json!({"id": 9, "email": "b"})];
    let err = db.insert_batch("users", &batch).await.unwrap_err();
    assert!(matches!(err, CoreError::BatchItem { index: 1, .. }));
    assert!(store.read("users").await.unwrap().is_empty());

    let err = db.insert_batch("users", &[json!([1, 2])]).await.unwrap_err();
    assert!(matches!(err.root(), CoreError::MalformedItem(_)));
}

#[tokio::test]
async fn remove_then_get_reports_absent() {
    let (_store, db) = users_db(5).await;
    let before = db.list("users").await.unwrap();

    let removed = db.remove("users", &RecordId::from("3")).await.unwrap();
    assert_eq!(removed.unwrap()["id"], json!(3));
    assert!(db.get("users", &RecordId::from("3")).await.unwrap().is_none());
    assert!(db.remove("users", &RecordId::from("3")).await.unwrap().is_none());

    let after = db.list("users").await.unwrap();
    let expected: Vec<_> = before.into_iter().filter(|r| r["id"] != json!(3)).collect();
    assert_eq!(after, expected);
}

#[tokio::test]
async fn failed_write_is_surfaced_and_changes_nothing() {
    let (store, db) = users_db(2).await;
    store.fail_writes(true);
    let err = db
        .insert("users", &obj(json!({"email": "x@y.z"})))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));
    assert_eq!(db.last_auto_id("users").await.unwrap(), 3);

    store.fail_writes(false);
    assert_eq!(store.read("users").await.unwrap().len(), 2);
    let rec = db.insert("users", &obj(json!({"email": "x@y.z"}))).await.unwrap();
    assert_eq!(rec["id"], json!(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_get_distinct_ids() {
    let (store, db) = users_db(0).await;
    let db = Arc::new(db);
    let mut handles = Vec::new();
    for i in 0..20 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.insert("users", &obj(json!({"email": format!("c{i}@example.com")})))
                .await
                .unwrap()["id"]
                .as_u64()
                .unwrap()
        }));
    }
    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
    assert_eq!(store.read("users").await.unwrap().len(), 20);
}

#[tokio::test]
async fn unknown_table_and_non_object_body() {
    let (_store, db) = users_db(1).await;
    assert!(matches!(db.list("nope").await, Err(CoreError::UnknownTable(_))));
    assert!(matches!(
        db.insert_value("users", &json!("text")).await,
        Err(CoreError::MalformedItem(_))
    ));
    let inserted = db
        .insert_value("users", &json!([{"email": "q@r.s"}]))
        .await
        .unwrap();
    assert_eq!(inserted.as_array().unwrap().len(), 1);
}
