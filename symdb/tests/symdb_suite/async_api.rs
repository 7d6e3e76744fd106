// FICHIER : symdb/tests/symdb_suite/async_api.rs

use crate::{doc, entries, id_of, ids, init_test_env, init_test_env_with, names};
use symdb::plugins::blobs::{blob_bytes, blob_marker};
use symdb::utils::prelude::*;
use symdb::{gte, lt, AppError, FieldType, HookPoint, Lookup, Operation, Schema, SortSpec};

#[tokio::test]
async fn test_async_roundtrip_update_delete() {
    let env = init_test_env();
    let users = env.users();

    let mut saved = users
        .add(doc(json!({ "name": "Dan", "age": 21 })))
        .await
        .unwrap();
    let id = id_of(&saved);
    assert_eq!(
        users.get(Lookup::new().eq("_id", id.as_str())).await.unwrap(),
        vec![saved.clone()]
    );

    saved.insert("age".into(), json!(39));
    users.update(saved.clone()).await.unwrap();
    assert!(users.get(Lookup::new().eq("age", 21)).await.unwrap().is_empty());
    assert_eq!(
        users.get(Lookup::new().with("age", gte(25))).await.unwrap().len(),
        1
    );

    users.del(saved).await.unwrap();
    let root = env.root().join("users");
    assert!(entries(&root.join("store")).is_empty());
    assert!(entries(&root.join("index-links")).is_empty());
}

#[tokio::test]
async fn test_async_and_sync_agree() {
    let env = init_test_env();
    let users = env.users();
    for (name, age) in [("Ann", 10), ("Bob", 20), ("Cid", 30)] {
        users
            .save(doc(json!({ "name": name, "age": age })))
            .await
            .unwrap();
    }

    for lookup in [
        Lookup::new(),
        Lookup::new().eq("name", "Bob"),
        Lookup::new().with("age", lt(25)),
        Lookup::new().eq("name", "Cid").eq("unindexed", 1),
    ] {
        let a = ids(&users.get(lookup.clone()).await.unwrap());
        let b = ids(&users.get_sync(lookup).unwrap());
        assert_eq!(a, b);
    }
}

#[tokio::test]
async fn test_concurrent_adds() {
    let env = init_test_env();
    let users = env.users();

    let mut handles = Vec::new();
    for i in 0..20 {
        let users = users.clone();
        handles.push(tokio::spawn(async move {
            users
                .add(doc(json!({ "name": format!("user-{:02}", i), "age": i })))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(users.get(Lookup::new()).await.unwrap().len(), 20);
    assert_eq!(
        users.get(Lookup::new().with("age", gte(15))).await.unwrap().len(),
        5
    );
}

#[tokio::test]
async fn test_async_sort_page_and_reindex() {
    let env = init_test_env();
    let users = env.users();
    for (name, age, team) in [("Ann", 10, "red"), ("Bob", 20, "blue"), ("Cid", 30, "red")] {
        users
            .add(doc(json!({ "name": name, "age": age, "team": team })))
            .await
            .unwrap();
    }

    let page = users
        .sort(SortSpec::new().desc("age"))
        .page(1, 2)
        .get(Lookup::new())
        .await
        .unwrap();
    let order: Vec<&str> = page.iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(order, vec!["Cid", "Bob"]);

    users.add_field("team", FieldType::String);
    assert_eq!(users.reindex(Lookup::new()).await.unwrap(), 3);
    assert_eq!(
        names(&users.get(Lookup::new().eq("team", "red")).await.unwrap()),
        vec!["Ann", "Cid"]
    );
}

#[tokio::test]
async fn test_async_hook_abort() {
    let env = init_test_env();
    let users = env.users();
    users.on(HookPoint::before(Operation::Add), |event| {
        let named = event
            .document()
            .is_some_and(|d| matches!(d.get("name"), Some(Value::String(n)) if !n.is_empty()));
        if named {
            Ok(())
        } else {
            Err(AppError::Precondition("nom obligatoire".into()))
        }
    });

    let err = users.add(doc(json!({ "age": 3 }))).await.unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)), "{:?}", err);
    assert!(entries(&env.root().join("users").join("store")).is_empty());

    users.add(doc(json!({ "name": "Dan" }))).await.unwrap();
}

#[tokio::test]
async fn test_async_blobs() {
    let env = init_test_env_with(|cfg| cfg.with_blobs(true).with_concurrency(2));
    let files = env.db.model("files", Schema::new().field("kind", FieldType::String));

    let saved = files
        .add(doc(json!({ "kind": "img", "data": blob_marker(b"raw") })))
        .await
        .unwrap();
    assert_eq!(blob_bytes(&saved["data"]), Some(b"raw".to_vec()));

    let found = files.get(Lookup::new().eq("kind", "img")).await.unwrap();
    assert_eq!(blob_bytes(&found[0]["data"]), Some(b"raw".to_vec()));

    files.del(saved).await.unwrap();
    assert!(entries(&env.root().join("files").join("blob")).is_empty());
}
