// FICHIER : symdb/tests/symdb_suite/lifecycle.rs

use crate::{doc, entries, id_of, init_test_env};
use std::sync::{Arc, Mutex};
use symdb::utils::prelude::*;
use symdb::{gte, AppError, Criterion, HookPoint, Lookup, Operation};

#[test]
fn test_add_then_get_by_id_roundtrip() {
    let env = init_test_env();
    let users = env.users();

    let saved = users
        .add_sync(doc(json!({ "name": "Dan", "age": 21, "tags": ["x"] })))
        .unwrap();
    let id = id_of(&saved);

    let found = users.get_sync(Lookup::new().eq("_id", id.as_str())).unwrap();
    assert_eq!(found, vec![saved]);
}

#[test]
fn test_save_writes_store_links_and_manifest() {
    let env = init_test_env();
    let users = env.users();

    let saved = users
        .add_sync(doc(json!({ "name": "Dan", "age": 21 })))
        .unwrap();
    let id = id_of(&saved);
    let root = env.root().join("users");

    assert!(root.join("store").join(format!("{}.json", id)).is_file());

    let link = root.join("index").join("name").join("Dan").join(&id);
    let meta = std::fs::symlink_metadata(&link).unwrap();
    assert!(meta.file_type().is_symlink());
    // Le lien se résout vers le document
    let content: Value =
        serde_json::from_str(&std::fs::read_to_string(&link).unwrap()).unwrap();
    assert_eq!(content["name"], "Dan");

    assert_eq!(entries(&root.join("index").join("age").join("21")), vec![id.clone()]);
    assert_eq!(entries(&root.join("index").join("_id").join(&id)), vec![id.clone()]);

    let manifest: Vec<String> = serde_json::from_str(
        &std::fs::read_to_string(root.join("index-links").join(format!("{}.json", id))).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest.len(), 3);
    assert!(manifest.iter().all(|entry| entry.starts_with("index")));
}

#[test]
fn test_save_keeps_caller_id() {
    let env = init_test_env();
    let users = env.users();

    let saved = users
        .save_sync(doc(json!({ "_id": "fixed", "name": "Eve" })))
        .unwrap();
    assert_eq!(id_of(&saved), "fixed");
    assert_eq!(users.get_sync(Lookup::new().eq("name", "Eve")).unwrap().len(), 1);
}

#[test]
fn test_delete_removes_all_artifacts() {
    let env = init_test_env();
    let users = env.users();

    let saved = users
        .add_sync(doc(json!({ "name": "Dan", "age": 21 })))
        .unwrap();
    let id = id_of(&saved);
    users.del_sync(saved).unwrap();

    let root = env.root().join("users");
    assert!(entries(&root.join("store")).is_empty());
    assert!(entries(&root.join("index-links")).is_empty());
    assert!(entries(&root.join("index").join("name").join("Dan")).is_empty());
    assert!(entries(&root.join("index").join("age").join("21")).is_empty());
    assert!(entries(&root.join("index").join("_id").join(&id)).is_empty());

    assert!(users.get_sync(Lookup::new().eq("name", "Dan")).unwrap().is_empty());
    assert!(users.get_sync(Lookup::new()).unwrap().is_empty());
}

#[test]
fn test_delete_missing_document_fails() {
    let env = init_test_env();
    let users = env.users();

    let err = users
        .del_sync(doc(json!({ "_id": "ghost", "name": "Nobody" })))
        .unwrap_err();
    assert!(err.is_not_found(), "{:?}", err);
}

#[test]
fn test_update_rebuilds_indexes() {
    let env = init_test_env();
    let users = env.users();

    let mut saved = users
        .add_sync(doc(json!({ "name": "Dan", "age": 21 })))
        .unwrap();
    saved.insert("age".into(), json!(39));
    let updated = users.update_sync(saved).unwrap();

    let adults = users.get_sync(Lookup::new().with("age", gte(25))).unwrap();
    assert_eq!(adults, vec![updated.clone()]);
    assert!(users.get_sync(Lookup::new().eq("age", 21)).unwrap().is_empty());
    assert_eq!(users.get_sync(Lookup::new().eq("age", 39)).unwrap().len(), 1);

    let root = env.root().join("users");
    assert!(entries(&root.join("index").join("age").join("21")).is_empty());
    assert_eq!(entries(&root.join("store")).len(), 1);
}

#[test]
fn test_update_requires_id() {
    let env = init_test_env();
    let users = env.users();

    let err = users.update_sync(doc(json!({ "name": "Dan" }))).unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)), "{:?}", err);
}

#[test]
fn test_hook_abort_leaves_no_store_file() {
    let env = init_test_env();
    let users = env.users();
    users.on(HookPoint::before(Operation::Save), |event| {
        let doc = event.document().expect("document attendu");
        if doc.get("age").and_then(Value::as_i64).unwrap_or(0) < 18 {
            return Err(AppError::Precondition("mineur refusé".into()));
        }
        Ok(())
    });

    let err = users
        .add_sync(doc(json!({ "name": "Kid", "age": 12 })))
        .unwrap_err();
    assert_eq!(err.to_string(), AppError::Precondition("mineur refusé".into()).to_string());

    let root = env.root().join("users");
    assert!(entries(&root.join("store")).is_empty());
    assert!(entries(&root.join("index")).is_empty());

    users.add_sync(doc(json!({ "name": "Dan", "age": 21 }))).unwrap();
    assert_eq!(entries(&root.join("store")).len(), 1);
}

#[test]
fn test_hook_order_for_add() {
    let env = init_test_env();
    let users = env.users();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for op in [Operation::Add, Operation::Save] {
        for point in [HookPoint::before(op), HookPoint::after(op)] {
            let seen = seen.clone();
            users.on(point, move |event| {
                seen.lock().unwrap().push(event.point.to_string());
                Ok(())
            });
        }
    }

    users.add_sync(doc(json!({ "name": "Dan" }))).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["add:before", "save:before", "save:after", "add:after"]
    );
}

#[test]
fn test_update_emits_no_delete_hooks() {
    let env = init_test_env();
    let users = env.users();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for op in [Operation::Update, Operation::Save, Operation::Delete] {
        for point in [HookPoint::before(op), HookPoint::after(op)] {
            let seen = seen.clone();
            users.on(point, move |event| {
                seen.lock().unwrap().push(event.point.to_string());
                Ok(())
            });
        }
    }

    let saved = users.save_sync(doc(json!({ "name": "Dan" }))).unwrap();
    seen.lock().unwrap().clear();
    users.update_sync(saved).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["update:before", "save:before", "save:after", "update:after"]
    );
}

#[test]
fn test_context_is_shared_by_nested_save() {
    let env = init_test_env();
    let users = env.users();
    let observed = Arc::new(Mutex::new(None));

    users.on(HookPoint::before(Operation::Add), |event| {
        event.context.insert("origin", json!("add"));
        Ok(())
    });
    {
        let observed = observed.clone();
        users.on(HookPoint::after(Operation::Save), move |event| {
            *observed.lock().unwrap() = event.context.get("origin").cloned();
            Ok(())
        });
    }

    users.add_sync(doc(json!({ "name": "Dan" }))).unwrap();
    assert_eq!(*observed.lock().unwrap(), Some(json!("add")));

    // Nouveau contexte pour chaque opération publique
    users.save_sync(doc(json!({ "name": "Eve" }))).unwrap();
    assert_eq!(*observed.lock().unwrap(), None);
}

#[test]
fn test_get_hooks_can_rewrite_lookup_and_results() {
    let env = init_test_env();
    let users = env.users();
    crate::seed_users(&users);

    users.on(HookPoint::before(Operation::Get), |event| {
        if let Some(lookup) = event.lookup() {
            if lookup.is_empty() {
                lookup.insert("name", Criterion::Literal(json!("Bob")));
            }
        }
        Ok(())
    });
    users.on(HookPoint::after(Operation::Get), |event| {
        if let Some(results) = event.results() {
            for doc in results.iter_mut() {
                doc.insert("seen".into(), json!(true));
            }
        }
        Ok(())
    });

    let found = users.get_sync(Lookup::new()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Bob");
    assert_eq!(found[0]["seen"], true);
}
