// FICHIER : symdb/tests/symdb_suite/plugins.rs

use crate::{doc, entries, id_of, init_test_env, init_test_env_with, names};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use symdb::plugins::blobs::{blob_bytes, blob_marker};
use symdb::utils::prelude::*;
use symdb::{AppError, HookPoint, Lookup, Model, Operation, Patcher, Plugin, Schema};

// --- PATCHER ---

#[test]
fn test_patcher_completes_partial_update() {
    let env = init_test_env();
    let users = env.users();
    users.register_hook(
        HookPoint::before(Operation::Update),
        Arc::new(Patcher::new([("_id", "_id")])),
    );

    let saved = users
        .add_sync(doc(json!({ "name": "Dan", "age": 21, "city": "Lyon" })))
        .unwrap();
    let id = id_of(&saved);

    let updated = users
        .update_sync(doc(json!({ "_id": id, "age": 50 })))
        .unwrap();
    assert_eq!(updated["name"], "Dan");
    assert_eq!(updated["city"], "Lyon");
    assert_eq!(updated["age"], 50);

    let found = users.get_sync(Lookup::new().eq("name", "Dan")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["age"], 50);
    assert!(users.get_sync(Lookup::new().eq("age", 21)).unwrap().is_empty());
}

#[test]
fn test_patcher_without_match_aborts() {
    let env = init_test_env();
    let users = env.users();
    users.register_hook(
        HookPoint::before(Operation::Update),
        Arc::new(Patcher::new([("_id", "_id")])),
    );

    let err = users
        .update_sync(doc(json!({ "_id": "ghost", "age": 1 })))
        .unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)), "{:?}", err);
    assert!(entries(&env.root().join("users").join("store")).is_empty());
}

#[test]
fn test_patcher_before_delete_requires_single_match() {
    let env = init_test_env();
    let users = env.users();
    users.register_hook(
        HookPoint::before(Operation::Delete),
        Arc::new(Patcher::new([("name", "name")])),
    );

    users.add_sync(doc(json!({ "name": "Dan", "age": 21 }))).unwrap();
    users.add_sync(doc(json!({ "name": "Dan", "age": 40 }))).unwrap();
    users.add_sync(doc(json!({ "name": "Ann", "age": 10 }))).unwrap();

    let err = users.del_sync(doc(json!({ "name": "Dan" }))).unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)), "{:?}", err);
    assert_eq!(users.get_sync(Lookup::new()).unwrap().len(), 3);

    // Le patcher fournit l'_id manquant
    let deleted = users.del_sync(doc(json!({ "name": "Ann" }))).unwrap();
    assert_eq!(deleted["age"], 10);
    assert_eq!(names(&users.get_sync(Lookup::new()).unwrap()), vec!["Dan", "Dan"]);
}

// --- BLOBS ---

#[test]
fn test_blobs_are_extracted_and_reloaded() {
    let env = init_test_env_with(|cfg| cfg.with_blobs(true));
    let files = env.db.model("files", Schema::new());

    let saved = files
        .add_sync(doc(json!({
            "name": "photo",
            "avatar": blob_marker(b"\x89PNG"),
            "meta": { "thumb": blob_marker(&[1, 2, 3]), "w": 10 }
        })))
        .unwrap();
    let id = id_of(&saved);

    // Le document rendu garde ses marqueurs
    assert_eq!(blob_bytes(&saved["avatar"]), Some(b"\x89PNG".to_vec()));
    assert_eq!(blob_bytes(&saved["meta"]["thumb"]), Some(vec![1, 2, 3]));

    // Le store ne contient que des null
    let root = env.root().join("files");
    let stored: Value = serde_json::from_str(
        &std::fs::read_to_string(root.join("store").join(format!("{}.json", id))).unwrap(),
    )
    .unwrap();
    assert_eq!(stored["avatar"], Value::Null);
    assert_eq!(stored["meta"]["thumb"], Value::Null);
    assert_eq!(stored["meta"]["w"], 10);

    let blob_dir = root.join("blob").join(&id);
    assert_eq!(entries(&blob_dir), vec!["avatar", "meta.thumb"]);
    assert_eq!(std::fs::read(blob_dir.join("avatar")).unwrap(), b"\x89PNG");

    let found = files.get_sync(Lookup::new().eq("name", "photo")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(blob_bytes(&found[0]["avatar"]), Some(b"\x89PNG".to_vec()));
    assert_eq!(blob_bytes(&found[0]["meta"]["thumb"]), Some(vec![1, 2, 3]));

    files.del_sync(found.into_iter().next().unwrap()).unwrap();
    assert!(!blob_dir.exists());
    assert!(entries(&root.join("store")).is_empty());
}

#[test]
fn test_documents_without_blobs_are_untouched() {
    let env = init_test_env_with(|cfg| cfg.with_blobs(true));
    let notes = env.db.model("notes", Schema::new());

    let saved = notes.add_sync(doc(json!({ "text": "hello" }))).unwrap();
    assert_eq!(notes.get_sync(Lookup::new()).unwrap(), vec![saved.clone()]);
    assert!(entries(&env.root().join("notes").join("blob")).is_empty());

    notes.del_sync(saved).unwrap();
}

#[test]
fn test_invalid_blob_payload_aborts_save() {
    let env = init_test_env_with(|cfg| cfg.with_blobs(true));
    let files = env.db.model("files", Schema::new());

    let err = files
        .add_sync(doc(json!({ "data": { "$blob": "%%%" } })))
        .unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)), "{:?}", err);
    assert!(entries(&env.root().join("files").join("store")).is_empty());
}

// --- PLUGINS ---

struct CountingPlugin {
    saves: Arc<AtomicUsize>,
}

impl Plugin for CountingPlugin {
    fn name(&self) -> &str {
        "counting"
    }

    fn attach(&self, model: &Model) {
        let saves = self.saves.clone();
        model.on(HookPoint::after(Operation::Save), move |_| {
            saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }
}

#[test]
fn test_plugin_attaches_to_existing_and_future_models() {
    let env = init_test_env();
    let early = env.db.model("early", Schema::new());

    let saves = Arc::new(AtomicUsize::new(0));
    env.db.register_plugin(Arc::new(CountingPlugin {
        saves: saves.clone(),
    }));
    let late = env.db.model("late", Schema::new());

    early.add_sync(doc(json!({ "n": 1 }))).unwrap();
    late.add_sync(doc(json!({ "n": 2 }))).unwrap();
    late.save_sync(doc(json!({ "n": 3 }))).unwrap();

    assert_eq!(saves.load(Ordering::SeqCst), 3);
    assert_eq!(env.db.model_names(), vec!["early", "late"]);
}
