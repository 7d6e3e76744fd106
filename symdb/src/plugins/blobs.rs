// FICHIER : symdb/src/plugins/blobs.rs

//! Extraction des charges binaires hors du JSON.
//!
//! Un binaire est représenté dans un document par `{"$blob": "<base64>"}`.
//! À l'écriture il part dans `blob/<id>/<clé>` et le champ vaut `null`
//! dans le store ; il est rattaché en mémoire après l'écriture et à chaque
//! lecture. Seuls les objets imbriqués sont parcourus (pas les tableaux).

use super::Plugin;
use crate::json_db::collections::{HookEvent, HookPoint, Model, Operation};
use crate::json_db::indexes::codec::unescape;
use crate::json_db::indexes::manager::document_id;
use crate::json_db::indexes::PathKind;
use crate::json_db::Document;
use crate::utils::data::{set_path, Map};
use crate::utils::prelude::*;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Clé du marqueur binaire.
pub const BLOB_KEY: &str = "$blob";

/// Clé du contexte d'opération où `save:before` dépose les marqueurs extraits.
const CONTEXT_KEY: &str = "blobs";

/// Marqueur JSON d'un contenu binaire.
pub fn blob_marker(bytes: &[u8]) -> Value {
    json!({ BLOB_KEY: BASE64.encode(bytes) })
}

/// Octets portés par un marqueur, `None` si la valeur n'en est pas un.
pub fn blob_bytes(value: &Value) -> Option<Vec<u8>> {
    let encoded = as_marker(value)?;
    BASE64.decode(encoded).ok()
}

fn as_marker(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get(BLOB_KEY)?.as_str(),
        _ => None,
    }
}

/// Marqueurs trouvés dans le document, indexés par clé pointée.
fn collect_markers(obj: &Document, prefix: &str, found: &mut Vec<(String, Value)>) {
    for (key, value) in obj {
        let deep_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        if as_marker(value).is_some() {
            found.push((deep_key, value.clone()));
        } else if let Value::Object(child) = value {
            collect_markers(child, &deep_key, found);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlobPlugin;

impl Plugin for BlobPlugin {
    fn name(&self) -> &str {
        "blobs"
    }

    fn attach(&self, model: &Model) {
        model.on(HookPoint::before(Operation::Save), extract_blobs);
        model.on(HookPoint::after(Operation::Save), reattach_blobs);
        model.on(HookPoint::after(Operation::Get), load_blobs);
        model.on(HookPoint::after(Operation::Delete), remove_blobs);
    }
}

// --- HOOKS ---

fn extract_blobs(event: &mut HookEvent<'_>) -> Result<()> {
    let model = event.model;
    let Some(doc) = event.document() else {
        return Ok(());
    };

    let mut found = Vec::new();
    collect_markers(doc, "", &mut found);
    if found.is_empty() {
        return Ok(());
    }

    let id = document_id(doc)?;
    for (key, marker) in &found {
        let bytes = blob_bytes(marker).ok_or_else(|| {
            AppError::Precondition(format!("Blob '{}' : base64 invalide", key))
        })?;
        let path = model.paths().resolve(PathKind::BlobKey { id: &id, key });
        model.storage().write_blob(&path, &bytes)?;
        set_path(doc, key, Value::Null);
    }

    debug!(model = %model.name(), id = %id, blobs = found.len(), "Blobs extraits");
    let stash: Map<String, Value> = found.into_iter().collect();
    event.context.insert(CONTEXT_KEY, Value::Object(stash));
    Ok(())
}

fn reattach_blobs(event: &mut HookEvent<'_>) -> Result<()> {
    let Some(Value::Object(stash)) = event.context.remove(CONTEXT_KEY) else {
        return Ok(());
    };
    if let Some(doc) = event.document() {
        for (key, marker) in stash {
            set_path(doc, &key, marker);
        }
    }
    Ok(())
}

fn load_blobs(event: &mut HookEvent<'_>) -> Result<()> {
    let model = event.model;
    let Some(results) = event.results() else {
        return Ok(());
    };

    for doc in results.iter_mut() {
        let Ok(id) = document_id(doc) else {
            continue;
        };
        let dir = model.paths().resolve(PathKind::BlobDir { id: &id });
        let entries = match model.storage().list_directory(&dir) {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        };
        for entry in entries {
            let bytes = model.storage().read_blob(&dir.join(&entry))?;
            set_path(doc, &unescape(&entry), blob_marker(&bytes));
        }
    }
    Ok(())
}

fn remove_blobs(event: &mut HookEvent<'_>) -> Result<()> {
    let model = event.model;
    let Some(doc) = event.document() else {
        return Ok(());
    };
    let id = document_id(doc)?;
    let dir = model.paths().resolve(PathKind::BlobDir { id: &id });

    let entries = match model.storage().list_directory(&dir) {
        Ok(entries) => entries,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in &entries {
        match model.storage().delete_file(&dir.join(entry)) {
            Err(e) if e.is_not_found() => {}
            other => other?,
        }
    }
    match model.storage().remove_dir(&dir) {
        Err(e) if e.is_not_found() => {}
        other => other?,
    }

    debug!(model = %model.name(), id = %id, blobs = entries.len(), "Blobs supprimés");
    Ok(())
}
