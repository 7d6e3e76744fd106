// FICHIER : symdb/src/json_db/indexes/manager.rs

use super::paths::PathKind;
use super::ID_FIELD;
use crate::json_db::{Document, Scope};
use crate::utils::data::{get_path, HashSet, Value};
use crate::utils::prelude::*;

/// Identifiant d'un document, obligatoire pour toute écriture.
pub fn document_id(doc: &Document) -> Result<String> {
    match doc.get(ID_FIELD) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(AppError::Precondition(format!(
            "Le document n'a pas de champ '{}' exploitable",
            ID_FIELD
        ))),
    }
}

/// Liens (champ, segment) qu'un document doit posséder sous le schéma courant.
fn planned_links(scope: &Scope<'_>, doc: &Document) -> Vec<(String, String)> {
    let mut links = Vec::new();
    for (field, field_type) in scope.schema.indexed_fields() {
        match get_path(doc, field) {
            None => continue,
            Some(Value::Array(items)) => {
                let mut seen = HashSet::new();
                for item in items {
                    let segment = field_type.encode(item);
                    if seen.insert(segment.clone()) {
                        links.push((field.to_string(), segment));
                    }
                }
            }
            Some(value) => links.push((field.to_string(), field_type.encode(value))),
        }
    }
    links
}

/// Crée les liens d'index du document puis écrit son manifeste.
/// Un lien déjà présent est accepté (réindexation idempotente).
#[instrument(level = "debug", skip(scope, doc), fields(collection = ?scope.paths.root()))]
pub fn index(scope: &Scope<'_>, doc: &Document) -> Result<Vec<String>> {
    let id = document_id(doc)?;
    let links = planned_links(scope, doc);
    let target = scope.paths.resolve(PathKind::LinkTarget { id: &id });

    scope.io.try_map(&links, |(field, value)| {
        let link = scope.paths.resolve(PathKind::Link { field, value, id: &id });
        match scope.storage.create_link(&target, &link) {
            Err(e) if e.is_already_exists() => {
                debug!(link = ?link, "Lien déjà présent, conservé");
                Ok(())
            }
            other => other,
        }
    })?;

    // Le manifeste n'est écrit qu'une fois tous les liens en place
    let manifest: Vec<String> = links
        .iter()
        .map(|(field, value)| {
            scope
                .paths
                .relative(PathKind::Link { field, value, id: &id })
                .to_string_lossy()
                .into_owned()
        })
        .collect();

    let manifest_path = scope.paths.resolve(PathKind::IndexLinks { id: &id });
    scope
        .storage
        .write_document(&manifest_path, &crate::utils::json::to_value(&manifest)?)?;

    debug!(id = %id, links = manifest.len(), "Document indexé");
    Ok(manifest)
}

/// Supprime les liens listés dans le manifeste puis le manifeste lui-même.
/// Manifeste absent = rien à supprimer ; lien déjà absent = toléré.
#[instrument(level = "debug", skip(scope), fields(collection = ?scope.paths.root()))]
pub fn del_indexes(scope: &Scope<'_>, id: &str) -> Result<()> {
    let manifest_path = scope.paths.resolve(PathKind::IndexLinks { id });

    let raw = match scope.storage.read_document(&manifest_path) {
        Ok(v) => v,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => return Err(e),
    };
    let entries: Vec<String> =
        serde_json::from_value(raw).map_err(|e| AppError::malformed(&manifest_path, e))?;

    scope.io.try_map(&entries, |entry| {
        let link = scope.paths.from_manifest(entry);
        match scope.storage.delete_file(&link) {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    })?;

    match scope.storage.delete_file(&manifest_path) {
        Err(e) if e.is_not_found() => {}
        other => other?,
    }

    debug!(id = %id, links = entries.len(), "Index supprimés");
    Ok(())
}
