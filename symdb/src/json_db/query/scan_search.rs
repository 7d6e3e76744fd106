// FICHIER : symdb/src/json_db/query/scan_search.rs

use super::comparison::{loose_eq, Comparison};
use super::{Criterion, Lookup};
use crate::json_db::indexes::paths::{id_from_store_entry, PathKind};
use crate::json_db::{Document, Scope};
use crate::utils::data::{get_path, Value};
use crate::utils::prelude::*;

fn literal_matches(candidate: Option<&Value>, expected: &Value) -> bool {
    match candidate {
        None => false,
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| loose_eq(item, expected))
        }
        Some(v) => loose_eq(v, expected),
    }
}

fn predicate_matches(candidate: Option<&Value>, predicate: &Comparison) -> bool {
    match candidate {
        // Un tableau passe si l'un de ses éléments passe, comme dans l'index.
        // Seule une fonction libre voit aussi le tableau entier.
        Some(Value::Array(items)) => {
            (matches!(predicate, Comparison::Compare(_)) && predicate.compare(candidate))
                || items.iter().any(|item| predicate.compare(Some(item)))
        }
        _ => predicate.compare(candidate),
    }
}

/// Vrai si chaque critère passe ; arrêt au premier échec.
pub fn matches(doc: &Document, lookup: &Lookup) -> bool {
    lookup.iter().all(|(field, criterion)| {
        let candidate = get_path(doc, field);
        match criterion {
            Criterion::Literal(expected) => literal_matches(candidate, expected),
            Criterion::Predicate(predicate) => predicate_matches(candidate, predicate),
        }
    })
}

/// Parcours complet du store avec filtrage en mémoire.
#[instrument(level = "debug", skip(scope, lookup), fields(collection = ?scope.paths.root()))]
pub fn search(scope: &Scope<'_>, lookup: &Lookup) -> Result<Vec<Document>> {
    let store_dir = scope.paths.resolve(PathKind::StoreDir);
    let entries: Vec<String> = match scope.storage.list_directory(&store_dir) {
        Ok(names) => names
            .into_iter()
            .filter(|n| id_from_store_entry(n).is_some())
            .collect(),
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let loaded = scope.io.try_map(&entries, |entry| {
        let doc = scope.load_document(&store_dir.join(entry))?;
        Ok(doc.filter(|d| lookup.is_empty() || matches(d, lookup)))
    })?;

    let docs: Vec<Document> = loaded.into_iter().flatten().collect();
    debug!(scanned = entries.len(), matched = docs.len(), "Scan terminé");
    Ok(docs)
}
