// FICHIER : symdb/src/json_db/query/index_search.rs

use super::comparison::{loose_eq, Comparison};
use super::scan_search::matches;
use super::{Criterion, Lookup};
use crate::json_db::indexes::codec::readings;
use crate::json_db::indexes::paths::{id_from_link_entry, PathKind};
use crate::json_db::{Document, Scope};
use crate::utils::data::{HashSet, Value};
use crate::utils::prelude::*;
use std::path::{Path, PathBuf};

/// Condition portée par un nom de dossier de valeur.
enum SegmentTest<'l> {
    Equals(&'l Value),
    Satisfies(&'l Comparison),
}

impl SegmentTest<'_> {
    fn accepts(&self, segment: &str) -> bool {
        readings(segment).iter().any(|v| match self {
            SegmentTest::Equals(expected) => loose_eq(v, expected),
            SegmentTest::Satisfies(predicate) => predicate.compare(Some(v)),
        })
    }
}

/// Groupe de dossiers dont on fait l'union. Les groupes se croisent entre eux.
enum Probe<'l> {
    /// Dossier connu sans listage.
    Dir(PathBuf),
    /// Dossiers de valeur du champ retenus par le test.
    Listing { field: &'l str, test: SegmentTest<'l> },
}

/// Liste un dossier d'index ; absent = vide.
fn list_or_empty(scope: &Scope<'_>, dir: &Path) -> Result<Vec<String>> {
    match scope.storage.list_directory(dir) {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

fn literal_probe<'l>(scope: &Scope<'_>, field: &'l str, value: &'l Value) -> Probe<'l> {
    let exact_name = match value {
        Value::Bool(_) | Value::Null => true,
        Value::String(s) => s.trim().is_empty() || s.trim().parse::<f64>().is_err(),
        // Nombres et chaînes numériques : 21, "21" et "21.0" sont égaux
        _ => false,
    };
    if !exact_name {
        return Probe::Listing {
            field,
            test: SegmentTest::Equals(value),
        };
    }
    let field_type = scope.schema.field_type(field).unwrap_or_default();
    let segment = field_type.encode(value);
    Probe::Dir(scope.paths.resolve(PathKind::IndexValueDir {
        field,
        value: &segment,
    }))
}

fn probes<'l>(scope: &Scope<'_>, lookup: &'l Lookup) -> Vec<Probe<'l>> {
    let mut out = Vec::new();
    for (field, criterion) in lookup.iter() {
        match criterion {
            // Chaque élément doit avoir son lien
            Criterion::Literal(Value::Array(items)) => {
                out.extend(items.iter().map(|item| literal_probe(scope, field, item)))
            }
            Criterion::Literal(value) => out.push(literal_probe(scope, field, value)),
            Criterion::Predicate(predicate) => out.push(Probe::Listing {
                field,
                test: SegmentTest::Satisfies(predicate),
            }),
        }
    }
    out
}

/// Dossiers de valeur retenus pour chaque groupe.
fn candidate_dirs(scope: &Scope<'_>, lookup: &Lookup) -> Result<Vec<Vec<PathBuf>>> {
    let probes = probes(scope, lookup);
    scope.io.try_map(&probes, |probe| match probe {
        Probe::Dir(dir) => Ok(vec![dir.clone()]),
        Probe::Listing { field, test } => {
            let field_dir = scope.paths.resolve(PathKind::IndexFieldDir { field });
            Ok(list_or_empty(scope, &field_dir)?
                .into_iter()
                .filter(|name| test.accepts(name))
                .map(|name| field_dir.join(name))
                .collect())
        }
    })
}

/// Recherche par intersection des dossiers d'index.
/// Tous les champs de `lookup` doivent être indexés. Les documents candidats
/// repassent par le filtre du parcours : l'index ne fait que restreindre.
#[instrument(level = "debug", skip(scope, lookup), fields(collection = ?scope.paths.root()))]
pub fn search(scope: &Scope<'_>, lookup: &Lookup) -> Result<Vec<Document>> {
    let per_group = candidate_dirs(scope, lookup)?;
    if per_group.is_empty() || per_group.iter().any(|dirs| dirs.is_empty()) {
        return Ok(Vec::new());
    }

    // Un seul lot de listages pour tous les groupes
    let flat: Vec<(usize, PathBuf)> = per_group
        .iter()
        .enumerate()
        .flat_map(|(i, dirs)| dirs.iter().map(move |d| (i, d.clone())))
        .collect();
    let listings = scope
        .io
        .try_map(&flat, |(i, dir)| Ok((*i, list_or_empty(scope, dir)?)))?;

    // Union par groupe, intersection entre groupes
    let mut unions: Vec<HashSet<String>> = vec![HashSet::new(); per_group.len()];
    let mut first_order: Vec<String> = Vec::new();
    for (i, entries) in listings {
        for entry in entries {
            let id = id_from_link_entry(&entry);
            if i == 0 && !unions[0].contains(&id) {
                first_order.push(id.clone());
            }
            unions[i].insert(id);
        }
    }

    let ids: Vec<String> = first_order
        .into_iter()
        .filter(|id| unions[1..].iter().all(|set| set.contains(id)))
        .collect();

    debug!(candidates = ids.len(), "Intersection des index");
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let docs = scope.io.try_map(&ids, |id| {
        let doc = scope.load_document(&scope.paths.resolve(PathKind::Store { id }))?;
        Ok(doc.filter(|d| matches(d, lookup)))
    })?;
    Ok(docs.into_iter().flatten().collect())
}
