// FICHIER : symdb/src/json_db/collections/patcher.rs

use super::hooks::{Hook, HookEvent, OperationContext};
use super::model::QueryOptions;
use crate::json_db::query::{Criterion, Lookup};
use crate::utils::data::merge;
use crate::utils::prelude::*;

/// Handler `update:before` / `delete:before` qui complète le document en vol
/// avec la version stockée.
///
/// `map` associe un champ du document entrant au champ de recherche.
/// La recherche doit trouver exactement un document ; ses champs sont
/// fusionnés sous le document entrant (les champs entrants gagnent).
#[derive(Debug, Clone)]
pub struct Patcher {
    map: Vec<(String, String)>,
}

impl Patcher {
    pub fn new<I, K, V>(map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            map: map.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Hook for Patcher {
    fn handle(&self, event: &mut HookEvent<'_>) -> Result<()> {
        let model = event.model;
        let io = event.io;
        let Some(doc) = event.document() else {
            return Ok(());
        };

        let mut lookup = Lookup::new();
        for (incoming, field) in &self.map {
            if let Some(value) = doc.get(incoming) {
                lookup.insert(field.clone(), Criterion::Literal(value.clone()));
            }
        }

        let found = model.run_get(
            lookup,
            QueryOptions::default(),
            &mut OperationContext::new(),
            io,
        )?;
        if found.len() != 1 {
            return Err(AppError::Precondition(format!(
                "Patch impossible sur '{}' : {} document(s) correspondant(s), 1 attendu",
                model.name(),
                found.len()
            )));
        }

        let mut merged = found.into_iter().map(Value::Object).next().unwrap_or_default();
        merge(&mut merged, Value::Object(doc.clone()));
        if let Value::Object(map) = merged {
            *doc = map;
        }
        debug!(model = %model.name(), "Document complété par le patcher");
        Ok(())
    }
}
