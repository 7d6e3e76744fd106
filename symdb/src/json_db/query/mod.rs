// FICHIER : symdb/src/json_db/query/mod.rs

pub mod comparison;
pub mod index_search;
pub mod scan_search;
pub mod sort;

use crate::json_db::Document;
use crate::utils::data::Value;

pub use comparison::Comparison;
pub use sort::{PageSpec, SortOrder, SortSpec};

/// Contrainte sur un champ : valeur exacte ou prédicat.
#[derive(Debug, Clone)]
pub enum Criterion {
    Literal(Value),
    Predicate(Comparison),
}

impl Criterion {
    pub fn is_predicate(&self) -> bool {
        matches!(self, Criterion::Predicate(_))
    }

    /// Vrai si des documents sans lien d'index peuvent satisfaire le critère.
    /// Un champ absent ou un tableau vide ne crée aucun lien, et une fonction
    /// libre peut accepter l'un comme l'autre.
    pub fn needs_scan(&self) -> bool {
        match self {
            Criterion::Literal(Value::Array(items)) => items.is_empty(),
            Criterion::Literal(_) => false,
            Criterion::Predicate(Comparison::Compare(_)) => true,
            Criterion::Predicate(predicate) => predicate.compare(None),
        }
    }
}

impl From<Comparison> for Criterion {
    fn from(c: Comparison) -> Self {
        Criterion::Predicate(c)
    }
}

/// Requête : champ (chemin pointé) -> critère, dans l'ordre d'insertion.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    entries: Vec<(String, Criterion)>,
}

impl Lookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Égalité sur une valeur littérale.
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.criterion(field, Criterion::Literal(value.into()))
    }

    /// Contrainte par prédicat.
    pub fn with(self, field: impl Into<String>, predicate: Comparison) -> Self {
        self.criterion(field, Criterion::Predicate(predicate))
    }

    pub fn criterion(mut self, field: impl Into<String>, criterion: Criterion) -> Self {
        self.insert(field, criterion);
        self
    }

    /// Remplace le critère existant du même champ.
    pub fn insert(&mut self, field: impl Into<String>, criterion: Criterion) {
        let field = field.into();
        match self.entries.iter_mut().find(|(k, _)| *k == field) {
            Some(slot) => slot.1 = criterion,
            None => self.entries.push((field, criterion)),
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<Criterion> {
        let pos = self.entries.iter().position(|(k, _)| k == field)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, field: &str) -> Option<&Criterion> {
        self.entries.iter().find(|(k, _)| k == field).map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_predicate(&self) -> bool {
        self.entries.iter().any(|(_, c)| c.is_predicate())
    }

    pub fn needs_scan(&self) -> bool {
        self.entries.iter().any(|(_, c)| c.needs_scan())
    }
}

/// Chaque champ du document devient une égalité littérale.
impl From<&Document> for Lookup {
    fn from(doc: &Document) -> Self {
        let mut lookup = Lookup::new();
        for (k, v) in doc {
            lookup.insert(k.clone(), Criterion::Literal(v.clone()));
        }
        lookup
    }
}

impl From<Document> for Lookup {
    fn from(doc: Document) -> Self {
        Lookup::from(&doc)
    }
}
