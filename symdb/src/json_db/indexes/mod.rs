// FICHIER : symdb/src/json_db/indexes/mod.rs

pub mod codec;
pub mod manager;
pub mod paths;

use crate::utils::data::{BTreeMap, Deserialize, Serialize};

pub use manager::{del_indexes, index};
pub use paths::{CollectionPaths, PathKind};

/// Champ implicite, toujours indexé.
pub const ID_FIELD: &str = "_id";

/// Coercition déclarée d'un champ indexé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// Aucune coercition déclarée.
    #[default]
    Any,
}

/// Schéma versionné : ensemble des champs indexés (chemins pointés autorisés).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    version: u64,
    #[serde(default)]
    fields: BTreeMap<String, FieldType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construction fluide : `Schema::new().field("age", FieldType::Number)`.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.insert(name, field_type);
        self
    }

    /// Ajoute (ou retype) un champ et renvoie la nouvelle version.
    pub fn insert(&mut self, name: impl Into<String>, field_type: FieldType) -> u64 {
        self.fields.insert(name.into(), field_type);
        self.version += 1;
        self.version
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Vrai pour un champ déclaré ou pour `_id`.
    pub fn is_indexed(&self, name: &str) -> bool {
        name == ID_FIELD || self.fields.contains_key(name)
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        match self.fields.get(name) {
            Some(t) => Some(*t),
            None if name == ID_FIELD => Some(FieldType::String),
            None => None,
        }
    }

    /// Champs à indexer : ceux du schéma puis `_id`.
    pub fn indexed_fields(&self) -> impl Iterator<Item = (&str, FieldType)> + '_ {
        self.fields
            .iter()
            .filter(|(name, _)| name.as_str() != ID_FIELD)
            .map(|(name, t)| (name.as_str(), *t))
            .chain(std::iter::once((ID_FIELD, FieldType::String)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, FieldType)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Schema::new(), |schema, (name, t)| schema.field(name, t))
    }
}

// ============================================================================
// TESTS UNITAIRES
// ============================================================================
