// FICHIER : symdb/src/json_db/query/sort.rs

use super::comparison::loose_cmp;
use crate::json_db::Document;
use crate::utils::data::{display_string, get_path, Deserialize, Serialize, Value};
use crate::utils::{AppError, Result};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Tri multi-clés : les clés suivantes départagent les précédentes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    keys: Vec<(String, SortOrder)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortOrder::Asc));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortOrder::Desc));
        self
    }

    /// Lit `{ "age": "asc", "name": "desc" }` (ou `1` / `-1`).
    pub fn from_value(spec: &Value) -> Result<Self> {
        let Value::Object(map) = spec else {
            return Err(AppError::Precondition(format!(
                "Spécification de tri invalide : {}",
                spec
            )));
        };
        let mut out = SortSpec::new();
        for (field, order) in map {
            let order = match order {
                Value::String(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
                Value::String(s) if s.eq_ignore_ascii_case("desc") => SortOrder::Desc,
                Value::Number(n) if n.as_i64() == Some(1) => SortOrder::Asc,
                Value::Number(n) if n.as_i64() == Some(-1) => SortOrder::Desc,
                other => {
                    return Err(AppError::Precondition(format!(
                        "Ordre de tri inconnu pour '{}' : {}",
                        field, other
                    )))
                }
            };
            out.keys.push((field.clone(), order));
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Pagination 1-indexée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: usize,
    pub size: usize,
}

impl PageSpec {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(self.size)
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Ordre ascendant d'une clé : absent et `null` en tête.
fn compare_key(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => loose_cmp(x, y).unwrap_or_else(|| {
            type_rank(x)
                .cmp(&type_rank(y))
                .then_with(|| display_string(x).cmp(&display_string(y)))
        }),
    }
}

/// Tri stable. En descendant l'ordre est exactement inversé (`null` en fin).
pub fn sort_documents(docs: &mut [Document], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for (field, order) in &spec.keys {
            let ord = compare_key(get_path(a, field), get_path(b, field));
            let ord = match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

pub fn paginate(docs: Vec<Document>, page: &PageSpec) -> Vec<Document> {
    docs.into_iter()
        .skip(page.offset())
        .take(page.size)
        .collect()
}
