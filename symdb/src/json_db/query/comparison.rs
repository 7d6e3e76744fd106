// FICHIER : symdb/src/json_db/query/comparison.rs

use crate::utils::data::{display_string, Value};
use crate::utils::Arc;
use std::cmp::Ordering;
use std::fmt;

/// Fonction de test arbitraire (`compare`).
pub type CompareFn = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// Prédicat utilisable à la place d'une valeur littérale dans une recherche.
/// Le candidat est `None` quand le champ est absent du document.
#[derive(Clone)]
pub enum Comparison {
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    /// Bornes exclues des deux côtés.
    Between(Value, Value),
    StartsWith(String),
    /// Liste : appartenance du candidat. Sinon : sous-chaîne du candidat.
    Contains(Value),
    IsNull,
    IsUndefined,
    Compare(CompareFn),
}

impl Comparison {
    pub fn compare(&self, candidate: Option<&Value>) -> bool {
        match self {
            Comparison::Gt(b) => ordering(candidate, b) == Some(Ordering::Greater),
            Comparison::Gte(b) => matches!(
                ordering(candidate, b),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Comparison::Lt(b) => ordering(candidate, b) == Some(Ordering::Less),
            Comparison::Lte(b) => matches!(
                ordering(candidate, b),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Comparison::Between(low, high) => {
                ordering(candidate, low) == Some(Ordering::Greater)
                    && ordering(candidate, high) == Some(Ordering::Less)
            }
            Comparison::StartsWith(prefix) => {
                candidate.is_some_and(|v| display_string(v).starts_with(prefix.as_str()))
            }
            Comparison::Contains(Value::Array(items)) => {
                candidate.is_some_and(|v| items.iter().any(|item| loose_eq(v, item)))
            }
            Comparison::Contains(needle) => candidate
                .is_some_and(|v| display_string(v).contains(display_string(needle).as_str())),
            Comparison::IsNull => matches!(candidate, Some(Value::Null)),
            Comparison::IsUndefined => candidate.is_none(),
            Comparison::Compare(f) => f(candidate),
        }
    }
}

impl fmt::Debug for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Gt(b) => write!(f, "gt({})", b),
            Comparison::Gte(b) => write!(f, "gte({})", b),
            Comparison::Lt(b) => write!(f, "lt({})", b),
            Comparison::Lte(b) => write!(f, "lte({})", b),
            Comparison::Between(b, c) => write!(f, "between({}, {})", b, c),
            Comparison::StartsWith(b) => write!(f, "startsWith({:?})", b),
            Comparison::Contains(b) => write!(f, "contains({})", b),
            Comparison::IsNull => f.write_str("isNull()"),
            Comparison::IsUndefined => f.write_str("isUndefined()"),
            Comparison::Compare(_) => f.write_str("compare(<fn>)"),
        }
    }
}

// --- CONSTRUCTEURS ---

pub fn gt(b: impl Into<Value>) -> Comparison {
    Comparison::Gt(b.into())
}

pub fn gte(b: impl Into<Value>) -> Comparison {
    Comparison::Gte(b.into())
}

pub fn lt(b: impl Into<Value>) -> Comparison {
    Comparison::Lt(b.into())
}

pub fn lte(b: impl Into<Value>) -> Comparison {
    Comparison::Lte(b.into())
}

pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Comparison {
    Comparison::Between(low.into(), high.into())
}

pub fn starts_with(prefix: impl Into<String>) -> Comparison {
    Comparison::StartsWith(prefix.into())
}

pub fn contains(b: impl Into<Value>) -> Comparison {
    Comparison::Contains(b.into())
}

pub fn is_null() -> Comparison {
    Comparison::IsNull
}

pub fn is_undefined() -> Comparison {
    Comparison::IsUndefined
}

pub fn compare<F>(f: F) -> Comparison
where
    F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
{
    Comparison::Compare(Arc::new(f))
}

// --- SÉMANTIQUE LÂCHE ---

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                t.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Ordre entre deux valeurs : deux chaînes se comparent lexicalement,
/// sinon numériquement si les deux côtés se lisent comme des nombres.
/// `null`, absent ou incomparable : `None`.
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => {
            let (x, y) = (as_number(a)?, as_number(b)?);
            x.partial_cmp(&y)
        }
    }
}

fn ordering(candidate: Option<&Value>, b: &Value) -> Option<Ordering> {
    loose_cmp(candidate?, b)
}

/// Égalité stricte sur le type, sauf entre nombre et chaîne numérique.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            matches!((as_number(a), as_number(b)), (Some(x), Some(y)) if x == y)
        }
        _ => a == b,
    }
}

// ============================================================================
// TESTS UNITAIRES
// ============================================================================
