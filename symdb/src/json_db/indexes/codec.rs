// FICHIER : symdb/src/json_db/indexes/codec.rs

//! Codage valeur <-> segment de chemin.
//!
//! Un segment est la forme textuelle de la valeur (`display_string`), avec
//! échappement en pourcent des seuls caractères interdits dans un nom de
//! fichier (`%`, `/`, `\`, NUL) et des noms réservés `.` / `..`.
//! Le nombre `21` et la chaîne `"21"` donnent le même segment : ils sont
//! équivalents pour l'index, comme sous la coercition déclarée du schéma.

use super::FieldType;
use crate::utils::data::{display_string, Value};

/// Segment représentant la chaîne vide.
const EMPTY_SEGMENT: &str = "%";

pub fn escape(raw: &str) -> String {
    match raw {
        "" => return EMPTY_SEGMENT.to_string(),
        "." => return "%2E".to_string(),
        ".." => return "%2E%2E".to_string(),
        _ => {}
    }
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            '\0' => out.push_str("%00"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse de `escape`. Une séquence `%` invalide est conservée telle quelle.
pub fn unescape(segment: &str) -> String {
    if segment == EMPTY_SEGMENT {
        return String::new();
    }
    let bytes = segment.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

impl FieldType {
    /// Valeur -> nom de dossier.
    pub fn encode(&self, value: &Value) -> String {
        escape(&display_string(value))
    }
}

/// Nom de dossier -> toutes les valeurs JSON dont l'encodage donne ce segment.
///
/// Le type déclaré n'est pas une garantie : un champ `string` peut contenir
/// `null` ou un nombre. La forme chaîne est toujours la dernière lecture.
pub fn readings(segment: &str) -> Vec<Value> {
    let raw = unescape(segment);
    let mut out = Vec::with_capacity(2);
    match raw.as_str() {
        "null" => out.push(Value::Null),
        "true" => out.push(Value::Bool(true)),
        "false" => out.push(Value::Bool(false)),
        r if r.starts_with('{') => out.extend(serde_json::from_str::<Value>(r).ok()),
        r => out.extend(parse_number(r)),
    }
    out.push(Value::String(raw));
    out
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

fn parse_number(raw: &str) -> Option<Value> {
    if raw.is_empty() || raw.trim() != raw {
        return None;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::from(i));
    }
    let f = raw.parse::<f64>().ok()?;
    serde_json::Number::from_f64(f).map(Value::Number)
}
