//! Lenient keyword list normalization.

use serde_json::Value;

use crate::blog::Keyword;

/// Coerce whatever a client sent as `keywords` into a clean list.
///
/// - absent or `null` → `[]`
/// - a string → one keyword with volume 0
/// - an array → strings become volume-0 keywords, objects with a non-empty
///   string `name` keep their numeric `volume` (or 0); everything else is dropped
/// - any other type → `[]`
pub fn normalize_keywords(raw: Option<&Value>) -> Vec<Keyword> {
    match raw {
        Some(Value::String(name)) => vec![Keyword::new(name.clone(), 0)],
        Some(Value::Array(items)) => items.iter().filter_map(normalize_item).collect(),
        _ => Vec::new(),
    }
}

fn normalize_item(item: &Value) -> Option<Keyword> {
    match item {
        Value::String(name) => Some(Keyword::new(name.clone(), 0)),
        Value::Object(fields) => {
            let name = fields.get("name")?.as_str().filter(|n| !n.is_empty())?;
            let volume = fields.get("volume").map(volume_of).unwrap_or(0);
            Some(Keyword::new(name, volume))
        }
        _ => None,
    }
}

fn volume_of(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v as i64))
        .unwrap_or(0)
}
