//! Case-insensitive field access over loosely shaped JSON.
//!
//! Callers build documents with either PascalCase (`Rfc`, `UsoCFDI`) or
//! camelCase (`rfc`, `usoCFDI`) keys. Only the first character differs, so a
//! lookup tries the PascalCase name and falls back to the camelCase one.
//! This is confined to the input boundaries; the typed model never needs it.

use serde_json::{Map, Number, Value};

/// camelCase form of a PascalCase name: the first character lower-cased.
pub fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Value stored under `name`, or under its camelCase form when `name` is
/// absent. `None` when `obj` is absent, not an object, or has neither key.
pub fn get_field<'a>(obj: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    let map = obj?.as_object()?;
    map.get(name).or_else(|| map.get(&camel_case(name)))
}

/// Write `value` under whichever convention `obj` already uses for `name`.
/// PascalCase is kept when present, otherwise the camelCase key is written.
pub fn set_field(obj: &mut Map<String, Value>, name: &str, value: Value) {
    let camel = camel_case(name);
    if obj.contains_key(&camel) || !obj.contains_key(name) {
        obj.insert(camel, value);
    } else {
        obj.insert(name.to_string(), value);
    }
}

/// Scalar coercion for optional positions: trimmed strings, numbers in
/// their shortest text form, `true` as `"true"`. Blank strings, zero,
/// `false`, `null` and containers are "not present".
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() { None } else { Some(t.to_string()) }
        }
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                None
            } else {
                Some(number_text(n))
            }
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Coercion for positions that are always emitted. Same as [`text`] except
/// that every number counts, zero included.
pub fn required_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(number_text(n)),
        other => text(Some(other)),
    }
}

/// A JSON number in its shortest text form: `100.0` is written `100` and
/// a negative zero is written `0`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// [`text`] of a field, looked up case-insensitively.
pub fn field_text(obj: Option<&Value>, name: &str) -> Option<String> {
    text(get_field(obj, name))
}

/// [`required_text`] of a field, looked up case-insensitively.
pub fn required_field_text(obj: Option<&Value>, name: &str) -> Option<String> {
    required_text(get_field(obj, name))
}

/// Whether a node counts as present: anything except `null`, `false`,
/// zero and the empty string.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// A node that may hold one item or a list of them, as a list.
pub fn one_or_many(node: Option<&Value>) -> Vec<&Value> {
    match node {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(value) if is_present(Some(value)) => vec![value],
        _ => Vec::new(),
    }
}

/// Items of a repeatable node: either a bare array or a wrapper object
/// holding `item` (an array, or a single object standing for a one-element
/// sequence).
pub fn items<'a>(node: Option<&'a Value>, item: &str) -> Vec<&'a Value> {
    match node {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(obj @ Value::Object(_)) => one_or_many(get_field(Some(obj), item)),
        _ => Vec::new(),
    }
}
