//! Coercion helpers for loosely-typed persisted JSON.

use serde_json::Value;

/// A JSON number, as `f64`. Strings and other types are rejected.
pub(crate) fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

/// A number, or a string that parses as one.
pub(crate) fn numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Epoch-millisecond timestamp, only from a JSON number.
pub(crate) fn timestamp(value: Option<&Value>) -> Option<i64> {
    number(value).map(|n| n as i64)
}

/// The string value, or `None` for any other type.
pub(crate) fn string(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

/// Non-empty string value.
pub(crate) fn non_empty_string(value: Option<&Value>) -> Option<&str> {
    string(value).filter(|s| !s.is_empty())
}

/// Loose truthiness: `false`, `0`, `""`, `null` and absence are false.
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
