//! Accessors over untrusted raw JSON.
//!
//! Raw documents come from files or peers written by other implementations,
//! so integers may arrive as JSON numbers or as decimal strings.

use serde_json::{Map, Value};

/// Field value, treating explicit `null` as absent.
pub(crate) fn field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

/// Non-empty string.
pub(crate) fn text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Unsigned integer from a JSON integer or a decimal string.
pub(crate) fn uint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Arbitrary-precision amount from a JSON integer or a decimal string.
pub(crate) fn amount(value: &Value) -> Option<u128> {
    match value {
        Value::Number(number) => number.as_u64().map(u128::from),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Strictly positive unsigned integer.
pub(crate) fn positive(value: &Value) -> Option<u64> {
    uint(value).filter(|v| *v > 0)
}
