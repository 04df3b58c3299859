//! Plain projection and canonical JSON text.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A value with a plain JSON projection suitable for hashing and signing.
///
/// Implementors only describe their fields; key ordering is applied when
/// the canonical text is written, never by the order fields were inserted.
pub trait Canonical {
    /// Plain JSON projection. Absent optional fields are omitted.
    fn to_plain(&self) -> Value;

    /// Canonical JSON text of the projection.
    fn to_canonical_json(&self) -> crate::Result<String> {
        to_canonical_json(&self.to_plain())
    }
}

/// Compact canonical JSON text of a value.
///
/// Object keys are written in [`key_order`], arrays keep their order.
pub fn to_canonical_json(value: &Value) -> crate::Result<String> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> crate::Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| key_order(a.0, b.0));
            out.push('{');
            for (index, (key, item)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(item, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

/// Printable ASCII other than letters, in root collation order.
const SYMBOL_ORDER: &[u8] = b" _-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$0123456789";

/// Primary weight: symbols, then digits, then letters ignoring case.
fn primary(c: char) -> u32 {
    if c.is_ascii_alphabetic() {
        return SYMBOL_ORDER.len() as u32 + (c.to_ascii_lowercase() as u32 - 'a' as u32);
    }
    if c.is_ascii() {
        if let Some(index) = SYMBOL_ORDER.iter().position(|b| char::from(*b) == c) {
            return index as u32;
        }
    }
    // outside printable ASCII: after every letter, by code point
    0x100 + c as u32
}

/// Order of object keys in canonical text.
///
/// Matches root-locale collation for printable ASCII keys, which is what
/// peer nodes sort with: symbols before digits before letters, case ignored
/// unless the keys are otherwise equal, then lowercase first.
pub fn key_order(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary)
        .cmp(b.chars().map(primary))
        .then_with(|| {
            a.chars()
                .map(|c| c.is_ascii_uppercase())
                .cmp(b.chars().map(|c| c.is_ascii_uppercase()))
        })
        .then_with(|| a.cmp(b))
}

/// Project a keyed collection through each element's own projection.
pub fn plain_map<K: Display, V: Canonical>(map: &BTreeMap<K, V>) -> Value {
    let object: Map<String, Value> = map
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_plain()))
        .collect();
    Value::Object(object)
}

/// Render an arbitrary-precision amount as decimal text.
///
/// Native JSON numbers lose precision above 2^53 in some runtimes, which
/// would make hashes diverge between nodes.
pub fn amount(value: u128) -> Value {
    Value::String(value.to_string())
}
