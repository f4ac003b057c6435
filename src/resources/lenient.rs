//! Tolerant field decoders for backend records.
//!
//! Backend documents are loosely typed: ids may be strings or `{"$oid"}`
//! wrappers, phone numbers may be numbers, vehicle fields may be plate
//! strings or booleans. Every decoder here accepts any JSON value and never
//! fails, so record decoding is total.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Number, Value};

/// Text form of a scalar, unwrapping extended-JSON `$oid`/`$date` objects.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => ["$oid", "$date"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(text_of),
        _ => None,
    }
}

/// Numeric value of a number or numeric string.
pub fn number_of(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .map(Number::from)
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    }
}

/// JavaScript-style truthiness.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value))
}

pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Number>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_of(&value))
}

pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(truthy(&value))
}

/// Nested record; anything that does not decode becomes the default.
pub fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode(value))
}

/// Decode a whole record, falling back to defaults for non-objects.
pub fn decode<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_default()
}
