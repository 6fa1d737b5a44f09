//! Lenient field decoding for third-party payloads whose types drift.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn deserialize_f64_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(f64_from_value))
}

/// Accepts strings and numbers alike, e.g. ids that are sometimes `123`
/// and sometimes `"123"`.
pub fn deserialize_string_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(string_from_value))
}

pub fn bool_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "sim"
        ),
        _ => false,
    }
}

pub fn f64_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

pub fn string_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First non-null entry among `keys` on a JSON object.
pub fn first_field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null() && value.as_str().map_or(true, |s| !s.trim().is_empty()))
}

pub fn first_string(object: &Value, keys: &[&str]) -> Option<String> {
    first_field(object, keys).and_then(string_from_value)
}

pub fn first_f64(object: &Value, keys: &[&str]) -> Option<f64> {
    first_field(object, keys).and_then(f64_from_value)
}

/// Company fields arrive either as `{"name": …}` or as a bare string.
pub fn company_name(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Object(map) => map.get("name").and_then(string_from_value),
        other => string_from_value(other),
    }
}
