//! Conversions between resource data and CEL values

use crate::Result;
use crate::model::Resource;
use cel_interpreter::Value;
use cel_interpreter::objects::{Key, Map};
use ohno::{app_err, bail};
use std::collections::HashMap;
use std::sync::Arc;

/// Build a CEL map value from string keys.
pub fn map_value(entries: impl IntoIterator<Item = (String, Value)>) -> Value {
    let map: HashMap<Arc<String>, Value> = entries.into_iter().map(|(k, v)| (Arc::new(k), v)).collect();
    Value::Map(Map::from(map))
}

#[must_use]
pub fn string_value(s: impl Into<String>) -> Value {
    Value::String(Arc::new(s.into()))
}

#[must_use]
pub fn list_value(items: Vec<Value>) -> Value {
    Value::List(Arc::new(items))
}

/// Convert a JSON value into the equivalent CEL value.
///
/// Integers that fit in `i64` become `Int`, larger ones `UInt`, everything else `Float`.
#[must_use]
pub fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => string_value(s.as_str()),
        serde_json::Value::Array(items) => list_value(items.iter().map(from_json).collect()),
        serde_json::Value::Object(fields) => map_value(fields.iter().map(|(k, v)| (k.clone(), from_json(v)))),
    }
}

/// Convert a CEL value into JSON.
///
/// Timestamps are rendered as RFC 3339 strings. Map keys are stringified.
///
/// # Errors
/// Returns an error for values with no JSON representation (bytes, durations,
/// functions, non-finite floats).
pub fn to_json(value: &Value) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::UInt(u) => serde_json::Value::from(*u),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| app_err!("cannot represent {f} as a JSON number"))?,
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect::<Result<_>>()?),
        Value::Map(map) => {
            let mut fields = serde_json::Map::new();
            for (key, v) in map.map.iter() {
                let _ = fields.insert(key_to_string(key), to_json(v)?);
            }
            serde_json::Value::Object(fields)
        }
        Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
        other => bail!("cannot represent {} as JSON", type_name(other)),
    })
}

#[must_use]
pub fn key_to_string(key: &Key) -> String {
    match key {
        Key::String(s) => s.to_string(),
        Key::Int(i) => i.to_string(),
        Key::Uint(u) => u.to_string(),
        Key::Bool(b) => b.to_string(),
    }
}

/// A short, user-facing name for the type of a value, used in error messages.
#[must_use]
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::UInt(_) => "uint",
        Value::Float(_) => "double",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::List(_) => "list",
        Value::Map(_) => "map",
        Value::Timestamp(_) => "timestamp",
        Value::Duration(_) => "duration",
        _ => "function",
    }
}

/// The value bound to `self` while evaluating rules against `resource`.
///
/// Contains `type`, `name`, `file` and `line` plus every attribute. An attribute
/// with the same name as one of the metadata keys replaces it.
#[must_use]
pub fn resource_to_value(resource: &Resource) -> Value {
    let metadata = [
        ("type".to_string(), string_value(resource.resource_type.as_str())),
        ("name".to_string(), string_value(resource.name.as_str())),
        ("file".to_string(), string_value(resource.file.as_str())),
        ("line".to_string(), Value::Int(i64::from(resource.line))),
    ];

    let attributes = resource.attributes.iter().map(|(k, v)| (k.clone(), from_json(v)));

    // later entries win when collected into the map
    map_value(metadata.into_iter().chain(attributes))
}
