//! JSON rendering of records for inspection and logging.
//!
//! Binary values render as lowercase hex. Maps whose keys are strings render
//! as JSON objects; any other map renders as an array of `[key, value]`
//! pairs. Non-finite doubles render as `null`.

use crate::record::Record;
use crate::value::{Map, Value};
use serde_json::{json, Number};

/// Renders a record as a JSON object holding its populated fields.
pub fn record_to_json(record: &Record) -> serde_json::Value {
    let fields = record
        .iter()
        .map(|(field, value)| (field.name.to_string(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(fields)
}

/// Renders a single value.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => json!(v),
        Value::Byte(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::Double(v) => Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(v) => json!(v),
        Value::Binary(v) => json!(hex::encode(v)),
        Value::Struct(record) => record_to_json(record),
        Value::List(list) | Value::Set(list) => list.iter().map(value_to_json).collect(),
        Value::Map(map) => map_to_json(map),
    }
}

fn map_to_json(map: &Map) -> serde_json::Value {
    let string_keys = map.iter().all(|(k, _)| matches!(k, Value::String(_)));
    if string_keys {
        let entries = map
            .iter()
            .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), value_to_json(v))))
            .collect();
        serde_json::Value::Object(entries)
    } else {
        map.iter()
            .map(|(k, v)| json!([value_to_json(k), value_to_json(v)]))
            .collect()
    }
}
