use chrono::{DateTime, Utc};
use rand::RngCore;
use serde_json::{Map, Value};
use urlencoding::encode;

/// First non-empty string among `keys`. Ids sent as numbers are stringified.
pub fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn bool_field(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(|v| v.as_bool()))
        .unwrap_or(false)
}

pub fn time_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|k| {
        obj.get(*k)
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Id of a nested object, e.g. `service_version.id`.
pub fn nested_id(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_object())
        .and_then(|inner| str_field(inner, &["id"]))
}

/// The array under `data`, or the payload itself when it is already an array.
pub fn data_array(payload: &Value) -> Vec<Value> {
    if let Some(arr) = payload.as_array() {
        return arr.clone();
    }
    payload
        .get("data")
        .and_then(|d| d.as_array())
        .cloned()
        .unwrap_or_default()
}

pub fn build_query_string(pairs: &[(String, String)]) -> String {
    let mut first = true;
    let mut out = String::new();
    for (k, v) in pairs {
        if !first {
            out.push('&');
        } else {
            first = false;
        }
        out.push_str(&encode(k));
        out.push('=');
        out.push_str(&encode(v));
    }
    out
}

/// Drops null, empty-string and `false` members from a JSON object body.
pub fn cleanup_empty_fields(body: Value) -> Value {
    match body {
        Value::Object(obj) => Value::Object(
            obj.into_iter()
                .filter(|(_, v)| match v {
                    Value::Null => false,
                    Value::String(s) => !s.trim().is_empty(),
                    Value::Bool(b) => *b,
                    _ => true,
                })
                .collect(),
        ),
        other => other,
    }
}

/// Random reference id in UUID v4 layout.
pub fn generate_reference_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let h = hex::encode(bytes);
    format!("{}-{}-{}-{}-{}", &h[0..8], &h[8..12], &h[12..16], &h[16..20], &h[20..32])
}
