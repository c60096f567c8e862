//! Helpers for reading and writing loosely-typed wire objects.
//!
//! The Data Plane API decodes into [`WireObject`]; these accessors turn its
//! fields into manifest values and tolerate absent or mistyped fields by
//! falling back to defaults.

use dataplane::WireObject;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Enum value the API uses for switched-on features.
pub const ENABLED: &str = "enabled";

/// A string field, if present.
pub fn get_str<'a>(obj: &'a WireObject, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// A string field, or empty.
pub fn string(obj: &WireObject, key: &str) -> String {
    get_str(obj, key).unwrap_or_default().to_string()
}

/// An integer field; floats are truncated.
pub fn get_int(obj: &WireObject, key: &str) -> Option<i64> {
    let value = obj.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_u64().and_then(|v| i64::try_from(v).ok()))
        .or_else(|| value.as_f64().map(|v| v as i64))
}

/// A non-negative integer field, or 0.
pub fn unsigned(obj: &WireObject, key: &str) -> u64 {
    get_int(obj, key)
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or_default()
}

/// A port field, or 0 when absent or out of range.
pub fn port(obj: &WireObject, key: &str) -> u16 {
    u16::try_from(unsigned(obj, key)).unwrap_or_default()
}

/// Whether an enum field is set to `enabled`.
pub fn is_enabled(obj: &WireObject, key: &str) -> bool {
    get_str(obj, key) == Some(ENABLED)
}

/// A nested object field, or empty.
pub fn object(obj: &WireObject, key: &str) -> Map<String, Value> {
    obj.get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// A list of nested objects; non-object entries are dropped.
pub fn object_list(obj: &WireObject, key: &str) -> Vec<Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
        .unwrap_or_default()
}

/// A nested object flattened to strings.
///
/// Non-string scalars are rendered with their JSON spelling (`3`, `true`).
pub fn string_map(obj: &WireObject, key: &str) -> BTreeMap<String, String> {
    object(obj, key)
        .into_iter()
        .map(|(k, v)| {
            let rendered = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, rendered)
        })
        .collect()
}

/// Split a comma-separated list, dropping blanks.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Payload builders
// =============================================================================

/// Insert a string when non-empty.
pub fn put_str(obj: &mut WireObject, key: &str, value: &str) {
    if !value.is_empty() {
        obj.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Insert an integer when non-zero.
pub fn put_nonzero(obj: &mut WireObject, key: &str, value: u64) {
    if value > 0 {
        obj.insert(key.to_string(), Value::from(value));
    }
}

/// Insert `"enabled"` when the flag is set.
pub fn put_enabled(obj: &mut WireObject, key: &str, flag: bool) {
    if flag {
        obj.insert(key.to_string(), Value::String(ENABLED.to_string()));
    }
}

/// Insert a string map when non-empty.
pub fn put_string_map(obj: &mut WireObject, key: &str, map: &BTreeMap<String, String>) {
    if !map.is_empty() {
        let nested: Map<String, Value> = map
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        obj.insert(key.to_string(), Value::Object(nested));
    }
}

/// Insert a nested object when non-empty.
pub fn put_object(obj: &mut WireObject, key: &str, nested: &Map<String, Value>) {
    if !nested.is_empty() {
        obj.insert(key.to_string(), Value::Object(nested.clone()));
    }
}

/// Insert a list of objects when non-empty.
pub fn put_object_list(obj: &mut WireObject, key: &str, items: &[Map<String, Value>]) {
    if !items.is_empty() {
        let list = items.iter().cloned().map(Value::Object).collect();
        obj.insert(key.to_string(), Value::Array(list));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(value: Value) -> WireObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_get_int_accepts_floats() {
        let obj = wire(json!({"a": 5, "b": 7.9, "c": "x"}));
        assert_eq!(get_int(&obj, "a"), Some(5));
        assert_eq!(get_int(&obj, "b"), Some(7));
        assert_eq!(get_int(&obj, "c"), None);
        assert_eq!(get_int(&obj, "missing"), None);
    }

    #[test]
    fn test_port_out_of_range_is_zero() {
        let obj = wire(json!({"ok": 8080, "big": 70000, "neg": -1}));
        assert_eq!(port(&obj, "ok"), 8080);
        assert_eq!(port(&obj, "big"), 0);
        assert_eq!(port(&obj, "neg"), 0);
    }

    #[test]
    fn test_string_map_renders_scalars() {
        let obj = wire(json!({"balance": {"algorithm": "roundrobin", "hash": 3, "on": true}}));
        let map = string_map(&obj, "balance");
        assert_eq!(map["algorithm"], "roundrobin");
        assert_eq!(map["hash"], "3");
        assert_eq!(map["on"], "true");
    }

    #[test]
    fn test_is_enabled() {
        let obj = wire(json!({"ssl": "enabled", "tcpka": "disabled"}));
        assert!(is_enabled(&obj, "ssl"));
        assert!(!is_enabled(&obj, "tcpka"));
        assert!(!is_enabled(&obj, "missing"));
    }

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn test_put_helpers_skip_empty() {
        let mut obj = WireObject::new();
        put_str(&mut obj, "a", "");
        put_nonzero(&mut obj, "b", 0);
        put_enabled(&mut obj, "c", false);
        put_string_map(&mut obj, "d", &BTreeMap::new());
        assert!(obj.is_empty());

        put_str(&mut obj, "a", "x");
        put_nonzero(&mut obj, "b", 3);
        put_enabled(&mut obj, "c", true);
        assert_eq!(Value::Object(obj), json!({"a": "x", "b": 3, "c": "enabled"}));
    }
}
