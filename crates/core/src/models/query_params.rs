//! Conversion of filter structs into query-string pairs.
//!
//! Filters are plain serde structs. Absent (`None`) and blank values are
//! dropped so the API never receives `key=` or `key=undefined`. Keys come out
//! sorted, which also makes the pair list usable as a stable cache key.

use serde::Serialize;
use serde_json::Value;

use super::pagination::PageRequest;

/// A filter that parameterizes a paginated list query.
pub trait ListFilter: Serialize + Clone + Send + Sync + 'static {
    fn page_request(&self) -> &PageRequest;

    fn page_request_mut(&mut self) -> &mut PageRequest;
}

/// Flattens a serializable filter into `(key, value)` query pairs.
pub fn query_pairs<T: Serialize>(filter: &T) -> Vec<(String, String)> {
    let value = match serde_json::to_value(filter) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to serialize query filter: {}", e);
            return Vec::new();
        }
    };

    let mut pairs = Vec::new();
    if let Value::Object(map) = value {
        for (key, value) in map {
            push_value(&mut pairs, &key, value);
        }
    }
    pairs
}

/// Renders query pairs as a canonical string (`a=1&b=2`).
pub fn canonical_query<T: Serialize>(filter: &T) -> String {
    query_pairs(filter)
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_value(pairs: &mut Vec<(String, String)>, key: &str, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                pairs.push((key.to_string(), trimmed.to_string()));
            }
        }
        Value::Bool(b) => pairs.push((key.to_string(), b.to_string())),
        Value::Number(n) => pairs.push((key.to_string(), n.to_string())),
        Value::Array(items) => {
            for item in items {
                push_value(pairs, key, item);
            }
        }
        Value::Object(map) => {
            for (nested_key, nested) in map {
                push_value(pairs, &nested_key, nested);
            }
        }
    }
}
