//! Reusable field filters
//!
//! These filters normalize incoming values before validation

use serde_json::Value;

/// Filter: trim surrounding whitespace from a string, leave other values alone
pub fn trim() -> impl Fn(Value) -> Value + Send + Sync + Clone {
    |value: Value| match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    }
}

/// Filter: treat JSON `null` as an absent value
pub fn null_as_absent() -> impl Fn(Option<Value>) -> Option<Value> + Send + Sync + Clone {
    |value: Option<Value>| value.filter(|v| !v.is_null())
}
