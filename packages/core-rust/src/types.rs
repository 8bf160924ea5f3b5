use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::factory::ValueObject;

/// Generic runtime value passed into and decoded out of service operations.
///
/// Call arguments, decoded reply payloads, and fault details are all expressed
/// as `Value`. Typed request objects built by the
/// [`TypeFactory`](crate::factory::TypeFactory) travel as [`Value::Object`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Logical null. As a bound argument it means "absent".
    Null,
    /// XSD boolean.
    Bool(bool),
    /// Integral number (signed 64-bit).
    Int(i64),
    /// Floating-point number (64-bit IEEE 754).
    Float(f64),
    /// Text content.
    String(String),
    /// Binary data, rendered as base64 on the wire.
    Bytes(Vec<u8>),
    /// Ordered sequence; serialized as a repeated element.
    Array(Vec<Value>),
    /// Untyped structure keyed by element name.
    /// Uses `BTreeMap` for deterministic serialization order.
    Map(BTreeMap<String, Value>),
    /// Schema-typed structure built by the type factory.
    Object(ValueObject),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text content of a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts into a plain JSON value. Objects become JSON objects in
    /// declared field order; bytes become an array of numbers.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::from(b.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Object(obj) => serde_json::Value::Object(
                obj.fields()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ValueObject> for Value {
    fn from(obj: ValueObject) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Application-level fault reported by the remote endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    /// Machine-readable fault code (e.g. `SOAP-ENV:Server`).
    pub code: String,
    /// Human-readable fault description.
    pub message: String,
    /// Decoded `<detail>` content, when the fault carried one.
    pub detail: Option<Value>,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_converts_to_null() {
        let v: Value = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: Value = Some("x").into();
        assert_eq!(v, Value::String("x".to_string()));
    }

    #[test]
    fn json_round_trip_keeps_scalars() {
        let json = serde_json::json!({"a": 1, "b": [true, "x"], "c": null, "d": 1.5});
        let value = Value::from(json.clone());
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn fault_display_includes_code_and_message() {
        let fault = Fault {
            code: "SOAP-ENV:Server".to_string(),
            message: "boom".to_string(),
            detail: None,
        };
        assert_eq!(fault.to_string(), "SOAP-ENV:Server: boom");
    }
}
