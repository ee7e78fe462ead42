use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// One stored record: field name -> JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Ordered records of one table. Always read and written as a whole.
pub type Collection = Vec<Record>;

/// Value produced by a generator before it is placed in a record.
#[derive(Clone, Debug, PartialEq)]
pub enum GeneratedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<GeneratedValue> for Value {
    fn from(v: GeneratedValue) -> Self {
        match v {
            GeneratedValue::Bool(b) => Value::Bool(b),
            GeneratedValue::Int(i) => Value::from(i),
            // NaN/inf have no JSON form.
            GeneratedValue::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            GeneratedValue::Text(s) => Value::String(s),
        }
    }
}

/// Runtime kind of an incoming JSON value, as seen by validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
    /// Arrays and objects. Never a valid field value.
    Composite,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::Text,
            Value::Array(_) | Value::Object(_) => ValueKind::Composite,
        }
    }
}

/// Largest sequence identifier a table hands out. Stored ids are JSON integers, so the
/// counter and every sequence value must stay within `i64`.
pub const MAX_SEQUENCE: u64 = i64::MAX as u64;

/// Interpret a stored value as a sequence identifier.
///
/// Only non-negative integral numbers qualify; `3.0` counts, `3.5` and `"3"` do not.
pub fn as_sequence(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else { return None; };
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}

/// Canonical identifier representation at the request boundary.
///
/// Route parameters are always text. A stored string matches by exact equality; a stored
/// number matches when the text parses to the same numeric value (`"3"` matches `3` and `3.0`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, stored: &Value) -> bool {
        match stored {
            Value::String(s) => *s == self.0,
            Value::Number(n) => match (self.0.trim().parse::<f64>(), n.as_f64()) {
                (Ok(query), Some(value)) => query == value,
                _ => n.to_string() == self.0,
            },
            _ => false,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
