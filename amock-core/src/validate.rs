//! Per-field write validation against the inferred schema.

use amock_schema::{FieldDescriptor, FieldType};
use amock_types::{Collection, ValueKind, MAX_SEQUENCE};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub reasons: Vec<String>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            reasons: Vec::new(),
        }
    }

    fn fail(reason: String) -> Self {
        Self {
            valid: false,
            reasons: vec![reason],
        }
    }
}

/// Check `value` for field `key` against its descriptor.
///
/// Rules apply in order: null, enum membership, uuid shape, sequence range and uniqueness (scan of
/// `existing`), then runtime kind against the field type.
pub fn validate_field(d: &FieldDescriptor, value: &Value, key: &str, existing: &Collection) -> Validation {
    if value.is_null() {
        return if d.nullable {
            Validation::ok()
        } else {
            Validation::fail(format!("Field is not nullable: {key}"))
        };
    }

    if d.field_type == FieldType::Enum {
        let matched = value
            .as_str()
            .is_some_and(|s| d.param_list().iter().any(|candidate| *candidate == s));
        return if matched {
            Validation::ok()
        } else {
            Validation::fail(format!("Value doesn't match any of the enum values for field: {key}"))
        };
    }

    if d.is_uuid() {
        return match value.as_str() {
            Some(s) if s.chars().count() == 36 => Validation::ok(),
            _ => Validation::fail(format!("Invalid UUID format for field: {key}")),
        };
    }

    if d.is_sequence() {
        if exceeds_sequence_range(value) {
            return Validation::fail(format!("Sequence ID out of range for field: {key}"));
        }
        let taken = existing
            .iter()
            .filter_map(|record| record.get(key))
            .any(|stored| same_value(stored, value));
        return if taken {
            Validation::fail(format!("Duplicate ID for field: {key}"))
        } else {
            Validation::ok()
        };
    }

    let subtype = d.subtype();
    let matches = match ValueKind::of(value) {
        ValueKind::Bool => d.field_type == FieldType::Bool,
        ValueKind::Text => {
            d.field_type == FieldType::String || (d.field_type == FieldType::Date && subtype != Some("timestamp"))
        }
        ValueKind::Number => {
            d.field_type == FieldType::Number || (d.field_type == FieldType::Date && subtype == Some("timestamp"))
        }
        ValueKind::Null | ValueKind::Composite => false,
    };
    if matches {
        Validation::ok()
    } else {
        Validation::fail(format!("Invalid value for field: {key}"))
    }
}

/// An explicit id the counter could not move past: `id + 1` must still be a valid id.
fn exceeds_sequence_range(value: &Value) -> bool {
    match value.as_u64() {
        Some(id) => id >= MAX_SEQUENCE,
        None => value.as_f64().is_some_and(|f| f >= MAX_SEQUENCE as f64),
    }
}

/// JSON equality where `3` and `3.0` are the same number.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
