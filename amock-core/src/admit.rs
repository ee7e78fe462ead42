//! Turning a client-supplied object into a record that may be stored.

use amock_schema::TableDefinition;
use amock_types::{as_sequence, Collection, Record};
use rand::Rng;

use crate::synth::generate_value;
use crate::validate::validate_field;
use crate::CoreError;

/// Validate `input` against `definition` and fill in omitted optional fields.
///
/// `existing` is the collection the record will join (used for identifier uniqueness).
/// `last_auto_id` advances for accepted sequence values `>=` the counter and for
/// backfilled sequence ids; callers commit it only once the record is persisted.
pub fn admit<R: Rng + ?Sized>(
    definition: &TableDefinition,
    last_auto_id: &mut u64,
    existing: &Collection,
    input: &Record,
    rng: &mut R,
) -> Result<Record, CoreError> {
    let mut record = Record::new();

    for (key, value) in input {
        let d = definition
            .get(key)
            .ok_or_else(|| CoreError::UnknownField(key.clone()))?;
        let validation = validate_field(d, value, key, existing);
        if !validation.valid {
            return Err(CoreError::Validation {
                field: key.clone(),
                reason: validation.reasons.join("; "),
            });
        }
        if d.is_sequence() {
            if let Some(id) = as_sequence(value) {
                if id >= *last_auto_id {
                    *last_auto_id = id.saturating_add(1);
                }
            }
        }
        record.insert(key.clone(), value.clone());
    }

    for (key, d) in definition.iter() {
        if record.contains_key(key) {
            continue;
        }
        if d.required {
            return Err(CoreError::MissingRequired(key.to_string()));
        }
        let value = generate_value(d, last_auto_id, rng).map_err(|source| CoreError::Generator {
            field: key.to_string(),
            source,
        })?;
        record.insert(key.to_string(), value);
    }

    Ok(record)
}
