//! Record synthesis: schema -> generated records.

use amock_gen::GenError;
use amock_schema::{FieldDescriptor, RawSchema, TableDefinition};
use amock_types::{Collection, Record};
use rand::Rng;
use serde_json::Value;

use crate::CoreError;

/// Parse a raw schema document and dry-run every field's generator.
///
/// Anything that would fail later at generation time fails here instead.
pub fn build_definition(raw: &RawSchema) -> Result<TableDefinition, CoreError> {
    let definition = TableDefinition::from_raw(raw)?;
    check_definition(&definition)?;
    Ok(definition)
}

pub fn check_definition(definition: &TableDefinition) -> Result<(), CoreError> {
    for (name, d) in definition.iter() {
        amock_gen::check(d).map_err(|source| CoreError::Generator {
            field: name.to_string(),
            source,
        })?;
    }
    Ok(())
}

pub fn generate_value<R: Rng + ?Sized>(d: &FieldDescriptor, last_auto_id: &mut u64, rng: &mut R) -> Result<Value, GenError> {
    amock_gen::generate_field(d, last_auto_id, rng).map(Value::from)
}

/// One fully generated record.
pub fn synthesize_record<R: Rng + ?Sized>(
    definition: &TableDefinition,
    last_auto_id: &mut u64,
    rng: &mut R,
) -> Result<Record, CoreError> {
    let mut record = Record::new();
    for (name, d) in definition.iter() {
        let value = generate_value(d, last_auto_id, rng).map_err(|source| CoreError::Generator {
            field: name.to_string(),
            source,
        })?;
        record.insert(name.to_string(), value);
    }
    Ok(record)
}

pub fn synthesize<R: Rng + ?Sized>(
    definition: &TableDefinition,
    last_auto_id: &mut u64,
    count: usize,
    rng: &mut R,
) -> Result<Collection, CoreError> {
    (0..count)
        .map(|_| synthesize_record(definition, last_auto_id, rng))
        .collect()
}
