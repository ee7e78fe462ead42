#![forbid(unsafe_code)]

//! Field specification language and the inferred table schema built from it.

pub mod field;
pub mod spec;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use field::{split_field_name, FieldDescriptor, FieldType, Modifiers};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed field spec {spec:?}: {reason}")]
    MalformedSpec { spec: String, reason: String },
    #[error("unknown field type {0:?}")]
    UnknownType(String),
    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),
    #[error("duplicate field {0:?}")]
    DuplicateField(String),
    #[error("field {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<SchemaError>,
    },
    #[error("could not read schema document {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid schema document {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw schema document: field name (with optional `!`, `?` or `[]` suffix) -> spec-string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSchema(pub BTreeMap<String, String>);

impl RawSchema {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SchemaError::Document {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Inferred schema of one table: field name -> descriptor.
///
/// This is also the persisted schema document, so it serializes as a plain map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableDefinition {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl TableDefinition {
    /// Parse every entry of a raw schema document. Any bad entry fails the whole table.
    pub fn from_raw(raw: &RawSchema) -> Result<Self, SchemaError> {
        let mut def = TableDefinition::default();
        for (raw_name, spec) in &raw.0 {
            let (name, modifiers) = split_field_name(raw_name)?;
            let descriptor = FieldDescriptor::parse(spec)
                .map_err(|e| SchemaError::Field {
                    field: name.to_string(),
                    source: Box::new(e),
                })?
                .with_modifiers(modifiers);
            if def.fields.contains_key(name) {
                return Err(SchemaError::DuplicateField(name.to_string()));
            }
            def.fields.insert(name.to_string(), descriptor);
        }
        Ok(def)
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: FieldDescriptor) {
        self.fields.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field used for get/delete by identifier.
    ///
    /// `id` when defined, else the first `id`-typed field by name, else `id`.
    pub fn key_field(&self) -> &str {
        if self.fields.contains_key("id") {
            return "id";
        }
        self.fields
            .iter()
            .find(|(_, d)| d.field_type == FieldType::Id)
            .map(|(k, _)| k.as_str())
            .unwrap_or("id")
    }

    /// Names of auto-increment identifier fields.
    pub fn sequence_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, d)| d.is_sequence())
            .map(|(k, _)| k.as_str())
    }
}
