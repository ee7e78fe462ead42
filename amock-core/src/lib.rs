//! Table lifecycle, record synthesis, validation and write admission.

pub mod admit;
pub mod config;
pub mod database;
pub mod synth;
pub mod table;
pub mod validate;

use amock_gen::GenError;
use amock_schema::SchemaError;
use amock_store::StoreError;
use thiserror::Error;

pub use config::{Config, TableSource};
pub use database::Database;
pub use table::{Table, TableOrigin};
pub use validate::{validate_field, Validation};

#[derive(Debug, Error)]
pub enum CoreError {
    /// Process configuration problem (missing file, bad value, no tables).
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("field {field}: {source}")]
    Generator {
        field: String,
        #[source]
        source: GenError,
    },
    #[error("{reason}")]
    Validation { field: String, reason: String },
    #[error("Missing required field: {0}")]
    MissingRequired(String),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("{0}")]
    MalformedItem(String),
    #[error("batch item {index}: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<CoreError>,
    },
    #[error("unknown table {0}")]
    UnknownTable(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CoreError {
    /// The innermost error, looking through batch wrappers.
    pub fn root(&self) -> &CoreError {
        match self {
            CoreError::BatchItem { source, .. } => source.root(),
            other => other,
        }
    }
}
