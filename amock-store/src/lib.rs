use std::path::PathBuf;

use amock_schema::TableDefinition;
use amock_types::{Collection, Record, RecordId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod file;
pub use file::JsonFileStore;

pub mod mem;
pub use mem::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode table {table}: {source}")]
    Encode {
        table: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("table {0} is not stored")]
    Missing(String),
    #[error("store error: {0}")]
    Other(String),
}

/// Table state that outlives the process but is not part of the schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMeta {
    /// Next sequence id to hand out. Never lowered.
    pub last_auto_id: u64,
}

/// Whole-collection persistence for tables and their inferred schema.
///
/// Every mutating operation reads the full collection, changes it, and replaces it.
/// Callers serialize mutations per table; the store itself does no locking across calls.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// True only when both the collection and the schema are stored.
    async fn exists(&self, table: &str) -> Result<bool, StoreError>;

    async fn read(&self, table: &str) -> Result<Collection, StoreError>;

    /// Replace the stored collection. A failed write leaves the previous one intact.
    async fn write(&self, table: &str, collection: &Collection) -> Result<(), StoreError>;

    async fn read_definition(&self, table: &str) -> Result<TableDefinition, StoreError>;

    async fn write_definition(&self, table: &str, definition: &TableDefinition) -> Result<(), StoreError>;

    /// `None` when no meta was ever written for `table`.
    async fn read_meta(&self, table: &str) -> Result<Option<TableMeta>, StoreError>;

    async fn write_meta(&self, table: &str, meta: &TableMeta) -> Result<(), StoreError>;

    async fn append(&self, table: &str, record: Record) -> Result<(), StoreError> {
        let mut collection = self.read(table).await?;
        collection.push(record);
        self.write(table, &collection).await
    }

    /// Remove the first record whose `key` matches `id`. `None` when nothing matched.
    async fn remove_by_id(&self, table: &str, key: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let mut collection = self.read(table).await?;
        let Some(pos) = find_by_id(&collection, key, id) else {
            return Ok(None);
        };
        let removed = collection.remove(pos);
        self.write(table, &collection).await?;
        Ok(Some(removed))
    }

    async fn get_by_id(&self, table: &str, key: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let mut collection = self.read(table).await?;
        Ok(find_by_id(&collection, key, id).map(|pos| collection.swap_remove(pos)))
    }
}

/// Position of the first record matching `id` under `key`.
///
/// Numeric stored values are tried first, then textual ones.
pub fn find_by_id(collection: &Collection, key: &str, id: &RecordId) -> Option<usize> {
    let matching = |numeric: bool| {
        collection.iter().position(|record| {
            record
                .get(key)
                .is_some_and(|v| v.is_number() == numeric && id.matches(v))
        })
    };
    matching(true).or_else(|| matching(false))
}
