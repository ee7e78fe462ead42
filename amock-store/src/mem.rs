use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use amock_schema::TableDefinition;
use amock_types::Collection;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{StoreError, TableMeta, TableStore};

#[derive(Default)]
struct Stored {
    collection: Option<Collection>,
    definition: Option<TableDefinition>,
    meta: Option<TableMeta>,
}

/// In-memory table store.
///
/// Not durable. Used for tests and for running without a data directory.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Stored>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (fault injection for tests).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, table: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other(format!("writes to {table} are disabled")));
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn exists(&self, table: &str) -> Result<bool, StoreError> {
        let inner = self.tables.lock().await;
        Ok(inner
            .get(table)
            .is_some_and(|s| s.collection.is_some() && s.definition.is_some()))
    }

    async fn read(&self, table: &str) -> Result<Collection, StoreError> {
        let inner = self.tables.lock().await;
        inner
            .get(table)
            .and_then(|s| s.collection.clone())
            .ok_or_else(|| StoreError::Missing(table.to_string()))
    }

    async fn write(&self, table: &str, collection: &Collection) -> Result<(), StoreError> {
        self.check_writable(table)?;
        let mut inner = self.tables.lock().await;
        inner.entry(table.to_string()).or_default().collection = Some(collection.clone());
        Ok(())
    }

    async fn read_definition(&self, table: &str) -> Result<TableDefinition, StoreError> {
        let inner = self.tables.lock().await;
        inner
            .get(table)
            .and_then(|s| s.definition.clone())
            .ok_or_else(|| StoreError::Missing(table.to_string()))
    }

    async fn write_definition(&self, table: &str, definition: &TableDefinition) -> Result<(), StoreError> {
        self.check_writable(table)?;
        let mut inner = self.tables.lock().await;
        inner.entry(table.to_string()).or_default().definition = Some(definition.clone());
        Ok(())
    }

    async fn read_meta(&self, table: &str) -> Result<Option<TableMeta>, StoreError> {
        let inner = self.tables.lock().await;
        Ok(inner.get(table).and_then(|s| s.meta))
    }

    async fn write_meta(&self, table: &str, meta: &TableMeta) -> Result<(), StoreError> {
        self.check_writable(table)?;
        let mut inner = self.tables.lock().await;
        inner.entry(table.to_string()).or_default().meta = Some(*meta);
        Ok(())
    }
}
