//! The table registry: startup hydration and serialized per-table mutation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use amock_schema::{RawSchema, TableDefinition};
use amock_store::{TableMeta, TableStore};
use amock_types::{Collection, Record, RecordId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::admit::admit;
use crate::config::TableSource;
use crate::synth::{build_definition, synthesize};
use crate::table::{Table, TableOrigin};
use crate::CoreError;

/// Owns every table for the process lifetime.
///
/// Reads go straight to the store. Every mutation of a table (insert, batch insert, delete)
/// holds that table's mutex across its read-modify-write so counters and identifiers stay
/// consistent under concurrent requests.
pub struct Database {
    store: Arc<dyn TableStore>,
    tables: BTreeMap<String, Mutex<Table>>,
}

impl Database {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            tables: BTreeMap::new(),
        }
    }

    /// Bring every source to the ready state, one table at a time.
    pub async fn hydrate(
        store: Arc<dyn TableStore>,
        sources: &[TableSource],
        init_count: usize,
    ) -> Result<Self, CoreError> {
        let started = Instant::now();
        let mut db = Self::new(store);
        for source in sources {
            db.load_table(source, init_count).await?;
        }
        info!(
            tables = db.tables.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "database hydrated"
        );
        Ok(db)
    }

    /// Rehydrate `source` from the store if both its files exist, otherwise synthesize it.
    pub async fn load_table(&mut self, source: &TableSource, init_count: usize) -> Result<TableOrigin, CoreError> {
        let name = source.name.as_str();
        if self.tables.contains_key(name) {
            return Err(CoreError::Config(format!("table {name} is already loaded")));
        }

        if self.store.exists(name).await? {
            let definition = self.store.read_definition(name).await?;
            let collection = self.store.read(name).await?;
            let mut table = Table::new(name, Some(source.definition.clone()), definition, TableOrigin::Rehydrated);
            if let Some(meta) = self.store.read_meta(name).await? {
                table.last_auto_id = table.last_auto_id.max(meta.last_auto_id);
            }
            table.observe(&collection);
            info!(
                table = %table.name,
                definition = ?table.definition_source,
                records = collection.len(),
                next_id = table.last_auto_id,
                "table rehydrated"
            );
            self.tables.insert(table.name.clone(), Mutex::new(table));
            return Ok(TableOrigin::Rehydrated);
        }

        let raw = RawSchema::from_path(&source.definition)?;
        self.create_table_from_raw(name, &raw, Some(source.definition.clone()), init_count)
            .await
    }

    /// Build a table from a raw schema, generate `init_count` records, and persist both.
    pub async fn create_table_from_raw(
        &mut self,
        name: &str,
        raw: &RawSchema,
        definition_source: Option<PathBuf>,
        init_count: usize,
    ) -> Result<TableOrigin, CoreError> {
        if self.tables.contains_key(name) {
            return Err(CoreError::Config(format!("table {name} is already loaded")));
        }
        let definition = build_definition(raw)?;
        let mut table = Table::new(name, definition_source, definition, TableOrigin::Synthesized);

        let mut rng = StdRng::from_entropy();
        let collection = synthesize(&table.definition, &mut table.last_auto_id, init_count, &mut rng)?;

        self.store.write_definition(name, &table.definition).await?;
        self.store
            .write_meta(name, &TableMeta { last_auto_id: table.last_auto_id })
            .await?;
        self.store.write(name, &collection).await?;
        info!(
            table = %table.name,
            definition = ?table.definition_source,
            fields = table.definition.len(),
            records = collection.len(),
            "table synthesized"
        );
        self.tables.insert(table.name.clone(), Mutex::new(table));
        Ok(TableOrigin::Synthesized)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn table(&self, name: &str) -> Result<&Mutex<Table>, CoreError> {
        self.tables
            .get(name)
            .ok_or_else(|| CoreError::UnknownTable(name.to_string()))
    }

    pub async fn definition(&self, table: &str) -> Result<TableDefinition, CoreError> {
        Ok(self.table(table)?.lock().await.definition.clone())
    }

    pub async fn last_auto_id(&self, table: &str) -> Result<u64, CoreError> {
        Ok(self.table(table)?.lock().await.last_auto_id)
    }

    pub async fn origin(&self, table: &str) -> Result<TableOrigin, CoreError> {
        Ok(self.table(table)?.lock().await.origin)
    }

    pub async fn list(&self, table: &str) -> Result<Collection, CoreError> {
        self.table(table)?;
        Ok(self.store.read(table).await?)
    }

    pub async fn get(&self, table: &str, id: &RecordId) -> Result<Option<Record>, CoreError> {
        let key = self.table(table)?.lock().await.key_field().to_string();
        Ok(self.store.get_by_id(table, &key, id).await?)
    }

    /// Persist an admitted collection together with the counter it produced.
    ///
    /// The counter goes to the store first, so the stored counter is always ahead of every
    /// stored id. Once it is written, the in-memory counter follows it even if the
    /// collection write then fails: ids may be skipped, never reused.
    async fn persist(&self, guard: &mut Table, collection: &Collection, counter: u64) -> Result<(), CoreError> {
        if counter != guard.last_auto_id {
            self.store
                .write_meta(&guard.name, &TableMeta { last_auto_id: counter })
                .await?;
            guard.last_auto_id = counter;
        }
        self.store.write(&guard.name, collection).await?;
        Ok(())
    }

    /// Validate, backfill, and append one record. Returns the stored record.
    ///
    /// The uniqueness scan reads the stored collection; if that read fails the error is
    /// `CoreError::Storage`, not a validation reason.
    pub async fn insert(&self, table: &str, input: &Record) -> Result<Record, CoreError> {
        let mut guard = self.table(table)?.lock().await;
        let mut collection = self.store.read(table).await?;
        let mut counter = guard.last_auto_id;
        let mut rng = StdRng::from_entropy();

        let record = admit(&guard.definition, &mut counter, &collection, input, &mut rng)?;
        collection.push(record.clone());
        if let Err(e) = self.persist(&mut guard, &collection, counter).await {
            warn!(table, error = %e, "insert not persisted");
            return Err(e);
        }
        debug!(table, next_id = counter, "record inserted");
        Ok(record)
    }

    /// Insert every item or none of them.
    ///
    /// Items are admitted in order against the collection plus the items before them, so
    /// identifiers must also be unique within the batch. Nothing is written and the counter
    /// is left unchanged unless every item is accepted.
    pub async fn insert_batch(&self, table: &str, items: &[Value]) -> Result<Collection, CoreError> {
        let mut guard = self.table(table)?.lock().await;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let mut collection = self.store.read(table).await?;
        let before = collection.len();
        let mut counter = guard.last_auto_id;
        let mut rng = StdRng::from_entropy();

        for (index, item) in items.iter().enumerate() {
            let wrap = |source: CoreError| CoreError::BatchItem {
                index,
                source: Box::new(source),
            };
            let input = item
                .as_object()
                .ok_or_else(|| wrap(CoreError::MalformedItem("batch item must be a JSON object".into())))?;
            let record = admit(&guard.definition, &mut counter, &collection, input, &mut rng).map_err(wrap)?;
            collection.push(record);
        }

        if let Err(e) = self.persist(&mut guard, &collection, counter).await {
            warn!(table, items = items.len(), error = %e, "batch not persisted");
            return Err(e);
        }
        debug!(table, items = items.len(), next_id = counter, "batch inserted");
        Ok(collection.split_off(before))
    }

    /// Insert a request body: an object is one record, an array is a batch.
    pub async fn insert_value(&self, table: &str, body: &Value) -> Result<Value, CoreError> {
        match body {
            Value::Object(record) => self.insert(table, record).await.map(Value::Object),
            Value::Array(items) => {
                let inserted = self.insert_batch(table, items).await?;
                Ok(Value::Array(inserted.into_iter().map(Value::Object).collect()))
            }
            _ => Err(CoreError::MalformedItem(
                "body must be a JSON object or an array of objects".into(),
            )),
        }
    }

    /// Delete the first record whose key matches `id`. `None` when absent.
    pub async fn remove(&self, table: &str, id: &RecordId) -> Result<Option<Record>, CoreError> {
        let guard = self.table(table)?.lock().await;
        let removed = self.store.remove_by_id(table, guard.key_field(), id).await?;
        if removed.is_some() {
            debug!(table, id = %id, "record removed");
        }
        Ok(removed)
    }
}
