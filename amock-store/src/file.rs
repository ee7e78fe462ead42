use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use amock_schema::TableDefinition;
use amock_types::Collection;
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::{StoreError, TableMeta, TableStore};

const DATA_DIR: &str = "data";
const SCHEMA_DIR: &str = "schema";

/// JSON documents on disk, one collection file and one schema file per table:
///
/// ```text
/// <root>/data/<table>.amock.json
/// <root>/schema/<table>.amock.schema.json
/// <root>/schema/<table>.amock.meta.json
/// ```
///
/// Writes go to a sibling temp file which is then renamed over the target, so readers
/// never observe a half-written document and a failed write keeps the old one.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (and create, if needed) the directory layout under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        for dir in [root.join(DATA_DIR), root.join(SCHEMA_DIR)] {
            std::fs::create_dir_all(&dir).map_err(|source| StoreError::Write { path: dir.clone(), source })?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, table: &str) -> PathBuf {
        self.root.join(DATA_DIR).join(format!("{table}.amock.json"))
    }

    pub fn schema_path(&self, table: &str) -> PathBuf {
        self.root.join(SCHEMA_DIR).join(format!("{table}.amock.schema.json"))
    }

    pub fn meta_path(&self, table: &str) -> PathBuf {
        self.root.join(SCHEMA_DIR).join(format!("{table}.amock.meta.json"))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let raw = fs::read(path).await.map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| StoreError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn replace(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&tmp, bytes).await.map_err(write_err)?;
        if let Err(source) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(write_err(source));
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for JsonFileStore {
    async fn exists(&self, table: &str) -> Result<bool, StoreError> {
        let data = self.collection_path(table);
        let schema = self.schema_path(table);
        let probe = |path: PathBuf| async move {
            fs::try_exists(&path)
                .await
                .map_err(|source| StoreError::Read { path: path.clone(), source })
        };
        Ok(probe(data).await? && probe(schema).await?)
    }

    async fn read(&self, table: &str) -> Result<Collection, StoreError> {
        Self::read_json(&self.collection_path(table)).await
    }

    async fn write(&self, table: &str, collection: &Collection) -> Result<(), StoreError> {
        let path = self.collection_path(table);
        let bytes = serde_json::to_vec(collection).map_err(|source| StoreError::Encode {
            table: table.to_string(),
            source,
        })?;
        Self::replace(&path, &bytes).await?;
        debug!(table, records = collection.len(), file = %path.display(), "collection written");
        Ok(())
    }

    async fn read_definition(&self, table: &str) -> Result<TableDefinition, StoreError> {
        Self::read_json(&self.schema_path(table)).await
    }

    async fn write_definition(&self, table: &str, definition: &TableDefinition) -> Result<(), StoreError> {
        let path = self.schema_path(table);
        let bytes = serde_json::to_vec_pretty(definition).map_err(|source| StoreError::Encode {
            table: table.to_string(),
            source,
        })?;
        Self::replace(&path, &bytes).await?;
        debug!(table, fields = definition.len(), file = %path.display(), "schema written");
        Ok(())
    }

    async fn read_meta(&self, table: &str) -> Result<Option<TableMeta>, StoreError> {
        let path = self.meta_path(table);
        match fs::try_exists(&path).await {
            Ok(false) => Ok(None),
            Ok(true) => Self::read_json(&path).await.map(Some),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    async fn write_meta(&self, table: &str, meta: &TableMeta) -> Result<(), StoreError> {
        let path = self.meta_path(table);
        let bytes = serde_json::to_vec(meta).map_err(|source| StoreError::Encode {
            table: table.to_string(),
            source,
        })?;
        Self::replace(&path, &bytes).await?;
        debug!(table, last_auto_id = meta.last_auto_id, "meta written");
        Ok(())
    }
}
