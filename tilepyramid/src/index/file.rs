//! JSON-file metadata index.

use crate::coord::TileKey;
use crate::index::{MetadataIndex, TileRecord};
use crate::store::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Name of the index document inside the root directory.
pub const INDEX_FILE_NAME: &str = "tiles.json";

/// Current document layout version.
const INDEX_VERSION: u32 = 1;

/// On-disk document layout.
#[derive(Debug, Serialize, Deserialize)]
struct IndexDocument {
    version: u32,
    tiles: Vec<TileRecord>,
}

/// Metadata index persisted as a single JSON document.
///
/// The whole document is loaded on open and rewritten on each upsert.
/// Writes are serialized by an async mutex and land through a temporary
/// file plus rename, so a crash never leaves a truncated index behind.
#[derive(Debug)]
pub struct FileIndex {
    path: PathBuf,
    records: Mutex<BTreeMap<TileKey, TileRecord>>,
}

impl FileIndex {
    /// Opens (or creates) the index stored under `root`.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .await
            .map_err(|e| StorageError::io(root, e))?;

        let path = root.join(INDEX_FILE_NAME);
        let records = match fs::read(&path).await {
            Ok(bytes) => {
                let document: IndexDocument = serde_json::from_slice(&bytes)?;
                if document.version != INDEX_VERSION {
                    return Err(StorageError::Serialization(format!(
                        "unsupported index version {} in {}",
                        document.version,
                        path.display()
                    )));
                }
                document
                    .tiles
                    .into_iter()
                    .map(|record| (record.key, record))
                    .collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError::io(path, e)),
        };

        info!(
            path = %path.display(),
            records = records.len(),
            "Metadata index opened"
        );

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Path of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &BTreeMap<TileKey, TileRecord>) -> Result<(), StorageError> {
        let document = IndexDocument {
            version: INDEX_VERSION,
            tiles: records.values().cloned().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, &bytes)
            .await
            .map_err(|e| StorageError::io(&temp, e))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        debug!(path = %self.path.display(), records = records.len(), "Metadata index persisted");
        Ok(())
    }
}

impl MetadataIndex for FileIndex {
    async fn upsert(&self, record: TileRecord) -> Result<(), StorageError> {
        let mut records = self.records.lock().await;
        let key = record.key;
        let previous = records.insert(key, record);

        if let Err(e) = self.persist(&records).await {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(previous) => records.insert(key, previous),
                None => records.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, key: TileKey) -> Result<Option<TileRecord>, StorageError> {
        Ok(self.records.lock().await.get(&key).cloned())
    }

    async fn list(&self) -> Result<Vec<TileRecord>, StorageError> {
        Ok(self.records.lock().await.values().cloned().collect())
    }
}
