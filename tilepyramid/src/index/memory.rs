//! In-memory metadata index.

use crate::coord::TileKey;
use crate::index::{MetadataIndex, TileRecord};
use crate::store::StorageError;
use dashmap::DashMap;

/// Metadata index backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    records: DashMap<TileKey, TileRecord>,
}

impl MemoryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record exists.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MetadataIndex for MemoryIndex {
    async fn upsert(&self, record: TileRecord) -> Result<(), StorageError> {
        self.records.insert(record.key, record);
        Ok(())
    }

    async fn get(&self, key: TileKey) -> Result<Option<TileRecord>, StorageError> {
        Ok(self.records.get(&key).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<TileRecord>, StorageError> {
        let mut records: Vec<TileRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.key);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::ContentHash;
    use crate::index::TileStatus;

    #[tokio::test]
    async fn test_upsert_and_get() {
        let index = MemoryIndex::new();
        let key = TileKey { zoom: 1, x: 1, y: 0 };

        assert_eq!(index.get(key).await.unwrap(), None);

        index
            .upsert(TileRecord::ready(key, ContentHash::of(b"tile")))
            .await
            .unwrap();

        let record = index.get(key).await.unwrap().unwrap();
        assert_eq!(record.status, TileStatus::Ready);
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let index = MemoryIndex::new();
        let key = TileKey { zoom: 1, x: 1, y: 0 };

        index
            .upsert(TileRecord::ready(key, ContentHash::of(b"a")))
            .await
            .unwrap();
        index
            .upsert(TileRecord::failed(key, None, "boom"))
            .await
            .unwrap();

        let record = index.get(key).await.unwrap().unwrap();
        assert_eq!(record.status, TileStatus::Failed);
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let index = MemoryIndex::new();
        for key in [
            TileKey { zoom: 2, x: 0, y: 0 },
            TileKey { zoom: 0, x: 0, y: 0 },
            TileKey { zoom: 1, x: 1, y: 1 },
        ] {
            index
                .upsert(TileRecord::ready(key, ContentHash::of(b"x")))
                .await
                .unwrap();
        }

        let zooms: Vec<u8> = index
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.key.zoom)
            .collect();
        assert_eq!(zooms, vec![0, 1, 2]);
    }
}
