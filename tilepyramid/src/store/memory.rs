//! In-memory tile store.

use crate::coord::TileKey;
use crate::store::{StorageError, TileStore};
use dashmap::DashMap;
use std::sync::Arc;

/// Tile store backed by a concurrent hash map.
///
/// Values are reference counted so reads do not hold a shard lock while
/// the caller copies the bytes out.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    tiles: DashMap<TileKey, Arc<Vec<u8>>>,
}

impl MemoryTileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if no tile has been stored.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Returns true if `key` has content.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }
}

impl TileStore for MemoryTileStore {
    async fn get(&self, key: TileKey) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.tiles.get(&key).map(|entry| Arc::clone(entry.value()));
        Ok(data.map(|bytes| (*bytes).clone()))
    }

    async fn put(&self, key: TileKey, data: Vec<u8>) -> Result<(), StorageError> {
        self.tiles.insert(key, Arc::new(data));
        Ok(())
    }
}
