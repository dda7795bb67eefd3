//! Metadata index trait definition.

use crate::coord::TileKey;
use crate::index::TileRecord;
use crate::store::StorageError;
use std::future::Future;

/// Key → record store for tile metadata.
///
/// Last writer wins per key. Only the ingestion path and the generation
/// coordinator write records.
pub trait MetadataIndex: Send + Sync + 'static {
    /// Inserts or replaces the record for `record.key`.
    fn upsert(&self, record: TileRecord) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Gets the record for `key`, or `None` if the tile was never recorded.
    fn get(
        &self,
        key: TileKey,
    ) -> impl Future<Output = Result<Option<TileRecord>, StorageError>> + Send;

    /// Lists every record, ordered by key.
    fn list(&self) -> impl Future<Output = Result<Vec<TileRecord>, StorageError>> + Send;
}
