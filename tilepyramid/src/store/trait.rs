//! Tile store trait definition for dependency injection.

use crate::coord::TileKey;
use crate::store::StorageError;
use std::future::Future;

/// Content store for encoded tiles.
///
/// Enables different backends (memory, disk) to be used interchangeably
/// by the orchestrator and the ingestor. Both operations may suspend.
///
/// No ordering guarantee exists across keys; a concurrent reader may
/// observe either the old or the new bytes of a key being replaced.
pub trait TileStore: Send + Sync + 'static {
    /// Gets the current bytes for `key`, or `None` if the tile does not exist.
    fn get(
        &self,
        key: TileKey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    /// Replaces the bytes for `key`.
    fn put(
        &self,
        key: TileKey,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
