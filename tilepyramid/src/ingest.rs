//! Leaf tile ingestion.
//!
//! Accepts a raw uploaded image for a leaf key, normalises it to the
//! canonical encoding, stores it and launches the climb above it. The
//! climb runs in the background; its outcome never affects the result of
//! the ingest call.

use crate::compositor::ContentHash;
use crate::coord::TileKey;
use crate::coordinator::BeginOutcome;
use crate::error::PyramidError;
use crate::index::MetadataIndex;
use crate::orchestrator::{ClimbReport, PyramidOrchestrator};
use crate::store::TileStore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Proof that a leaf tile was accepted.
#[derive(Debug)]
pub struct IngestReceipt {
    /// Ingested tile
    pub key: TileKey,
    /// Fingerprint of the stored canonical bytes
    pub hash: ContentHash,
    /// Handle of the background climb; may be dropped
    pub climb: JoinHandle<ClimbReport>,
}

/// Writes leaf tiles and triggers their climbs.
pub struct TileIngestor<S, M> {
    orchestrator: PyramidOrchestrator<S, M>,
}

impl<S, M> Clone for TileIngestor<S, M> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
        }
    }
}

impl<S: TileStore, M: MetadataIndex> TileIngestor<S, M> {
    /// Creates an ingestor sharing `orchestrator`'s store, index and codec.
    pub fn new(orchestrator: PyramidOrchestrator<S, M>) -> Self {
        Self { orchestrator }
    }

    /// Ingests `raw` as the content of `key`.
    ///
    /// The key is claimed through the coordinator like any generation, so
    /// an upload never interleaves with a climb writing the same tile; a
    /// busy key returns [`PyramidError::TileBusy`] without touching the
    /// store or the index. The record goes PENDING while the image is
    /// normalised and written, then READY. An undecodable upload or a
    /// failed write marks the record FAILED; no climb is triggered.
    pub async fn ingest(&self, key: TileKey, raw: Vec<u8>) -> Result<IngestReceipt, PyramidError> {
        key.validate()?;

        let coordinator = self.orchestrator.coordinator();
        let permit = match coordinator.begin_ingest(key).await? {
            BeginOutcome::Proceed(permit) => permit,
            BeginOutcome::AlreadyInFlight => {
                warn!(tile = %key, "Upload refused, tile is being written");
                return Err(PyramidError::TileBusy(key));
            }
        };

        let codec = *self.orchestrator.compositor().codec();
        let raw_len = raw.len();
        let normalized = tokio::task::spawn_blocking(move || codec.normalize(&raw)).await?;

        let data = match normalized {
            Ok(data) => data,
            Err(e) => {
                warn!(tile = %key, bytes = raw_len, error = %e, "Rejected undecodable upload");
                if let Err(index_err) = coordinator.complete_generation(permit, Err(e.to_string())).await {
                    warn!(tile = %key, error = %index_err, "Failed to record upload failure");
                }
                return Err(PyramidError::TileDecode(e));
            }
        };

        let hash = ContentHash::of(&data);
        if let Err(e) = self.orchestrator.store().put(key, data).await {
            if let Err(index_err) = coordinator.complete_generation(permit, Err(e.to_string())).await {
                warn!(tile = %key, error = %index_err, "Failed to record upload failure");
            }
            return Err(e.into());
        }
        coordinator.complete_generation(permit, Ok(hash.clone())).await?;

        info!(tile = %key, hash = %hash, "Leaf tile ingested");

        let climb = self.orchestrator.trigger(key);
        Ok(IngestReceipt { key, hash, climb })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{TileCodec, TileCompositor};
    use crate::coord::CoordError;
    use crate::index::{MemoryIndex, TileStatus};
    use crate::store::MemoryTileStore;
    use image::{Rgb, RgbImage};
    use std::sync::Arc;

    fn ingestor() -> TileIngestor<MemoryTileStore, MemoryIndex> {
        TileIngestor::new(PyramidOrchestrator::new(
            Arc::new(MemoryTileStore::new()),
            Arc::new(MemoryIndex::new()),
            TileCompositor::new(TileCodec::new(32, 90), Rgb([0, 0, 0])),
        ))
    }

    fn png_upload(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([30, 60, 90]));
        let mut buffer = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[tokio::test]
    async fn test_ingest_stores_canonical_leaf() {
        let ingestor = ingestor();
        let key = TileKey::new(3, 5, 2).unwrap();

        let receipt = ingestor.ingest(key, png_upload(100, 80)).await.unwrap();
        let report = receipt.climb.await.unwrap();

        let orchestrator = &ingestor.orchestrator;
        let stored = orchestrator.store().get(key).await.unwrap().unwrap();
        assert_eq!(receipt.hash, ContentHash::of(&stored));
        assert_eq!(TileCodec::new(32, 90).decode(&stored).unwrap().dimensions(), (32, 32));

        let record = orchestrator.index().get(key).await.unwrap().unwrap();
        assert_eq!(record.status, TileStatus::Ready);
        assert!(report.reached_root());
    }

    #[tokio::test]
    async fn test_ingest_rejects_out_of_range_key() {
        let ingestor = ingestor();

        let err = ingestor
            .ingest(TileKey { zoom: 1, x: 2, y: 0 }, png_upload(8, 8))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PyramidError::InvalidCoordinate(CoordError::OutOfRange(_))
        ));
        assert!(ingestor.orchestrator.index().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_upload_marks_leaf_failed() {
        let ingestor = ingestor();
        let key = TileKey::new(2, 1, 1).unwrap();

        let err = ingestor.ingest(key, b"not an image".to_vec()).await.unwrap_err();

        assert!(matches!(err, PyramidError::TileDecode(_)));
        let record = ingestor.orchestrator.index().get(key).await.unwrap().unwrap();
        assert_eq!(record.status, TileStatus::Failed);
        assert!(!ingestor.orchestrator.store().contains(&key));
        assert_eq!(ingestor.orchestrator.stats().climbs_started, 0);
    }

    #[tokio::test]
    async fn test_upload_to_tile_in_generation_is_refused() {
        let ingestor = ingestor();
        let orchestrator = &ingestor.orchestrator;
        let key = TileKey::new(2, 2, 1).unwrap();
        let composite = TileCodec::new(32, 90)
            .encode(&RgbImage::from_pixel(32, 32, Rgb([200, 10, 10])))
            .unwrap();

        let permit = match orchestrator.coordinator().begin_generation(key).await.unwrap() {
            BeginOutcome::Proceed(permit) => permit,
            BeginOutcome::AlreadyInFlight => panic!("tile should be free"),
        };
        orchestrator.store().put(key, composite.clone()).await.unwrap();

        let err = ingestor.ingest(key, png_upload(64, 64)).await.unwrap_err();

        assert!(matches!(err, PyramidError::TileBusy(busy) if busy == key));
        let record = orchestrator.index().get(key).await.unwrap().unwrap();
        assert_eq!(record.status, TileStatus::Generating);
        assert_eq!(orchestrator.store().get(key).await.unwrap(), Some(composite.clone()));

        orchestrator
            .coordinator()
            .complete_generation(permit, Ok(ContentHash::of(&composite)))
            .await
            .unwrap();

        let record = orchestrator.index().get(key).await.unwrap().unwrap();
        let stored = orchestrator.store().get(key).await.unwrap().unwrap();
        assert_eq!(record.status, TileStatus::Ready);
        assert_eq!(record.content_hash, Some(ContentHash::of(&stored)));
        assert_eq!(orchestrator.stats().climbs_started, 0);
    }

    #[tokio::test]
    async fn test_ingest_releases_claim() {
        let ingestor = ingestor();
        let key = TileKey::new(1, 0, 1).unwrap();

        let receipt = ingestor.ingest(key, png_upload(32, 32)).await.unwrap();
        receipt.climb.await.unwrap();

        let coordinator = ingestor.orchestrator.coordinator();
        assert_eq!(coordinator.in_flight_count(), 0);
        assert_eq!(coordinator.stats().completed, 2);
        assert!(ingestor.ingest(key, png_upload(32, 32)).await.is_ok());
    }
}
