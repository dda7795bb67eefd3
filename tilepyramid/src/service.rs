//! High-level facade wiring the pyramid from configuration.
//!
//! ```ignore
//! use tilepyramid::config::ConfigFile;
//! use tilepyramid::service::PyramidService;
//!
//! let config = ConfigFile::load()?;
//! let service = PyramidService::open(&config).await?;
//!
//! let receipt = service.ingest(key, upload).await?;
//! service.wait_idle().await;
//! ```

use crate::compositor::TileCompositor;
use crate::config::{ConfigFile, PyramidSettings};
use crate::coord::TileKey;
use crate::error::PyramidError;
use crate::index::{FileIndex, MetadataIndex, TileRecord};
use crate::ingest::{IngestReceipt, TileIngestor};
use crate::orchestrator::{ClimbReport, OrchestratorStats, PyramidOrchestrator};
use crate::store::{DiskTileStore, TileStore};
use std::sync::Arc;
use tracing::info;

/// Service persisting tiles and metadata under the configured directory.
pub type DiskPyramidService = PyramidService<DiskTileStore, FileIndex>;

/// Tile pyramid with ingestion, regeneration and status queries.
pub struct PyramidService<S, M> {
    orchestrator: PyramidOrchestrator<S, M>,
    ingestor: TileIngestor<S, M>,
}

impl PyramidService<DiskTileStore, FileIndex> {
    /// Opens the disk store and file index under `config.storage.directory`.
    pub async fn open(config: &ConfigFile) -> Result<Self, PyramidError> {
        let root = &config.storage.directory;
        let store = DiskTileStore::open(root).await?;
        let index = FileIndex::open(root).await?;

        info!(
            directory = %root.display(),
            tile_size = config.pyramid.tile_size,
            quality = config.pyramid.quality,
            "Tile pyramid opened"
        );

        Ok(Self::new(Arc::new(store), Arc::new(index), &config.pyramid))
    }
}

impl<S: TileStore, M: MetadataIndex> PyramidService<S, M> {
    /// Wires a service over existing collaborators.
    pub fn new(store: Arc<S>, index: Arc<M>, settings: &PyramidSettings) -> Self {
        let orchestrator = PyramidOrchestrator::new(store, index, TileCompositor::from(settings));
        let ingestor = TileIngestor::new(orchestrator.clone());
        Self {
            orchestrator,
            ingestor,
        }
    }

    /// The orchestrator driving climbs.
    pub fn orchestrator(&self) -> &PyramidOrchestrator<S, M> {
        &self.orchestrator
    }

    /// Ingests a raw image as leaf `key` and triggers its climb.
    pub async fn ingest(&self, key: TileKey, raw: Vec<u8>) -> Result<IngestReceipt, PyramidError> {
        self.ingestor.ingest(key, raw).await
    }

    /// Runs a climb starting at `key` and waits for it.
    pub async fn regenerate(&self, key: TileKey) -> Result<ClimbReport, PyramidError> {
        key.validate()?;
        Ok(self.orchestrator.climb(key).await)
    }

    /// Record of `key`, if the tile was ever written.
    pub async fn status(&self, key: TileKey) -> Result<Option<TileRecord>, PyramidError> {
        key.validate()?;
        Ok(self.orchestrator.index().get(key).await?)
    }

    /// Records of `key` and each of its ancestors, root last.
    pub async fn lineage(&self, key: TileKey) -> Result<Vec<(TileKey, Option<TileRecord>)>, PyramidError> {
        key.validate()?;
        let index = self.orchestrator.index();

        let mut lineage = Vec::with_capacity(usize::from(key.zoom) + 1);
        for tile in std::iter::once(key).chain(key.ancestors()) {
            lineage.push((tile, index.get(tile).await?));
        }
        Ok(lineage)
    }

    /// All records in key order.
    pub async fn records(&self) -> Result<Vec<TileRecord>, PyramidError> {
        Ok(self.orchestrator.index().list().await?)
    }

    /// Waits for every background climb to finish.
    pub async fn wait_idle(&self) {
        self.orchestrator.wait_idle().await;
    }

    /// Orchestrator activity counters.
    pub fn stats(&self) -> OrchestratorStats {
        self.orchestrator.stats()
    }
}
