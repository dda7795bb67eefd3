//! Single-flight generation gate.
//!
//! The [`GenerationCoordinator`] guarantees that at most one generation of
//! a tile is in flight at any instant. A caller that loses the race is told
//! so immediately and never waits.
//!
//! ```text
//! climb A ─► begin(2/2/1) ─► Proceed(permit) ─► ... ─► complete(permit)
//!                                   │                         │
//! climb B ─► begin(2/2/1) ─► AlreadyInFlight        marker released
//! ```
//!
//! Every status change of a tile, generated or uploaded, goes through a
//! begin/complete pair, so the index never shows GENERATING or PENDING
//! without a marker behind it for longer than one upsert.

mod permit;

pub use permit::GenerationPermit;

use crate::compositor::ContentHash;
use crate::coord::TileKey;
use crate::index::{MetadataIndex, TileRecord, TileStatus};
use crate::store::StorageError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use permit::InFlightTable;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome of [`GenerationCoordinator::begin_generation`].
#[derive(Debug)]
pub enum BeginOutcome {
    /// The caller owns the generation and must complete it
    Proceed(GenerationPermit),
    /// Another generation of the same tile is in flight
    AlreadyInFlight,
}

impl BeginOutcome {
    /// Returns true if the caller may proceed.
    pub fn is_proceed(&self) -> bool {
        matches!(self, BeginOutcome::Proceed(_))
    }
}

/// Counters describing coordinator activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Generations that were granted a permit
    pub begun: u64,
    /// Begin requests rejected because the tile was already in flight
    pub duplicates: u64,
    /// Generations completed as READY
    pub completed: u64,
    /// Generations completed as FAILED
    pub failed: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    begun: AtomicU64,
    duplicates: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Per-tile mutual exclusion backed by the metadata index.
pub struct GenerationCoordinator<M> {
    index: Arc<M>,
    in_flight: InFlightTable,
    stats: StatsCounters,
}

impl<M: MetadataIndex> GenerationCoordinator<M> {
    /// Creates a coordinator writing status changes to `index`.
    pub fn new(index: Arc<M>) -> Self {
        Self {
            index,
            in_flight: Arc::new(DashMap::new()),
            stats: StatsCounters::default(),
        }
    }

    /// The index this coordinator writes to.
    pub fn index(&self) -> &Arc<M> {
        &self.index
    }

    /// Claims the generation of `key`.
    ///
    /// On success the record is marked GENERATING, keeping the previous
    /// content hash, and a permit is returned. If the index write fails the
    /// marker is released before the error is returned.
    pub async fn begin_generation(&self, key: TileKey) -> Result<BeginOutcome, StorageError> {
        self.claim(key, TileRecord::generating).await
    }

    /// Claims `key` for an uploaded write.
    ///
    /// Same exclusion as [`begin_generation`](Self::begin_generation), but
    /// the record is marked PENDING. An upload and a generation of the same
    /// tile never overlap.
    pub async fn begin_ingest(&self, key: TileKey) -> Result<BeginOutcome, StorageError> {
        self.claim(key, TileRecord::pending).await
    }

    async fn claim(
        &self,
        key: TileKey,
        mark: fn(TileKey, Option<&TileRecord>) -> TileRecord,
    ) -> Result<BeginOutcome, StorageError> {
        let started = Instant::now();
        match self.in_flight.entry(key) {
            Entry::Occupied(_) => {
                self.stats.duplicates.fetch_add(1, Ordering::Relaxed);
                debug!(tile = %key, "Generation already in flight");
                return Ok(BeginOutcome::AlreadyInFlight);
            }
            Entry::Vacant(entry) => {
                entry.insert(started);
            }
        }

        // From here on the permit owns the marker.
        let permit = GenerationPermit::new(key, started, Arc::clone(&self.in_flight));

        let previous = self.index.get(key).await?;
        let record = mark(key, previous.as_ref());
        let status = record.status;
        self.index.upsert(record).await?;

        self.stats.begun.fetch_add(1, Ordering::Relaxed);
        debug!(
            tile = %key,
            status = ?status,
            in_flight = self.in_flight.len(),
            "Generation started"
        );
        Ok(BeginOutcome::Proceed(permit))
    }

    /// Records the outcome of a generation and releases its marker.
    ///
    /// `Ok(hash)` marks the tile READY with the new fingerprint; `Err(msg)`
    /// marks it FAILED, keeps the previous fingerprint and stores the
    /// message. If the READY write fails, a FAILED record carrying the index
    /// error is attempted before the error is returned. The marker is
    /// released once the index writes are done, whatever their outcome.
    pub async fn complete_generation(
        &self,
        permit: GenerationPermit,
        outcome: Result<ContentHash, String>,
    ) -> Result<TileRecord, StorageError> {
        let key = permit.key();
        let result = match outcome {
            Ok(hash) => {
                let record = TileRecord::ready(key, hash);
                match self.index.upsert(record.clone()).await {
                    Ok(()) => Ok(record),
                    Err(e) => {
                        let failed = self.failed_record(key, e.to_string()).await;
                        if let Err(fallback) = self.index.upsert(failed).await {
                            warn!(tile = %key, error = %fallback, "Failed to record generation failure");
                        }
                        Err(e)
                    }
                }
            }
            Err(error) => {
                let record = self.failed_record(key, error).await;
                self.index.upsert(record.clone()).await.map(|()| record)
            }
        };

        let elapsed = permit.elapsed();
        drop(permit);

        match &result {
            Ok(record) if record.status == TileStatus::Ready => {
                self.stats.completed.fetch_add(1, Ordering::Relaxed);
                debug!(tile = %key, elapsed_ms = elapsed.as_millis() as u64, "Generation completed");
            }
            Ok(record) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    tile = %key,
                    error = record.last_error.as_deref().unwrap_or_default(),
                    "Generation failed"
                );
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!(tile = %key, error = %e, "Generation outcome not recorded");
            }
        }
        result
    }

    /// FAILED record for `key`, keeping the previous hash when it can be read.
    async fn failed_record(&self, key: TileKey, error: String) -> TileRecord {
        let previous = match self.index.get(key).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!(tile = %key, error = %e, "Previous record unreadable, dropping its hash");
                None
            }
        };
        TileRecord::failed(key, previous.as_ref(), error)
    }

    /// Number of tiles currently being generated.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns true if a generation of `key` is in flight.
    pub fn is_in_flight(&self, key: &TileKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Snapshot of the activity counters.
    pub fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            begun: self.stats.begun.load(Ordering::Relaxed),
            duplicates: self.stats.duplicates.load(Ordering::Relaxed),
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        }
    }
}
