//! In-flight marker guard.

use crate::coord::TileKey;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Shared table of tiles with a generation in flight.
pub(super) type InFlightTable = Arc<DashMap<TileKey, Instant>>;

/// Exclusive right to generate one tile.
///
/// Holding a permit means this caller owns the in-flight marker for
/// [`key`](Self::key). The marker is removed when the permit is dropped,
/// whichever way the generation ends.
#[derive(Debug)]
#[must_use = "dropping the permit releases the in-flight marker"]
pub struct GenerationPermit {
    key: TileKey,
    started: Instant,
    in_flight: InFlightTable,
}

impl GenerationPermit {
    pub(super) fn new(key: TileKey, started: Instant, in_flight: InFlightTable) -> Self {
        Self {
            key,
            started,
            in_flight,
        }
    }

    /// Tile this permit covers.
    pub fn key(&self) -> TileKey {
        self.key
    }

    /// Time since the marker was claimed.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
        trace!(tile = %self.key, "In-flight marker released");
    }
}
