//! Upward regeneration from a leaf to the root.
//!
//! A climb walks the ancestors of a trigger tile one level at a time:
//!
//! ```text
//! 3/5/2 ──► 2/2/1 ──► 1/1/0 ──► 0/0/0
//!  leaf     begin → fetch children → composite → put → complete
//! ```
//!
//! A level that loses the single-flight race stops the climb; the climb
//! holding that tile covers everything above it. A level that fails is
//! marked FAILED and stops the climb, so nothing is built on top of it.
//!
//! Climbs started with [`PyramidOrchestrator::trigger`] run detached on a
//! task tracker. Their errors go to the log and never reach the caller.

mod report;

pub use report::{ClimbReport, ClimbStop, LevelOutcome, OrchestratorStats};

use crate::compositor::{ChildTiles, ContentHash, TileCompositor};
use crate::coord::TileKey;
use crate::coordinator::{BeginOutcome, GenerationCoordinator};
use crate::error::PyramidError;
use crate::index::MetadataIndex;
use crate::store::TileStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Default)]
struct StatsCounters {
    climbs_started: AtomicU64,
    levels_generated: AtomicU64,
    levels_failed: AtomicU64,
    climbs_superseded: AtomicU64,
}

struct Inner<S, M> {
    store: Arc<S>,
    coordinator: GenerationCoordinator<M>,
    compositor: TileCompositor,
    tracker: TaskTracker,
    // Serializes close/wait/reopen of the tracker.
    idle: Mutex<()>,
    stats: StatsCounters,
}

/// Drives climbs over a tile store and metadata index.
///
/// Cloning is cheap; clones share the coordinator, so single-flight holds
/// across all of them.
pub struct PyramidOrchestrator<S, M> {
    inner: Arc<Inner<S, M>>,
}

impl<S, M> Clone for PyramidOrchestrator<S, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: TileStore, M: MetadataIndex> PyramidOrchestrator<S, M> {
    /// Creates an orchestrator.
    pub fn new(store: Arc<S>, index: Arc<M>, compositor: TileCompositor) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                coordinator: GenerationCoordinator::new(index),
                compositor,
                tracker: TaskTracker::new(),
                idle: Mutex::new(()),
                stats: StatsCounters::default(),
            }),
        }
    }

    /// The tile store climbs read from and write to.
    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    /// The metadata index.
    pub fn index(&self) -> &Arc<M> {
        self.inner.coordinator.index()
    }

    /// The single-flight gate shared by all climbs.
    pub fn coordinator(&self) -> &GenerationCoordinator<M> {
        &self.inner.coordinator
    }

    /// The compositor used for every level.
    pub fn compositor(&self) -> &TileCompositor {
        &self.inner.compositor
    }

    /// Regenerates every ancestor of `trigger`, lowest first.
    ///
    /// Performs at most `trigger.zoom` levels. A trigger at zoom 0 has no
    /// ancestors and reports [`ClimbStop::ReachedRoot`] immediately.
    #[instrument(skip_all, fields(trigger = %trigger))]
    pub async fn climb(&self, trigger: TileKey) -> ClimbReport {
        self.inner.stats.climbs_started.fetch_add(1, Ordering::Relaxed);

        let mut generated = Vec::with_capacity(usize::from(trigger.zoom));
        let mut current = trigger;

        let stop = loop {
            if current.zoom == 0 {
                break ClimbStop::ReachedRoot;
            }

            let parent = match current.parent() {
                Ok(parent) => parent,
                Err(e) => {
                    break ClimbStop::Failed {
                        key: current,
                        error: e.to_string(),
                    }
                }
            };

            match self.regenerate_level(parent).await {
                Ok(LevelOutcome::Generated(_)) => {
                    generated.push(parent);
                    current = parent;
                }
                Ok(LevelOutcome::AlreadyInFlight) => {
                    self.inner
                        .stats
                        .climbs_superseded
                        .fetch_add(1, Ordering::Relaxed);
                    break ClimbStop::AlreadyInFlight(parent);
                }
                Err(e) => {
                    break ClimbStop::Failed {
                        key: parent,
                        error: e.to_string(),
                    }
                }
            }
        };

        match &stop {
            ClimbStop::ReachedRoot => {
                info!(levels = generated.len(), "Climb reached root");
            }
            ClimbStop::AlreadyInFlight(key) => {
                debug!(tile = %key, levels = generated.len(), "Climb superseded");
            }
            ClimbStop::Failed { key, error } => {
                error!(tile = %key, levels = generated.len(), error = %error, "Climb failed");
            }
        }

        ClimbReport {
            trigger,
            generated,
            stop,
        }
    }

    /// Regenerates one tile from its current children.
    ///
    /// Returns [`LevelOutcome::AlreadyInFlight`] without touching the tile
    /// if another climb holds it. On any failure after the tile was
    /// claimed, including a failed READY write, the tile is marked FAILED
    /// before the error is returned.
    pub async fn regenerate_level(&self, parent: TileKey) -> Result<LevelOutcome, PyramidError> {
        let coordinator = &self.inner.coordinator;

        let permit = match coordinator.begin_generation(parent).await? {
            BeginOutcome::Proceed(permit) => permit,
            BeginOutcome::AlreadyInFlight => return Ok(LevelOutcome::AlreadyInFlight),
        };

        match self.build_level(parent).await {
            Ok(hash) => match coordinator.complete_generation(permit, Ok(hash)).await {
                Ok(record) => {
                    self.inner
                        .stats
                        .levels_generated
                        .fetch_add(1, Ordering::Relaxed);
                    debug!(tile = %parent, hash = ?record.content_hash, "Level generated");
                    Ok(LevelOutcome::Generated(record))
                }
                Err(e) => {
                    self.inner.stats.levels_failed.fetch_add(1, Ordering::Relaxed);
                    Err(e.into())
                }
            },
            Err(e) => {
                self.inner.stats.levels_failed.fetch_add(1, Ordering::Relaxed);
                if let Err(index_err) = coordinator.complete_generation(permit, Err(e.to_string())).await {
                    warn!(tile = %parent, error = %index_err, "Failed to record generation failure");
                }
                Err(e)
            }
        }
    }

    /// Fetches the children, composites on the blocking pool and persists.
    async fn build_level(&self, parent: TileKey) -> Result<ContentHash, PyramidError> {
        let store = &self.inner.store;
        let [top_left, top_right, bottom_left, bottom_right] = parent.children();

        let (a, b, c, d) = futures::try_join!(
            store.get(top_left),
            store.get(top_right),
            store.get(bottom_left),
            store.get(bottom_right),
        )?;
        let children: ChildTiles = [a, b, c, d];

        let present = children.iter().filter(|c| c.is_some()).count();
        if present == 0 {
            debug!(tile = %parent, "No children present, compositing blank tile");
        }

        let compositor = self.inner.compositor.clone();
        let tile =
            tokio::task::spawn_blocking(move || compositor.composite(parent, &children)).await??;

        store.put(parent, tile.data).await?;
        debug!(tile = %parent, children = present, "Composite persisted");
        Ok(tile.hash)
    }

    /// Launches a climb from `trigger` as a detached background task.
    ///
    /// The returned handle may be awaited or dropped; dropping it does not
    /// cancel the climb. Must be called from within a Tokio runtime.
    pub fn trigger(&self, trigger: TileKey) -> JoinHandle<ClimbReport> {
        let this = self.clone();
        debug!(tile = %trigger, "Climb triggered");
        self.inner
            .tracker
            .spawn(async move { this.climb(trigger).await })
    }

    /// Waits until every triggered climb has finished.
    ///
    /// Climbs triggered while waiting are waited for as well. Concurrent
    /// callers are served one at a time, so the tracker is never reopened
    /// under another caller's wait.
    pub async fn wait_idle(&self) {
        let _idle = self.inner.idle.lock().await;
        let tracker = &self.inner.tracker;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();
    }

    /// Number of triggered climbs still running.
    pub fn active_climbs(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Snapshot of the activity counters.
    pub fn stats(&self) -> OrchestratorStats {
        let stats = &self.inner.stats;
        OrchestratorStats {
            climbs_started: stats.climbs_started.load(Ordering::Relaxed),
            levels_generated: stats.levels_generated.load(Ordering::Relaxed),
            levels_failed: stats.levels_failed.load(Ordering::Relaxed),
            climbs_superseded: stats.climbs_superseded.load(Ordering::Relaxed),
        }
    }
}
