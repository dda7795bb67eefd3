//! Climb outcome types.

use crate::coord::TileKey;
use crate::index::TileRecord;
use std::fmt;

/// Why a climb stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClimbStop {
    /// Every ancestor up to zoom 0 was regenerated
    ReachedRoot,
    /// Another climb was already generating this ancestor
    AlreadyInFlight(TileKey),
    /// Generating this ancestor failed; nothing above it was touched
    Failed { key: TileKey, error: String },
}

impl fmt::Display for ClimbStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClimbStop::ReachedRoot => write!(f, "reached root"),
            ClimbStop::AlreadyInFlight(key) => write!(f, "superseded at {}", key),
            ClimbStop::Failed { key, error } => write!(f, "failed at {}: {}", key, error),
        }
    }
}

/// Summary of one climb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimbReport {
    /// Key the climb started from
    pub trigger: TileKey,
    /// Ancestors regenerated, lowest zoom last
    pub generated: Vec<TileKey>,
    /// Terminal condition
    pub stop: ClimbStop,
}

impl ClimbReport {
    /// Returns true if the climb regenerated every ancestor.
    pub fn reached_root(&self) -> bool {
        self.stop == ClimbStop::ReachedRoot
    }
}

/// Result of one level of a climb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelOutcome {
    /// The tile was regenerated and is now READY
    Generated(TileRecord),
    /// Another climb holds the tile
    AlreadyInFlight,
}

/// Counters describing orchestrator activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    /// Climbs started, foreground or background
    pub climbs_started: u64,
    /// Levels regenerated successfully
    pub levels_generated: u64,
    /// Levels that ended FAILED
    pub levels_failed: u64,
    /// Climbs that stopped because another climb held an ancestor
    pub climbs_superseded: u64,
}
