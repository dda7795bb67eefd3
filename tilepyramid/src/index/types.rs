//! Metadata record types.

use crate::compositor::ContentHash;
use crate::coord::TileKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generation status of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileStatus {
    /// Accepted but content not yet written
    Pending,
    /// A generation for this tile is in flight
    Generating,
    /// Content is current as of `updated_at`
    Ready,
    /// The last generation failed; the next trigger retries it
    Failed,
}

impl TileStatus {
    /// Upper-case name as stored in the index.
    pub fn as_str(&self) -> &'static str {
        match self {
            TileStatus::Pending => "PENDING",
            TileStatus::Generating => "GENERATING",
            TileStatus::Ready => "READY",
            TileStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata kept for one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Tile this record describes
    pub key: TileKey,
    /// Current generation status
    pub status: TileStatus,
    /// Fingerprint of the stored bytes, if content was ever written
    pub content_hash: Option<ContentHash>,
    /// Time of the last status change
    pub updated_at: DateTime<Utc>,
    /// Message of the last failure, cleared once the tile is ready again
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl TileRecord {
    /// Record for content that has just been written.
    pub fn ready(key: TileKey, content_hash: ContentHash) -> Self {
        Self {
            key,
            status: TileStatus::Ready,
            content_hash: Some(content_hash),
            updated_at: Utc::now(),
            last_error: None,
        }
    }

    /// Record for an accepted tile whose content is not yet written.
    pub fn pending(key: TileKey, previous: Option<&TileRecord>) -> Self {
        Self {
            key,
            status: TileStatus::Pending,
            content_hash: previous.and_then(|r| r.content_hash.clone()),
            updated_at: Utc::now(),
            last_error: None,
        }
    }

    /// Record for a tile whose generation has started.
    ///
    /// The previous fingerprint is kept; the old content stays readable
    /// until the new content replaces it.
    pub fn generating(key: TileKey, previous: Option<&TileRecord>) -> Self {
        Self {
            key,
            status: TileStatus::Generating,
            content_hash: previous.and_then(|r| r.content_hash.clone()),
            updated_at: Utc::now(),
            last_error: previous.and_then(|r| r.last_error.clone()),
        }
    }

    /// Record for a tile whose generation failed.
    pub fn failed(key: TileKey, previous: Option<&TileRecord>, error: impl Into<String>) -> Self {
        Self {
            key,
            status: TileStatus::Failed,
            content_hash: previous.and_then(|r| r.content_hash.clone()),
            updated_at: Utc::now(),
            last_error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> TileKey {
        TileKey { zoom: 2, x: 2, y: 1 }
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&TileStatus::Generating).unwrap();
        assert_eq!(json, "\"GENERATING\"");

        let status: TileStatus = serde_json::from_str("\"FAILED\"").unwrap();
        assert_eq!(status, TileStatus::Failed);
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in [
            TileStatus::Pending,
            TileStatus::Generating,
            TileStatus::Ready,
            TileStatus::Failed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json.trim_matches('"'), status.to_string());
        }
    }

    #[test]
    fn test_generating_keeps_previous_hash() {
        let ready = TileRecord::ready(key(), ContentHash::of(b"old"));
        let generating = TileRecord::generating(key(), Some(&ready));

        assert_eq!(generating.status, TileStatus::Generating);
        assert_eq!(generating.content_hash, ready.content_hash);
    }

    #[test]
    fn test_failed_records_error() {
        let failed = TileRecord::failed(key(), None, "decode error");

        assert_eq!(failed.status, TileStatus::Failed);
        assert_eq!(failed.content_hash, None);
        assert_eq!(failed.last_error.as_deref(), Some("decode error"));
    }

    #[test]
    fn test_ready_clears_error() {
        let record = TileRecord::ready(key(), ContentHash::of(b"new"));
        assert!(record.last_error.is_none());
        assert_eq!(record.status, TileStatus::Ready);
    }
}
