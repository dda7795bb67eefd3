//! Crate-level error type.

use crate::compositor::CompositeError;
use crate::coord::{CoordError, TileKey};
use crate::store::StorageError;
use thiserror::Error;

/// Errors surfaced by pyramid operations.
#[derive(Debug, Error)]
pub enum PyramidError {
    /// A tile key is outside the pyramid, or the root was asked for a parent
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordError),

    /// An upload targets a tile whose generation or upload is in flight
    #[error("Tile {0} is being written, retry later")]
    TileBusy(TileKey),

    /// Uploaded bytes are not a decodable image
    #[error("Failed to decode tile image: {0}")]
    TileDecode(#[source] image::ImageError),

    /// Building a parent tile failed
    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// Tile store or metadata index failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A blocking worker panicked or was cancelled
    #[error("Background worker failed: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for PyramidError {
    fn from(err: tokio::task::JoinError) -> Self {
        PyramidError::Worker(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_error_is_transparent() {
        let err = PyramidError::from(CoordError::InvalidCoordinate(TileKey { zoom: 0, x: 0, y: 0 }));
        assert_eq!(
            err.to_string(),
            CoordError::InvalidCoordinate(TileKey { zoom: 0, x: 0, y: 0 }).to_string()
        );
    }

    #[test]
    fn test_storage_error_converts() {
        let err: PyramidError = StorageError::Unavailable("offline".to_string()).into();
        assert!(matches!(err, PyramidError::Storage(_)));
    }

    #[test]
    fn test_busy_error_names_tile() {
        let err = PyramidError::TileBusy(TileKey { zoom: 2, x: 2, y: 1 });
        assert_eq!(err.to_string(), "Tile 2/2/1 is being written, retry later");
    }
}
