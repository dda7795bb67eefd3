//! Storage error type shared by tile stores and metadata indexes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the tile store or the metadata index.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem I/O failed
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted document could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(String),

    /// The backend refused the operation
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_display_includes_path() {
        let err = StorageError::io(
            "/tiles/3/5/2.jpg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tiles/3/5/2.jpg"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_serialization_from_json() {
        let json_err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
