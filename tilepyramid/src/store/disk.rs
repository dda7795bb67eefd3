//! Disk-backed tile store.

use crate::coord::TileKey;
use crate::store::{StorageError, TileStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::trace;

/// File extension of stored tiles.
const TILE_EXTENSION: &str = "jpg";

/// Construct the path of a stored tile.
///
/// Creates a hierarchical path structure:
/// ```text
/// <root>/<zoom>/<x>/<y>.jpg
/// ```
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use tilepyramid::coord::TileKey;
/// use tilepyramid::store::tile_path;
///
/// let key = TileKey { zoom: 3, x: 5, y: 2 };
/// assert_eq!(tile_path(&PathBuf::from("/tiles"), &key), PathBuf::from("/tiles/3/5/2.jpg"));
/// ```
pub fn tile_path(root: &Path, key: &TileKey) -> PathBuf {
    root.join(key.zoom.to_string())
        .join(key.x.to_string())
        .join(format!("{}.{}", key.y, TILE_EXTENSION))
}

/// Tile store writing one file per tile.
///
/// Writes land in a temporary sibling file which is then renamed over the
/// target, so readers see either the previous or the new tile, never a
/// partially written one.
#[derive(Debug)]
pub struct DiskTileStore {
    root: PathBuf,
    write_seq: AtomicU64,
}

impl DiskTileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::io(&root, e))?;

        Ok(Self {
            root,
            write_seq: AtomicU64::new(0),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".tmp-{}-{}", std::process::id(), seq));
        path.with_file_name(name)
    }
}

impl TileStore for DiskTileStore {
    async fn get(&self, key: TileKey) -> Result<Option<Vec<u8>>, StorageError> {
        let path = tile_path(&self.root, &key);
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    async fn put(&self, key: TileKey, data: Vec<u8>) -> Result<(), StorageError> {
        let path = tile_path(&self.root, &key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let temp = self.temp_path(&path);
        if let Err(e) = fs::write(&temp, &data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io(temp, e));
        }
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io(path, e));
        }

        trace!(tile = %key, bytes = data.len(), "Tile written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key() -> TileKey {
        TileKey { zoom: 3, x: 5, y: 2 }
    }

    #[test]
    fn test_tile_path_layout() {
        let path = tile_path(Path::new("/srv/tiles"), &key());
        assert_eq!(path, PathBuf::from("/srv/tiles/3/5/2.jpg"));
    }

    #[tokio::test]
    async fn test_open_creates_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("tiles");

        let store = DiskTileStore::open(&root).await.unwrap();

        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[tokio::test]
    async fn test_missing_tile_is_none() {
        let temp = TempDir::new().unwrap();
        let store = DiskTileStore::open(temp.path()).await.unwrap();

        assert_eq!(store.get(key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let temp = TempDir::new().unwrap();
        let store = DiskTileStore::open(temp.path()).await.unwrap();

        store.put(key(), vec![0xFF, 0xD8, 0xFF]).await.unwrap();

        assert_eq!(store.get(key()).await.unwrap(), Some(vec![0xFF, 0xD8, 0xFF]));
        assert!(temp.path().join("3").join("5").join("2.jpg").is_file());
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = DiskTileStore::open(temp.path()).await.unwrap();

        store.put(key(), vec![1; 64]).await.unwrap();
        store.put(key(), vec![2; 8]).await.unwrap();

        assert_eq!(store.get(key()).await.unwrap(), Some(vec![2; 8]));
        let entries: Vec<_> = std::fs::read_dir(temp.path().join("3").join("5"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("2.jpg")]);
    }
}
