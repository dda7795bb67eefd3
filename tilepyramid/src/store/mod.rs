//! Tile content storage.
//!
//! The tile store holds the current encoded bytes for each [`TileKey`].
//! Writes are total replacements; there is no version history.
//!
//! # Implementations
//!
//! - [`MemoryTileStore`] - `DashMap`-backed store for tests and embedding
//! - [`DiskTileStore`] - one file per tile under a root directory
//!
//! [`TileKey`]: crate::coord::TileKey

mod disk;
mod error;
mod memory;
mod r#trait;

pub use disk::{tile_path, DiskTileStore};
pub use error::StorageError;
pub use memory::MemoryTileStore;
pub use r#trait::TileStore;
