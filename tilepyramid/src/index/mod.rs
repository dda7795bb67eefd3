//! Tile metadata index.
//!
//! Stores one [`TileRecord`] per [`TileKey`]: generation status, content
//! fingerprint and last update time. Last writer wins per key.
//!
//! # Implementations
//!
//! - [`MemoryIndex`] - `DashMap`-backed index for tests and embedding
//! - [`FileIndex`] - JSON document persisted under a root directory
//!
//! [`TileKey`]: crate::coord::TileKey

mod file;
mod memory;
mod r#trait;
mod types;

pub use file::{FileIndex, INDEX_FILE_NAME};
pub use memory::MemoryIndex;
pub use r#trait::MetadataIndex;
pub use types::{TileRecord, TileStatus};
