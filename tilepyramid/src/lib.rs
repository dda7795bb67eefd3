//! Tile pyramid regeneration engine.
//!
//! Maintains a quadtree of square image tiles addressed by `(zoom, x, y)`,
//! where each tile is a downsampled composite of its four children. When a
//! leaf tile is written, every ancestor up to the root is regenerated in a
//! background climb, with at most one generation of any tile in flight.
//!
//! # High-Level API
//!
//! The [`service`] module wires everything from the configuration file:
//!
//! ```ignore
//! use tilepyramid::config::ConfigFile;
//! use tilepyramid::coord::TileKey;
//! use tilepyramid::service::PyramidService;
//!
//! let service = PyramidService::open(&ConfigFile::load()?).await?;
//! service.ingest(TileKey::new(3, 5, 2)?, upload).await?;
//! service.wait_idle().await;
//! ```

pub mod compositor;
pub mod config;
pub mod coord;
pub mod coordinator;
pub mod error;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod orchestrator;
pub mod service;
pub mod store;

pub use error::PyramidError;

/// Version of the tilepyramid library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
