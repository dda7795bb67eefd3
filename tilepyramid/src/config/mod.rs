//! Configuration for the tile pyramid.
//!
//! Settings live in an INI file (`~/.tilepyramid/config.ini` by default).
//! A missing file yields defaults; every key is optional.
//!
//! Settings structs live in [`settings`], constants in [`defaults`],
//! parsing in `parser`, and serialization in `writer`.
//!
//! # Example
//!
//! ```
//! use tilepyramid::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.pyramid.tile_size, 256);
//! assert_eq!(config.pyramid.quality, 90);
//! ```

pub mod defaults;
mod file;
mod parser;
pub mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, LoggingSettings, PyramidSettings, StorageSettings};
pub use writer::{format_background, to_config_string};
