//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants, the valid ranges, and the
//! `ConfigFile::default()` implementation.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::compositor::{DEFAULT_QUALITY, DEFAULT_TILE_SIZE};

// =============================================================================
// Pyramid
// =============================================================================

/// Default tile edge length.
pub const DEFAULT_PYRAMID_TILE_SIZE: u32 = DEFAULT_TILE_SIZE;

/// Smallest accepted tile edge length.
pub const MIN_TILE_SIZE: u32 = 16;

/// Largest accepted tile edge length.
pub const MAX_TILE_SIZE: u32 = 4096;

/// Default JPEG quality, matching leaf ingestion.
pub const DEFAULT_PYRAMID_QUALITY: u8 = DEFAULT_QUALITY;

/// Default background (black).
pub const DEFAULT_BACKGROUND_RGB: [u8; 3] = [0, 0, 0];

// =============================================================================
// Storage and logging
// =============================================================================

/// Subdirectory of the config directory holding tiles by default.
pub const DEFAULT_STORAGE_SUBDIR: &str = "tiles";

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "tilepyramid.log";

/// Default storage directory (~/.tilepyramid/tiles).
pub fn default_storage_directory() -> PathBuf {
    config_directory().join(DEFAULT_STORAGE_SUBDIR)
}

impl Default for PyramidSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_PYRAMID_TILE_SIZE,
            quality: DEFAULT_PYRAMID_QUALITY,
            background: DEFAULT_BACKGROUND_RGB,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            directory: default_storage_directory(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            pyramid: PyramidSettings::default(),
            storage: StorageSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
