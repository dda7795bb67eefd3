//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Tile encoding and compositing
    pub pyramid: PyramidSettings,
    /// Where tiles and metadata are kept
    pub storage: StorageSettings,
    /// Log file location
    pub logging: LoggingSettings,
}

/// Canonical tile encoding settings.
///
/// Shared by ingestion and the compositor so leaf and parent tiles are
/// encoded identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidSettings {
    /// Edge length of a tile in pixels (even)
    pub tile_size: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
    /// RGB colour of quadrants whose child does not exist
    pub background: [u8; 3],
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Root directory holding tile files and the metadata index
    pub directory: PathBuf,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory for log files
    pub directory: PathBuf,
    /// Log file name inside `directory`
    pub file: String,
}
