//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;
use tilepyramid::config::ConfigFileError;
use tilepyramid::coord::{CoordError, TileKey};
use tilepyramid::PyramidError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or written
    Config(ConfigFileError),
    /// Tile coordinates outside the pyramid
    InvalidTile(CoordError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to open the tile store or metadata index
    ServiceCreation(PyramidError),
    /// A pyramid operation failed
    Pyramid(PyramidError),
    /// Failed to read an input image
    FileRead { path: PathBuf, error: std::io::Error },
    /// A climb stopped on a failed level
    ClimbFailed { key: TileKey, error: String },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::ServiceCreation(_) => {
                eprintln!();
                eprintln!("Check [storage] directory in the config file:");
                eprintln!("  tilepyramid config show");
            }
            CliError::ClimbFailed { key, .. } => {
                eprintln!();
                eprintln!("The tile is marked FAILED and is retried by the next climb that reaches it.");
                eprintln!("Inspect it with: tilepyramid status {} {} {}", key.zoom, key.x, key.y);
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidTile(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::ServiceCreation(e) => write!(f, "Failed to open tile pyramid: {}", e),
            CliError::Pyramid(e) => write!(f, "{}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
            CliError::ClimbFailed { key, error } => {
                write!(f, "Regeneration failed at tile {}: {}", key, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::InvalidTile(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::ServiceCreation(e) => Some(e),
            CliError::Pyramid(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidTile(e)
    }
}

impl From<PyramidError> for CliError {
    fn from(e: PyramidError) -> Self {
        CliError::Pyramid(e)
    }
}
