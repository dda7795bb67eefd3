//! Common types and utilities shared across CLI commands.

use clap::Args;
use tilepyramid::coord::TileKey;
use tilepyramid::index::TileRecord;
use tilepyramid::orchestrator::{ClimbReport, ClimbStop};

use crate::error::CliError;

/// Tile coordinates given as three positional arguments.
#[derive(Debug, Clone, Args)]
pub struct TileArgs {
    /// Zoom level (0 is the root)
    pub zoom: u8,
    /// Column, 0 to 2^zoom - 1
    pub x: u32,
    /// Row, 0 to 2^zoom - 1
    pub y: u32,
}

impl TileArgs {
    /// Validated tile key.
    pub fn key(&self) -> Result<TileKey, CliError> {
        Ok(TileKey::new(self.zoom, self.x, self.y)?)
    }
}

/// Formats one record as a table row.
pub fn format_record(key: TileKey, record: Option<&TileRecord>) -> String {
    match record {
        None => format!("{:<14} {:<10}", key.to_string(), "-"),
        Some(record) => {
            let hash = record
                .content_hash
                .as_ref()
                .map(|h| h.to_string())
                .unwrap_or_else(|| "-".to_string());
            let mut row = format!(
                "{:<14} {:<10} {:<16} {}",
                key.to_string(),
                record.status.as_str(),
                hash,
                record.updated_at.format("%Y-%m-%d %H:%M:%S%.3f UTC")
            );
            if let Some(error) = &record.last_error {
                row.push_str(&format!("  ({})", error));
            }
            row
        }
    }
}

/// Prints a climb report.
pub fn print_report(report: &ClimbReport) {
    if report.generated.is_empty() {
        println!("No ancestors regenerated");
    } else {
        println!("Regenerated {} ancestor(s):", report.generated.len());
        for key in &report.generated {
            println!("  {}", key);
        }
    }

    match &report.stop {
        ClimbStop::ReachedRoot => println!("Climb reached the root"),
        ClimbStop::AlreadyInFlight(key) => {
            println!("Stopped at {}: another climb is regenerating it", key)
        }
        ClimbStop::Failed { key, error } => println!("Failed at {}: {}", key, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilepyramid::compositor::ContentHash;

    #[test]
    fn test_tile_args_validates() {
        let args = TileArgs { zoom: 3, x: 5, y: 2 };
        assert_eq!(args.key().unwrap(), TileKey { zoom: 3, x: 5, y: 2 });

        let out_of_range = TileArgs { zoom: 1, x: 2, y: 0 };
        assert!(matches!(out_of_range.key(), Err(CliError::InvalidTile(_))));
    }

    #[test]
    fn test_format_missing_record() {
        let row = format_record(TileKey { zoom: 0, x: 0, y: 0 }, None);
        assert!(row.starts_with("0/0/0"));
        assert!(row.contains('-'));
    }

    #[test]
    fn test_format_failed_record_shows_error() {
        let key = TileKey { zoom: 2, x: 2, y: 1 };
        let record = TileRecord::failed(key, None, "corrupt child");
        let row = format_record(key, Some(&record));

        assert!(row.contains("FAILED"));
        assert!(row.contains("(corrupt child)"));
    }

    #[test]
    fn test_format_ready_record_shows_hash() {
        let key = TileKey { zoom: 1, x: 1, y: 0 };
        let hash = ContentHash::of(b"tile");
        let record = TileRecord::ready(key, hash.clone());

        assert!(format_record(key, Some(&record)).contains(hash.as_str()));
    }
}
