//! Ingest command - store an image as a leaf tile.

use clap::Args;
use std::path::PathBuf;
use tilepyramid::service::DiskPyramidService;
use tilepyramid::PyramidError;

use super::common::{print_report, TileArgs};
use crate::error::CliError;

/// Arguments for the ingest command.
#[derive(Debug, Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub tile: TileArgs,

    /// Image file (JPEG, PNG or WebP); scaled and cropped to the tile size
    pub image: PathBuf,
}

/// Run the ingest command.
///
/// The upload succeeds once the leaf is stored, whatever happens to the
/// climb above it; the climb's outcome is printed for information.
pub async fn run(service: &DiskPyramidService, args: IngestArgs) -> Result<(), CliError> {
    let key = args.tile.key()?;
    let raw = tokio::fs::read(&args.image)
        .await
        .map_err(|error| CliError::FileRead {
            path: args.image.clone(),
            error,
        })?;

    println!("Ingesting {} as tile {}", args.image.display(), key);
    let receipt = service.ingest(key, raw).await?;
    println!("Stored tile {} (hash {})", receipt.key, receipt.hash);

    let report = receipt
        .climb
        .await
        .map_err(|e| CliError::Pyramid(PyramidError::from(e)))?;
    print_report(&report);

    Ok(())
}
