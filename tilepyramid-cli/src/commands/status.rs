//! Status command - show a tile's record and its ancestors'.

use clap::Args;
use tilepyramid::service::DiskPyramidService;

use super::common::{format_record, TileArgs};
use crate::error::CliError;

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub tile: TileArgs,
}

/// Print the record of the tile and of each ancestor, root last.
pub async fn run(service: &DiskPyramidService, args: StatusArgs) -> Result<(), CliError> {
    let key = args.tile.key()?;
    let lineage = service.lineage(key).await?;

    println!("{:<14} {:<10} {:<16} UPDATED", "TILE", "STATUS", "HASH");
    for (tile, record) in &lineage {
        println!("{}", format_record(*tile, record.as_ref()));
    }

    Ok(())
}
