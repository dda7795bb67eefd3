//! Regenerate command - rebuild every ancestor of a tile.

use clap::Args;
use tilepyramid::orchestrator::ClimbStop;
use tilepyramid::service::DiskPyramidService;

use super::common::{print_report, TileArgs};
use crate::error::CliError;

/// Arguments for the regenerate command.
#[derive(Debug, Args)]
pub struct RegenerateArgs {
    #[command(flatten)]
    pub tile: TileArgs,
}

/// Run a climb from the given tile and wait for it.
pub async fn run(service: &DiskPyramidService, args: RegenerateArgs) -> Result<(), CliError> {
    let key = args.tile.key()?;

    println!("Regenerating ancestors of {}", key);
    let report = service.regenerate(key).await?;
    print_report(&report);

    match report.stop {
        ClimbStop::Failed { key, error } => Err(CliError::ClimbFailed { key, error }),
        _ => Ok(()),
    }
}
