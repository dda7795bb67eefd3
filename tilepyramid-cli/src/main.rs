//! tilepyramid CLI - Command-line interface
//!
//! Ingests leaf tiles into a tile pyramid on disk, rebuilds ancestors and
//! reports tile status.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tilepyramid::config::{config_file_path, ConfigFile};
use tilepyramid::logging::init_from_settings;
use tilepyramid::service::PyramidService;
use tracing::info;

use commands::config::ConfigCommands;
use commands::ingest::IngestArgs;
use commands::regenerate::RegenerateArgs;
use commands::status::StatusArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "tilepyramid")]
#[command(version = tilepyramid::VERSION)]
#[command(about = "Maintain a quadtree tile pyramid", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.tilepyramid/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest an image as a leaf tile and rebuild its ancestors
    Ingest(IngestArgs),

    /// Rebuild every ancestor of a tile from its current children
    Regenerate(RegenerateArgs),

    /// Show the record of a tile and of each ancestor
    Status(StatusArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);

    let command = match cli.command {
        Commands::Config(command) => return commands::config::run(command, &config_path),
        command => command,
    };

    let config = ConfigFile::load_from(&config_path)?;
    let _logging_guard =
        init_from_settings(&config.logging).map_err(|e| CliError::LoggingInit(e.to_string()))?;

    info!(
        version = tilepyramid::VERSION,
        config = %config_path.display(),
        "tilepyramid starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async {
        let service = PyramidService::open(&config)
            .await
            .map_err(CliError::ServiceCreation)?;

        let result = match command {
            Commands::Ingest(args) => commands::ingest::run(&service, args).await,
            Commands::Regenerate(args) => commands::regenerate::run(&service, args).await,
            Commands::Status(args) => commands::status::run(&service, args).await,
            Commands::Config(_) => Ok(()),
        };

        // Let detached climbs finish before the runtime shuts down.
        service.wait_idle().await;
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingest() {
        let cli = Cli::try_parse_from(["tilepyramid", "ingest", "3", "5", "2", "leaf.png"]).unwrap();
        match cli.command {
            Commands::Ingest(args) => {
                assert_eq!((args.tile.zoom, args.tile.x, args.tile.y), (3, 5, 2));
                assert_eq!(args.image, PathBuf::from("leaf.png"));
            }
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["tilepyramid", "status", "0", "0", "0", "--config", "/tmp/c.ini"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.ini")));
    }

    #[test]
    fn test_rejects_negative_coordinates() {
        assert!(Cli::try_parse_from(["tilepyramid", "regenerate", "1", "-1", "0"]).is_err());
    }
}
