//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (path, show, init)
//! - [`ingest`] - Ingest an image as a leaf tile
//! - [`regenerate`] - Rebuild the ancestors of a tile
//! - [`status`] - Show the records of a tile and its ancestors

pub mod common;
pub mod config;
pub mod ingest;
pub mod regenerate;
pub mod status;
