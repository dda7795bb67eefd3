//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::{MAX_TILE_SIZE, MIN_TILE_SIZE};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [pyramid] section
    if let Some(section) = ini.section(Some("pyramid")) {
        if let Some(v) = section.get("tile_size") {
            config.pyramid.tile_size = parse_tile_size(v)?;
        }
        if let Some(v) = section.get("quality") {
            config.pyramid.quality = match v.trim().parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => q,
                _ => {
                    return Err(invalid(
                        "pyramid",
                        "quality",
                        v,
                        "must be an integer between 1 and 100",
                    ))
                }
            };
        }
        if let Some(v) = section.get("background") {
            config.pyramid.background = parse_background(v).ok_or_else(|| {
                invalid(
                    "pyramid",
                    "background",
                    v,
                    "expected six hex digits like 000000 or ffffff",
                )
            })?;
        }
    }

    // [storage] section
    if let Some(section) = ini.section(Some("storage")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.storage.directory = expand_tilde(v);
            }
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() || v.contains('/') || v.contains('\\') {
                return Err(invalid(
                    "logging",
                    "file",
                    v,
                    "must be a plain file name",
                ));
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn parse_tile_size(value: &str) -> Result<u32, ConfigFileError> {
    let reason = format!(
        "must be an even integer between {} and {}",
        MIN_TILE_SIZE, MAX_TILE_SIZE
    );
    match value.trim().parse::<u32>() {
        Ok(size) if (MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&size) && size % 2 == 0 => Ok(size),
        _ => Err(invalid("pyramid", "tile_size", value, &reason)),
    }
}

/// Parses `rrggbb`, with or without a leading `#`.
pub(super) fn parse_background(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
