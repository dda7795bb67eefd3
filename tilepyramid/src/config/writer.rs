//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[pyramid]
; Edge length of every tile in pixels (even, 16-4096, default: 256)
tile_size = {}
; JPEG quality for leaf and composite tiles (1-100, default: 90)
quality = {}
; Colour of quadrants whose child tile does not exist, as rrggbb (default: 000000)
background = {}

[storage]
; Root directory for tile files and the metadata index (tiles.json)
directory = {}

[logging]
; Directory for log files (relative paths resolve against the working directory)
directory = {}
; Log file name (cleared at the start of each session)
file = {}
"#,
        config.pyramid.tile_size,
        config.pyramid.quality,
        format_background(config.pyramid.background),
        path_to_string(&config.storage.directory),
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Formats an RGB triple as six lower-case hex digits.
pub fn format_background(rgb: [u8; 3]) -> String {
    format!("{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
