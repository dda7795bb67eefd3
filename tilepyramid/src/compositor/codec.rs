//! Canonical tile encoding.
//!
//! Every stored tile is a `tile_size × tile_size` baseline JPEG at a fixed
//! quality. Ingestion and the compositor share one [`TileCodec`] so leaf
//! and parent tiles are encoded identically.

use crate::config::PyramidSettings;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageResult, RgbImage};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 90;

/// Encoder/decoder for the canonical tile format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCodec {
    tile_size: u32,
    quality: u8,
}

impl TileCodec {
    /// Creates a codec for square tiles of `tile_size` pixels.
    ///
    /// Each child must fill exactly one quadrant, so an odd `tile_size` is
    /// rounded down to even (minimum 2). Quality is clamped to 1..=100.
    pub fn new(tile_size: u32, quality: u8) -> Self {
        Self {
            tile_size: (tile_size & !1).max(2),
            quality: quality.clamp(1, 100),
        }
    }

    /// Edge length of a tile in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// JPEG quality used when encoding.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Decodes stored tile bytes into an RGB image.
    pub fn decode(&self, data: &[u8]) -> ImageResult<RgbImage> {
        Ok(image::load_from_memory(data)?.to_rgb8())
    }

    /// Encodes an RGB image in the canonical format.
    pub fn encode(&self, image: &RgbImage) -> ImageResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        encoder.encode(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(buffer)
    }

    /// Converts an arbitrary uploaded image into a canonical tile.
    ///
    /// The image is scaled to cover the tile and the overflow cropped
    /// around the centre, then encoded.
    pub fn normalize(&self, raw: &[u8]) -> ImageResult<Vec<u8>> {
        let decoded = image::load_from_memory(raw)?;
        let covered = decoded.resize_to_fill(self.tile_size, self.tile_size, FilterType::Lanczos3);
        self.encode(&covered.to_rgb8())
    }
}

impl Default for TileCodec {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE, DEFAULT_QUALITY)
    }
}

impl From<&PyramidSettings> for TileCodec {
    fn from(settings: &PyramidSettings) -> Self {
        Self::new(settings.tile_size, settings.quality)
    }
}
