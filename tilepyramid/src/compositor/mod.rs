//! Parent tile compositing.
//!
//! [`TileCompositor`] builds one parent tile from up to four child tiles.
//! Each present child is decoded, reduced to half the tile size and copied
//! into its quadrant; absent children leave the background colour.
//!
//! ```text
//!  children (zoom z+1)               parent (zoom z)
//! ┌────────┐ ┌────────┐          ┌────────┬────────┐
//! │ 2x, 2y │ │2x+1, 2y│          │TopLeft │TopRight│
//! └────────┘ └────────┘   ──►    ├────────┼────────┤
//! ┌────────┐ ┌────────┐          │BotLeft │BotRight│
//! │2x, 2y+1│ │2x+1,.. │          └────────┴────────┘
//! └────────┘ └────────┘
//! ```
//!
//! Slot `i` of the children array always belongs to `Quadrant::ALL[i]`,
//! the same order [`children_of`](crate::coord::children_of) produces.

mod codec;
mod downsample;
mod fingerprint;

pub use codec::{TileCodec, DEFAULT_QUALITY, DEFAULT_TILE_SIZE};
pub use downsample::{downsample_box_2x, downsample_half};
pub use fingerprint::ContentHash;

use crate::config::PyramidSettings;
use crate::coord::{Quadrant, TileKey};
use image::{imageops, ImageError, Rgb, RgbImage};
use thiserror::Error;
use tracing::trace;

/// Default background colour for empty quadrants.
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Encoded bytes of each child slot, `None` where the child does not exist.
pub type ChildTiles = [Option<Vec<u8>>; 4];

/// Errors raised while compositing a parent tile.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// A child's stored bytes are not a decodable image
    #[error("Failed to decode child tile {child}: {source}")]
    Decode {
        child: TileKey,
        #[source]
        source: ImageError,
    },

    /// The composed canvas could not be encoded
    #[error("Failed to encode composite tile: {0}")]
    Encode(#[source] ImageError),
}

/// An encoded parent tile and its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeTile {
    /// Canonically encoded bytes
    pub data: Vec<u8>,
    /// Fingerprint of `data`
    pub hash: ContentHash,
}

/// Builds parent tiles from their children.
///
/// Pure CPU work with no I/O; callers in async code run it on the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct TileCompositor {
    codec: TileCodec,
    background: Rgb<u8>,
}

impl TileCompositor {
    /// Creates a compositor using `codec` and `background` for empty quadrants.
    pub fn new(codec: TileCodec, background: Rgb<u8>) -> Self {
        Self { codec, background }
    }

    /// The codec shared with ingestion.
    pub fn codec(&self) -> &TileCodec {
        &self.codec
    }

    /// Background colour of empty quadrants.
    pub fn background(&self) -> Rgb<u8> {
        self.background
    }

    /// Composes the parent canvas without encoding it.
    ///
    /// All four slots absent yields a canvas filled with the background.
    pub fn compose(&self, parent: TileKey, children: &ChildTiles) -> Result<RgbImage, CompositeError> {
        let size = self.codec.tile_size();
        let half = size / 2;
        let child_keys = parent.children();
        let mut canvas = RgbImage::from_pixel(size, size, self.background);

        for (slot, quadrant) in Quadrant::ALL.iter().enumerate() {
            let Some(data) = children[slot].as_deref() else {
                continue;
            };

            let child = self
                .codec
                .decode(data)
                .map_err(|source| CompositeError::Decode {
                    child: child_keys[slot],
                    source,
                })?;

            let reduced = downsample_half(&child, half);
            let (x, y) = quadrant.pixel_origin(half);
            imageops::replace(&mut canvas, &reduced, i64::from(x), i64::from(y));

            trace!(
                parent = %parent,
                child = %child_keys[slot],
                quadrant = ?quadrant,
                "Child placed"
            );
        }

        Ok(canvas)
    }

    /// Composes and encodes the parent tile.
    pub fn composite(&self, parent: TileKey, children: &ChildTiles) -> Result<CompositeTile, CompositeError> {
        let canvas = self.compose(parent, children)?;
        let data = self.codec.encode(&canvas).map_err(CompositeError::Encode)?;
        let hash = ContentHash::of(&data);
        Ok(CompositeTile { data, hash })
    }
}

impl Default for TileCompositor {
    fn default() -> Self {
        Self::new(TileCodec::default(), DEFAULT_BACKGROUND)
    }
}

impl From<&PyramidSettings> for TileCompositor {
    fn from(settings: &PyramidSettings) -> Self {
        Self::new(TileCodec::from(settings), Rgb(settings.background))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: u32 = 64;
    const HALF: u32 = SIZE / 2;
    const TOLERANCE: i16 = 6;

    fn compositor() -> TileCompositor {
        TileCompositor::new(TileCodec::new(SIZE, 90), Rgb([10, 20, 30]))
    }

    fn parent() -> TileKey {
        TileKey { zoom: 2, x: 2, y: 1 }
    }

    fn solid_tile(color: [u8; 3]) -> Vec<u8> {
        TileCodec::new(SIZE, 90)
            .encode(&RgbImage::from_pixel(SIZE, SIZE, Rgb(color)))
            .unwrap()
    }

    fn assert_close(actual: &Rgb<u8>, expected: [u8; 3]) {
        for c in 0..3 {
            assert!(
                (actual[c] as i16 - expected[c] as i16).abs() <= TOLERANCE,
                "channel {}: {:?} vs {:?}",
                c,
                actual,
                expected
            );
        }
    }

    fn centre_of(quadrant: Quadrant) -> (u32, u32) {
        let (x, y) = quadrant.pixel_origin(HALF);
        (x + HALF / 2, y + HALF / 2)
    }

    #[test]
    fn test_odd_tile_size_leaves_no_background_edge() {
        let codec = TileCodec::new(33, 90);
        let compositor = TileCompositor::new(codec, Rgb([10, 20, 30]));
        let child = codec
            .encode(&RgbImage::from_pixel(32, 32, Rgb([200, 200, 200])))
            .unwrap();
        let children = [
            Some(child.clone()),
            Some(child.clone()),
            Some(child.clone()),
            Some(child),
        ];

        let canvas = compositor.compose(parent(), &children).unwrap();

        assert_eq!(canvas.dimensions(), (32, 32));
        for (x, y) in [(31, 0), (0, 31), (31, 31), (16, 31), (31, 16)] {
            assert_close(canvas.get_pixel(x, y), [200, 200, 200]);
        }
    }

    #[test]
    fn test_all_absent_is_blank() {
        let canvas = compositor().compose(parent(), &[None, None, None, None]).unwrap();

        assert_eq!(canvas.dimensions(), (SIZE, SIZE));
        assert!(canvas.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }

    #[test]
    fn test_all_absent_still_encodes() {
        let tile = compositor().composite(parent(), &[None, None, None, None]).unwrap();

        assert_eq!(tile.hash, ContentHash::of(&tile.data));
        let decoded = TileCodec::new(SIZE, 90).decode(&tile.data).unwrap();
        assert_close(decoded.get_pixel(5, 5), [10, 20, 30]);
    }

    #[test]
    fn test_each_child_lands_in_its_quadrant() {
        let colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]];
        let children = colors.map(|c| Some(solid_tile(c)));

        let canvas = compositor().compose(parent(), &children).unwrap();

        for (quadrant, color) in Quadrant::ALL.iter().zip(colors) {
            let (x, y) = centre_of(*quadrant);
            assert_close(canvas.get_pixel(x, y), color);
        }
    }

    #[test]
    fn test_two_children_leave_background() {
        let children = [None, Some(solid_tile([200, 0, 0])), Some(solid_tile([0, 0, 200])), None];

        let canvas = compositor().compose(parent(), &children).unwrap();

        // Absent quadrants are exactly the background, every pixel.
        for quadrant in [Quadrant::TopLeft, Quadrant::BottomRight] {
            let (ox, oy) = quadrant.pixel_origin(HALF);
            for y in oy..oy + HALF {
                for x in ox..ox + HALF {
                    assert_eq!(*canvas.get_pixel(x, y), Rgb([10, 20, 30]));
                }
            }
        }

        // Present quadrants equal the downsampled source.
        let codec = TileCodec::new(SIZE, 90);
        for (slot, quadrant) in [(1, Quadrant::TopRight), (2, Quadrant::BottomLeft)] {
            let source = codec.decode(children[slot].as_ref().unwrap()).unwrap();
            let expected = downsample_half(&source, HALF);
            let (ox, oy) = quadrant.pixel_origin(HALF);
            for y in 0..HALF {
                for x in 0..HALF {
                    assert_eq!(canvas.get_pixel(ox + x, oy + y), expected.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn test_single_child_one_quadrant_filled() {
        // Only (3,5,2) exists below (2,2,1): the top-right slot.
        let children = [None, Some(solid_tile([0, 200, 0])), None, None];

        let canvas = compositor().compose(parent(), &children).unwrap();

        assert_close(canvas.get_pixel(centre_of(Quadrant::TopRight).0, centre_of(Quadrant::TopRight).1), [0, 200, 0]);
        for quadrant in [Quadrant::TopLeft, Quadrant::BottomLeft, Quadrant::BottomRight] {
            let (x, y) = centre_of(quadrant);
            assert_eq!(*canvas.get_pixel(x, y), Rgb([10, 20, 30]));
        }
    }

    #[test]
    fn test_composite_is_deterministic() {
        let children = [
            Some(solid_tile([1, 2, 3])),
            None,
            Some(solid_tile([90, 80, 70])),
            Some(solid_tile([250, 128, 0])),
        ];

        let first = compositor().composite(parent(), &children).unwrap();
        let second = compositor().composite(parent(), &children).unwrap();

        assert_eq!(first.data, second.data);
        assert_eq!(first.hash, second.hash);
    }

    #[test]
    fn test_corrupt_child_fails_with_its_key() {
        let children = [None, Some(b"garbage".to_vec()), None, None];

        let err = compositor().compose(parent(), &children).unwrap_err();

        match err {
            CompositeError::Decode { child, .. } => {
                assert_eq!(child, TileKey { zoom: 3, x: 5, y: 2 });
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_child_is_reduced() {
        let big = TileCodec::new(SIZE * 2, 90)
            .encode(&RgbImage::from_pixel(SIZE * 2, SIZE * 2, Rgb([100, 100, 100])))
            .unwrap();

        let canvas = compositor().compose(parent(), &[Some(big), None, None, None]).unwrap();

        let (x, y) = centre_of(Quadrant::TopLeft);
        assert_close(canvas.get_pixel(x, y), [100, 100, 100]);
    }

    #[test]
    fn test_from_settings_uses_background() {
        let settings = PyramidSettings {
            tile_size: SIZE,
            quality: 80,
            background: [1, 2, 3],
        };
        let compositor = TileCompositor::from(&settings);

        assert_eq!(compositor.background(), Rgb([1, 2, 3]));
        assert_eq!(compositor.codec().quality(), 80);
    }
}
