//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deepest zoom level a pyramid may hold.
///
/// Keeps `2 * x + 1` for any valid key inside `u32` range.
pub const MAX_ZOOM: u8 = 30;

/// The single key at zoom 0.
pub const ROOT: TileKey = TileKey { zoom: 0, x: 0, y: 0 };

/// Address of one cell in the quadtree pyramid.
///
/// At zoom `z` the valid range for both `x` and `y` is `0..2^z`.
/// `x` grows eastward (left to right), `y` grows southward (top to bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    /// Zoom level (0 = root)
    pub zoom: u8,
    /// Column, 0 at the left edge
    pub x: u32,
    /// Row, 0 at the top edge
    pub y: u32,
}

impl TileKey {
    /// Creates a validated key.
    ///
    /// Fails if the zoom exceeds [`MAX_ZOOM`] or either coordinate lies
    /// outside the `2^zoom × 2^zoom` grid of that level.
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        let key = Self { zoom, x, y };
        key.validate()?;
        Ok(key)
    }

    /// Checks that this key addresses a cell that can exist.
    pub fn validate(&self) -> Result<(), CoordError> {
        if self.zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(self.zoom));
        }
        let side = 1u64 << self.zoom;
        if u64::from(self.x) >= side || u64::from(self.y) >= side {
            return Err(CoordError::OutOfRange(*self));
        }
        Ok(())
    }

    /// Returns true for the zoom-0 key.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.zoom == 0
    }

    /// Returns the parent key one zoom level up.
    #[inline]
    pub fn parent(&self) -> Result<TileKey, CoordError> {
        super::parent_of(self.zoom, self.x, self.y)
    }

    /// Returns the four child keys in [`Quadrant::ALL`] order.
    #[inline]
    pub fn children(&self) -> [TileKey; 4] {
        super::children_of(self.zoom, self.x, self.y)
    }

    /// Returns every ancestor from the parent up to and including the root.
    ///
    /// The root itself yields an empty iterator.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { current: *self }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Iterator over the ancestors of a key, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors {
    current: TileKey,
}

impl Iterator for Ancestors {
    type Item = TileKey;

    fn next(&mut self) -> Option<Self::Item> {
        let parent = self.current.parent().ok()?;
        self.current = parent;
        Some(parent)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.current.zoom as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Ancestors {}

/// One of the four child slots inside a parent tile.
///
/// The declaration order is the canonical child order: `children_of`
/// emits keys in this order and the compositor places slot `i` at
/// `Quadrant::ALL[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// All quadrants in canonical child order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Column and row offset `(dx, dy)` of this slot, each 0 or 1.
    #[inline]
    pub fn offset(self) -> (u32, u32) {
        match self {
            Quadrant::TopLeft => (0, 0),
            Quadrant::TopRight => (1, 0),
            Quadrant::BottomLeft => (0, 1),
            Quadrant::BottomRight => (1, 1),
        }
    }

    /// Pixel origin of this slot on a canvas whose half-size is `half`.
    #[inline]
    pub fn pixel_origin(self, half: u32) -> (u32, u32) {
        let (dx, dy) = self.offset();
        (dx * half, dy * half)
    }

    /// Position of this slot in [`Quadrant::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        let (dx, dy) = self.offset();
        (dy * 2 + dx) as usize
    }

    /// The slot a key occupies inside its parent.
    #[inline]
    pub fn of(key: &TileKey) -> Quadrant {
        match (key.x & 1, key.y & 1) {
            (0, 0) => Quadrant::TopLeft,
            (1, 0) => Quadrant::TopRight,
            (0, _) => Quadrant::BottomLeft,
            _ => Quadrant::BottomRight,
        }
    }
}

/// Errors that can occur during coordinate arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    /// The key is the root and has no parent
    InvalidCoordinate(TileKey),
    /// Zoom level is above [`MAX_ZOOM`]
    InvalidZoom(u8),
    /// x or y lies outside the grid of its zoom level
    OutOfRange(TileKey),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidCoordinate(key) => {
                write!(f, "Invalid coordinate: tile {} is the root and has no parent", key)
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between 0 and {})",
                    zoom, MAX_ZOOM
                )
            }
            CoordError::OutOfRange(key) => {
                write!(
                    f,
                    "Tile {} is out of range (x and y must be below {} at zoom {})",
                    key,
                    1u64 << key.zoom.min(MAX_ZOOM),
                    key.zoom
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
