//! Quadtree coordinate module
//!
//! Pure parent/child arithmetic for tiles addressed by `(zoom, x, y)`.
//! A tile at zoom `z` covers the four tiles `(z+1, 2x+dx, 2y+dy)`.

mod types;


pub use types::{Ancestors, CoordError, Quadrant, TileKey, MAX_ZOOM, ROOT};

/// Returns the parent of `(zoom, x, y)`.
///
/// # Errors
///
/// Returns [`CoordError::InvalidCoordinate`] for the root, which has no parent.
#[inline]
pub fn parent_of(zoom: u8, x: u32, y: u32) -> Result<TileKey, CoordError> {
    if zoom == 0 {
        return Err(CoordError::InvalidCoordinate(TileKey { zoom, x, y }));
    }

    Ok(TileKey {
        zoom: zoom - 1,
        x: x >> 1,
        y: y >> 1,
    })
}

/// Returns the four children of `(zoom, x, y)` in [`Quadrant::ALL`] order.
///
/// The compositor relies on this order when placing children on the
/// parent canvas.
#[inline]
pub fn children_of(zoom: u8, x: u32, y: u32) -> [TileKey; 4] {
    Quadrant::ALL.map(|quadrant| {
        let (dx, dy) = quadrant.offset();
        TileKey {
            zoom: zoom.saturating_add(1),
            x: (x << 1) | dx,
            y: (y << 1) | dy,
        }
    })
}
