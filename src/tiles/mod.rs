//! Tile coordinate math over a collection's sky extent.
//!
//! Zoom level `z` splits the extent into a `2^z x 2^z` grid of square
//! pixel tiles. Tile `x` grows with `ra`, tile `y` grows as `dec` falls, so
//! tile `(0, 0)` holds the extent's top-left corner.

mod client;

pub use client::{CatalogTileClient, DEFAULT_TILE_SIZE, DEFAULT_VIEWPORT};

use crate::catalog::Position;
use std::fmt;

/// Tile coordinates: x, y, and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column, growing with `ra`.
    pub x: u32,
    /// Row, growing as `dec` falls.
    pub y: u32,
    /// Zoom level.
    pub z: u8,
}

impl TileCoord {
    /// Create a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Sky bounds of this tile within `extent`.
    ///
    /// Tiles on the right and bottom edges are open-ended so every position
    /// inside the extent falls in exactly one tile.
    #[must_use]
    pub fn bounds(&self, extent: &Extent) -> TileBounds {
        let n = grid_size(self.z);
        let w = extent.x_range / f64::from(n);
        let h = extent.y_range / f64::from(n);

        let ra_min = extent.x_min + f64::from(self.x) * w;
        let ra_max = if self.x + 1 >= n { f64::INFINITY } else { ra_min + w };
        let dec_max = extent.y_max - f64::from(self.y) * h;
        let dec_min = if self.y + 1 >= n { f64::NEG_INFINITY } else { dec_max - h };

        TileBounds { ra_min, ra_max, dec_min, dec_max }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Tiles per side at zoom `z`.
#[must_use]
pub fn grid_size(z: u8) -> u32 {
    1u32.checked_shl(u32::from(z)).unwrap_or(u32::MAX)
}

/// Sky area covered by one tile: `ra` in `[ra_min, ra_max)`, `dec` in `(dec_min, dec_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct TileBounds {
    pub ra_min: f64,
    pub ra_max: f64,
    pub dec_min: f64,
    pub dec_max: f64,
}

impl TileBounds {
    /// Returns true if `p` lies in this tile.
    #[must_use]
    pub fn contains(&self, p: Position) -> bool {
        p.ra >= self.ra_min && p.ra < self.ra_max && p.dec > self.dec_min && p.dec <= self.dec_max
    }
}

/// Bounding box of a collection, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Smallest `ra`.
    pub x_min: f64,
    /// Largest `dec`.
    pub y_max: f64,
    /// Span along `ra`; always positive.
    pub x_range: f64,
    /// Span along `dec`; always positive.
    pub y_range: f64,
}

impl Extent {
    /// Smallest extent covering `positions`, or `None` when there are none.
    ///
    /// A zero span (all positions on one line) is widened to one degree.
    pub fn covering(positions: impl IntoIterator<Item = Position>) -> Option<Self> {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let (mut ra_lo, mut ra_hi, mut dec_lo, mut dec_hi) = (first.ra, first.ra, first.dec, first.dec);
        for p in iter {
            ra_lo = ra_lo.min(p.ra);
            ra_hi = ra_hi.max(p.ra);
            dec_lo = dec_lo.min(p.dec);
            dec_hi = dec_hi.max(p.dec);
        }

        let span = |lo: f64, hi: f64| if hi > lo { hi - lo } else { 1.0 };
        Some(Self { x_min: ra_lo, y_max: dec_hi, x_range: span(ra_lo, ra_hi), y_range: span(dec_lo, dec_hi) })
    }

    /// Centre as `[dec, ra]`.
    #[must_use]
    pub fn center(&self) -> [f64; 2] {
        [self.y_max - self.y_range / 2.0, self.x_min + self.x_range / 2.0]
    }

    /// Sky units per pixel along `(ra, dec)` at zoom `z` for `tile_size` pixel tiles.
    #[must_use]
    pub fn resolution(&self, z: u8, tile_size: u32) -> (f64, f64) {
        let px = f64::from(tile_size) * f64::from(grid_size(z));
        (self.x_range / px, self.y_range / px)
    }
}

/// Screen rectangle centred on a pixel position at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Centre, in world pixels from the extent's top-left corner.
    pub center: (f64, f64),
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(center: (f64, f64), width: u32, height: u32) -> Self {
        Self { center, width, height }
    }

    /// Tiles at zoom `z` overlapping the viewport, row-major.
    ///
    /// Tiles outside the grid are never returned; a viewport panned entirely
    /// off the grid sees nothing.
    #[must_use]
    pub fn visible_tiles(&self, z: u8, tile_size: u32) -> Vec<TileCoord> {
        let n = grid_size(z);
        let size = f64::from(tile_size);
        let half_w = f64::from(self.width) / 2.0;
        let half_h = f64::from(self.height) / 2.0;

        let span = |lo_px: f64, hi_px: f64| -> Option<(u32, u32)> {
            let lo = (lo_px / size).floor();
            let hi = (hi_px / size).ceil() - 1.0;
            let max = f64::from(n - 1);
            if hi < 0.0 || lo > max || hi < lo {
                return None;
            }
            Some((lo.max(0.0) as u32, hi.min(max) as u32))
        };

        let (cx, cy) = self.center;
        let (Some((x0, x1)), Some((y0, y1))) =
            (span(cx - half_w, cx + half_w), span(cy - half_h, cy + half_h))
        else {
            return Vec::new();
        };

        (y0..=y1).flat_map(|y| (x0..=x1).map(move |x| TileCoord::new(x, y, z))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_extent() -> Extent {
        Extent { x_min: 0.0, y_max: 16.0, x_range: 16.0, y_range: 16.0 }
    }

    #[test]
    fn test_tile_display() {
        assert_eq!(TileCoord::new(3, 1, 2).to_string(), "2/3/1");
    }

    #[test]
    fn test_grid_size() {
        assert_eq!(grid_size(0), 1);
        assert_eq!(grid_size(8), 256);
    }

    #[test]
    fn test_zoom_zero_covers_everything() {
        let b = TileCoord::new(0, 0, 0).bounds(&unit_extent());
        assert!(b.contains(Position::new(0.0, 0.0)));
        assert!(b.contains(Position::new(16.0, 16.0)));
        assert!(b.contains(Position::new(8.0, 3.0)));
    }

    #[test]
    fn test_tile_bounds_at_zoom_two() {
        let b = TileCoord::new(1, 2, 2).bounds(&unit_extent());
        assert_relative_eq!(b.ra_min, 4.0);
        assert_relative_eq!(b.ra_max, 8.0);
        assert_relative_eq!(b.dec_max, 8.0);
        assert_relative_eq!(b.dec_min, 4.0);
    }

    #[test]
    fn test_each_position_in_exactly_one_tile() {
        let extent = unit_extent();
        let tiles: Vec<_> = (0..4).flat_map(|y| (0..4).map(move |x| TileCoord::new(x, y, 2))).collect();
        for p in [Position::new(0.0, 16.0), Position::new(4.0, 4.0), Position::new(16.0, 0.0)] {
            let hits = tiles.iter().filter(|t| t.bounds(&extent).contains(p)).count();
            assert_eq!(hits, 1, "{p:?}");
        }
    }

    #[test]
    fn test_extent_covering() {
        let e = Extent::covering([Position::new(1.0, -2.0), Position::new(5.0, 4.0)]).unwrap();
        assert_eq!(e, Extent { x_min: 1.0, y_max: 4.0, x_range: 4.0, y_range: 6.0 });
        assert_eq!(e.center(), [1.0, 3.0]);
        assert!(Extent::covering(std::iter::empty()).is_none());
    }

    #[test]
    fn test_degenerate_extent_is_widened() {
        let e = Extent::covering([Position::new(2.0, 2.0)]).unwrap();
        assert_relative_eq!(e.x_range, 1.0);
        assert_relative_eq!(e.y_range, 1.0);
    }

    #[test]
    fn test_resolution_matches_256px_tiles() {
        let e = Extent { x_min: 0.0, y_max: 0.0, x_range: 15.0, y_range: 15.0 };
        let (rx, ry) = e.resolution(0, 256);
        assert_relative_eq!(rx, 15.0 / 256.0);
        assert_relative_eq!(ry, 15.0 / 256.0);
    }

    #[test]
    fn test_visible_tiles_centered() {
        // Zoom 2 is a 1024px world; a centred 512px view shows the middle 2x2.
        let v = Viewport::new((512.0, 512.0), 512, 512);
        let tiles = v.visible_tiles(2, 256);
        assert_eq!(tiles, vec![
            TileCoord::new(1, 1, 2),
            TileCoord::new(2, 1, 2),
            TileCoord::new(1, 2, 2),
            TileCoord::new(2, 2, 2),
        ]);
    }

    #[test]
    fn test_visible_tiles_clipped_to_grid() {
        let v = Viewport::new((128.0, 128.0), 512, 512);
        assert_eq!(v.visible_tiles(0, 256), vec![TileCoord::new(0, 0, 0)]);
    }

    #[test]
    fn test_visible_tiles_off_grid() {
        let v = Viewport::new((-1000.0, 128.0), 512, 512);
        assert!(v.visible_tiles(3, 256).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Tiles at one zoom level partition the extent.
        #[test]
        fn prop_position_in_exactly_one_tile(
            ra in 0.0f64..=16.0,
            dec in 0.0f64..=16.0,
            z in 0u8..5,
        ) {
            let extent = Extent { x_min: 0.0, y_max: 16.0, x_range: 16.0, y_range: 16.0 };
            let n = grid_size(z);
            let p = Position::new(ra, dec);
            let hits = (0..n)
                .flat_map(|y| (0..n).map(move |x| TileCoord::new(x, y, z)))
                .filter(|t| t.bounds(&extent).contains(p))
                .count();
            prop_assert_eq!(hits, 1);
        }
    }
}
