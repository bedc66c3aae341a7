//! Coordinate type definitions

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels served by standard slippy-map tile servers
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// Tile coordinates in the Web Mercator / slippy-map scheme.
///
/// At zoom `z` the world is a `2^z × 2^z` grid; `x` grows eastward from the
/// antimeridian and `y` grows southward from the northern Mercator limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level (0-22)
    pub zoom: u8,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
    /// X coordinate (east-west), 0 at west
    pub x: u32,
}

impl TileCoord {
    /// Creates a tile coordinate, returning `None` if `x` or `y` fall outside
    /// the `2^zoom` grid.
    pub fn new(zoom: u8, x: u32, y: u32) -> Option<Self> {
        if zoom > MAX_ZOOM {
            return None;
        }
        let n = tiles_per_axis(zoom);
        if x >= n || y >= n {
            return None;
        }
        Some(Self { zoom, x, y })
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Number of tiles along one axis at the given zoom level.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom.min(MAX_ZOOM)
}

/// Inclusive rectangle of tiles at a single zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Number of columns in the range.
    pub fn width(&self) -> u64 {
        (self.max_x - self.min_x) as u64 + 1
    }

    /// Number of rows in the range.
    pub fn height(&self) -> u64 {
        (self.max_y - self.min_y) as u64 + 1
    }

    /// Total number of tiles in the range.
    pub fn len(&self) -> u64 {
        self.width() * self.height()
    }

    /// A range always holds at least one tile.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if the tile lies inside this range.
    pub fn contains(&self, tile: &TileCoord) -> bool {
        tile.zoom == self.zoom
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// Iterates every tile in row-major order (y, then x).
    pub fn tiles(&self) -> TileRangeIterator {
        TileRangeIterator {
            range: *self,
            current: 0,
            total: self.len(),
        }
    }
}

/// Iterator over all tiles in a [`TileRange`].
#[derive(Debug, Clone)]
pub struct TileRangeIterator {
    range: TileRange,
    current: u64,
    total: u64,
}

impl Iterator for TileRangeIterator {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total {
            return None;
        }

        let width = self.range.width();
        let y = self.range.min_y + (self.current / width) as u32;
        let x = self.range.min_x + (self.current % width) as u32;

        self.current += 1;

        Some(TileCoord {
            zoom: self.range.zoom,
            x,
            y,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileRangeIterator {}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be between {} and {})", MIN_LAT, MAX_LAT)]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between {} and {})", MIN_LON, MAX_LON)]
    InvalidLongitude(f64),

    #[error("Invalid zoom level: {0} (must be between {} and {})", MIN_ZOOM, MAX_ZOOM)]
    InvalidZoom(u8),

    /// Region corners are out of order.
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
}
