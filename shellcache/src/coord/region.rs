//! Geographic bounding regions and their tile coverage.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::tile_of;
use super::types::{CoordError, TileCoord, TileRange, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON};

/// A closed latitude/longitude rectangle plus the zoom levels to cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub zoom_levels: Vec<u8>,
}

impl BoundingRegion {
    /// Creates a validated region.
    ///
    /// # Errors
    ///
    /// Returns `CoordError` if the corners are out of order, either corner lies
    /// outside the Web Mercator domain, or a zoom level exceeds [`MAX_ZOOM`].
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
        zoom_levels: Vec<u8>,
    ) -> Result<Self, CoordError> {
        let region = Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            zoom_levels,
        };
        region.validate()?;
        Ok(region)
    }

    /// Checks the region invariants.
    pub fn validate(&self) -> Result<(), CoordError> {
        for lat in [self.lat_min, self.lat_max] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        for lon in [self.lon_min, self.lon_max] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        if self.lat_min > self.lat_max {
            return Err(CoordError::InvalidRegion(format!(
                "lat_min {} is greater than lat_max {}",
                self.lat_min, self.lat_max
            )));
        }
        if self.lon_min > self.lon_max {
            return Err(CoordError::InvalidRegion(format!(
                "lon_min {} is greater than lon_max {}",
                self.lon_min, self.lon_max
            )));
        }
        if let Some(&zoom) = self.zoom_levels.iter().find(|&&z| z > MAX_ZOOM) {
            return Err(CoordError::InvalidZoom(zoom));
        }
        Ok(())
    }

    /// Distinct zoom levels in ascending order.
    pub fn distinct_zooms(&self) -> Vec<u8> {
        let zooms: BTreeSet<u8> = self.zoom_levels.iter().copied().collect();
        zooms.into_iter().collect()
    }

    /// Computes the inclusive tile rectangle for one zoom level.
    ///
    /// Both corners are projected and then re-sorted per axis, because tile
    /// rows grow southward while latitude grows northward.
    pub fn tile_range(&self, zoom: u8) -> TileRange {
        let a = tile_of(self.lat_min, self.lon_min, zoom);
        let b = tile_of(self.lat_max, self.lon_max, zoom);

        TileRange {
            zoom: a.zoom,
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_y: a.y.min(b.y),
            max_y: a.y.max(b.y),
        }
    }

    /// One tile range per distinct zoom level.
    pub fn tile_ranges(&self) -> Vec<TileRange> {
        self.distinct_zooms()
            .into_iter()
            .map(|zoom| self.tile_range(zoom))
            .collect()
    }

    /// Total number of tiles covering the region across all zoom levels.
    pub fn tile_count(&self) -> u64 {
        self.tile_ranges().iter().map(TileRange::len).sum()
    }
}

/// Enumerates every tile covering the region.
///
/// Tiles are returned once each, ordered by zoom and then row-major within a
/// zoom level. An empty `zoom_levels` list yields no tiles.
pub fn coverage(region: &BoundingRegion) -> Vec<TileCoord> {
    region
        .tile_ranges()
        .iter()
        .flat_map(TileRange::tiles)
        .collect()
}
