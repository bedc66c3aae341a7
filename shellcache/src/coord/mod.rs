//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator slippy-map tile coordinates, plus the bounding-region
//! coverage used to decide which map tiles are precached.

mod region;
mod types;

pub use region::{coverage, BoundingRegion};
pub use types::{
    tiles_per_axis, CoordError, TileCoord, TileRange, TileRangeIterator, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to the tile containing them.
///
/// Uses the canonical slippy-map formula:
///
/// ```text
/// n = 2^zoom
/// x = floor((lon + 180) / 360 * n)
/// y = floor((1 - ln(tan(lat_rad) + sec(lat_rad)) / π) / 2 * n)
/// ```
///
/// Inputs are not validated. Results are clamped into `[0, n - 1]` so the
/// eastern edge (`lon == 180`) and latitudes at the Mercator limit still
/// produce a tile inside the grid. Use [`to_tile_coords`] for checked input.
#[inline]
pub fn tile_of(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    let zoom = zoom.min(MAX_ZOOM);
    let n = 2.0_f64.powi(zoom as i32);
    let max_index = n - 1.0;

    let x = ((lon + 180.0) / 360.0 * n).floor();

    let lat_rad = lat.to_radians();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    TileCoord {
        zoom,
        x: clamp_index(x, max_index),
        y: clamp_index(y, max_index),
    }
}

/// Converts geographic coordinates to tile coordinates, rejecting input
/// outside the Web Mercator domain.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    Ok(tile_of(lat, lon, zoom))
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    (lat_rad.to_degrees(), lon)
}

#[inline]
fn clamp_index(value: f64, max_index: f64) -> u32 {
    // NaN (e.g. latitude exactly at a pole) lands on row 0
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, max_index) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = tile_of(40.7128, -74.0060, 16);
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_reference_corners_at_zoom_12() {
        // South-west and north-east corners of the default guestbook region
        let sw = tile_of(29.18, -82.98, 12);
        let ne = tile_of(31.48, -80.32, 12);

        assert_eq!((sw.x, sw.y), (1103, 1700));
        assert_eq!((ne.x, ne.y), (1134, 1670));
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        let tile = tile_of(45.0, 120.0, 0);
        assert_eq!(tile, TileCoord { zoom: 0, x: 0, y: 0 });
    }

    #[test]
    fn test_eastern_edge_is_clamped() {
        let tile = tile_of(0.0, 180.0, 4);
        assert_eq!(tile.x, 15);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = to_tile_coords(90.0, 0.0, 10);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = to_tile_coords(10.0, 10.0, 30);
        assert!(matches!(result, Err(CoordError::InvalidZoom(30))));
    }

    #[test]
    fn test_checked_matches_unchecked() {
        let checked = to_tile_coords(51.5074, -0.1278, 12).unwrap();
        assert_eq!(checked, tile_of(51.5074, -0.1278, 12));
    }

    #[test]
    fn test_tile_to_lat_lon_at_equator() {
        let tile = TileCoord {
            zoom: 10,
            x: 512,
            y: 512,
        };

        let (lat, lon) = tile_to_lat_lon(&tile);

        assert!(lat.abs() < 1.0, "Should be near equator");
        assert!(lon.abs() < 1.0, "Should be near prime meridian");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_tile_of_is_deterministic(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                prop_assert_eq!(tile_of(lat, lon, zoom), tile_of(lat, lon, zoom));
            }

            #[test]
            fn test_tile_of_in_bounds(
                lat in -85.05..85.05_f64,
                lon in -180.0..=180.0_f64,
                zoom in 0u8..=22
            ) {
                let tile = tile_of(lat, lon, zoom);
                let n = tiles_per_axis(zoom);

                prop_assert!(tile.x < n, "x {} exceeds {} at zoom {}", tile.x, n, zoom);
                prop_assert!(tile.y < n, "y {} exceeds {} at zoom {}", tile.y, n, zoom);
                prop_assert_eq!(tile.zoom, zoom);
            }

            #[test]
            fn test_roundtrip_within_one_tile(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let tile = tile_of(lat, lon, zoom);
                let (nw_lat, nw_lon) = tile_to_lat_lon(&tile);
                let tile_size = 360.0 / 2.0_f64.powi(zoom as i32);

                prop_assert!((nw_lat - lat).abs() < tile_size);
                prop_assert!((nw_lon - lon).abs() < tile_size);
            }

            #[test]
            fn test_latitude_increase_never_increases_y(
                lat1 in -80.0..0.0_f64,
                lat2 in 0.0..80.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                // Tile rows are numbered from the north
                let south = tile_of(lat1, lon, zoom);
                let north = tile_of(lat2, lon, zoom);
                prop_assert!(north.y <= south.y);
            }

            #[test]
            fn test_reject_invalid_longitude(
                lat in -85.0..85.0_f64,
                lon in 180.01..360.0_f64,
                zoom in 0u8..=18
            ) {
                let result = to_tile_coords(lat, lon, zoom);
                prop_assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
            }
        }
    }
}
