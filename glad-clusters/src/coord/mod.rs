//! Coordinate conversion module
//!
//! Converts between geographic coordinates (longitude/latitude) and
//! slippy-map tile coordinates, and from a pixel inside a tile back to a
//! geographic position. Everything here is pure and allocation free.

mod types;

pub use types::{
    CoordError, LonLat, PixelOffset, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
    MIN_ZOOM, PIXEL_SCALE, TILE_PIXELS,
};

pub(crate) use types::grid_side;

use std::f64::consts::PI;

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `zoom` - Zoom level (0 to 30)
///
/// Points on the closed east or south edge of the map are clamped into the
/// last column/row so the returned tile always exists.
#[inline]
pub fn lon_lat_to_tile(lon: f64, lat: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    // NaN fails both range checks
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    let side = grid_side(zoom)?;
    let n = side as f64;

    let x = (n * (lon + 180.0) / 360.0).floor();

    let lat_rad = lat.to_radians();
    let mercator = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    let y = (n * (1.0 - mercator / PI) / 2.0).floor();

    Ok(TileCoord {
        z: zoom,
        x: clamp_index(x, side - 1),
        y: clamp_index(y, side - 1),
    })
}

/// Converts a pixel inside a tile to geographic coordinates.
///
/// Pixel offsets are scaled by [`PIXEL_SCALE`] (255), so `(0, 0)` is the
/// tile's north-west corner and `(255, 255)` its south-east corner.
#[inline]
pub fn tile_pixel_to_lon_lat(tile: &TileCoord, pixel: PixelOffset) -> LonLat {
    let n = 2.0_f64.powi(i32::from(tile.z));

    let fx = f64::from(tile.x) + f64::from(pixel.i) / PIXEL_SCALE;
    let lon = (360.0 / n) * fx - 180.0;

    let fy = f64::from(tile.y) + f64::from(pixel.j) / PIXEL_SCALE;
    let lat = (PI * (1.0 - 2.0 * fy / n)).sinh().atan().to_degrees();

    LonLat { lon, lat }
}

fn clamp_index(value: f64, max_index: u64) -> u32 {
    // max_index < 2^30, always fits
    (value.max(0.0) as u64).min(max_index) as u32
}
