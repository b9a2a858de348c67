//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels whose grid side (`2^zoom`) fits in a `u32` tile index.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 30;

/// Side length of the tile raster that pixel offsets address.
pub const TILE_PIXELS: u32 = 256;

/// Divisor used to turn a pixel offset into a fraction of a tile.
///
/// Offsets are scaled by 255 rather than 256, so pixel 255 lands exactly on
/// the next tile's edge. Stored cluster coordinates depend on this.
pub const PIXEL_SCALE: f64 = 255.0;

/// Tile coordinates in the slippy-map scheme.
///
/// Invariant: `x < 2^z` and `y < 2^z`. Use [`TileCoord::new`] to construct a
/// validated coordinate from untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u8,
    /// Column (east-west), 0 at the antimeridian
    pub x: u32,
    /// Row (north-south), 0 at the north edge
    pub y: u32,
}

impl TileCoord {
    /// Creates a tile coordinate, checking it lies inside the zoom's grid.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        let side = grid_side(z)?;
        if u64::from(x) >= side || u64::from(y) >= side {
            return Err(CoordError::TileOutOfGrid { z, x, y });
        }
        Ok(Self { z, x, y })
    }

    /// Geographic position of a pixel inside this tile.
    #[inline]
    pub fn lon_lat_at(&self, pixel: PixelOffset) -> LonLat {
        super::tile_pixel_to_lon_lat(self, pixel)
    }

    /// Geographic position of the tile's central pixel `(128, 128)`.
    #[inline]
    pub fn center(&self) -> LonLat {
        self.lon_lat_at(PixelOffset::CENTER)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Position within a 256×256 tile raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelOffset {
    /// Column within the tile
    pub i: u8,
    /// Row within the tile
    pub j: u8,
}

impl PixelOffset {
    /// Top-left pixel.
    pub const ORIGIN: PixelOffset = PixelOffset { i: 0, j: 0 };
    /// Pixel used as a tile's representative point.
    pub const CENTER: PixelOffset = PixelOffset { i: 128, j: 128 };
    /// Far corner used for the inclusive upper edge of request bounds.
    pub const FAR_CORNER: PixelOffset = PixelOffset { i: 254, j: 254 };

    /// Creates a pixel offset from raw worker values.
    pub fn new(i: i64, j: i64) -> Result<Self, CoordError> {
        match (u8::try_from(i), u8::try_from(j)) {
            (Ok(i), Ok(j)) => Ok(Self { i, j }),
            _ => Err(CoordError::InvalidPixel { i, j }),
        }
    }
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `[lon, lat]` pair, GeoJSON position order.
    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Number of tiles along one side of the grid at `zoom`.
pub(crate) fn grid_side(zoom: u8) -> Result<u64, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(1u64 << zoom)
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside the Web Mercator range or not finite
    InvalidLatitude(f64),
    /// Longitude is outside valid range or not finite
    InvalidLongitude(f64),
    /// Zoom level is outside valid range
    InvalidZoom(u8),
    /// Tile index does not exist at this zoom
    TileOutOfGrid { z: u8, x: u32, y: u32 },
    /// Pixel offset outside the 256×256 raster
    InvalidPixel { i: i64, j: i64 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::TileOutOfGrid { z, x, y } => {
                write!(f, "Tile {}/{}/{} is outside the zoom {} grid", z, x, y, z)
            }
            CoordError::InvalidPixel { i, j } => {
                write!(
                    f,
                    "Invalid pixel offset: ({}, {}) (must be within 0..{})",
                    i, j, TILE_PIXELS
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
