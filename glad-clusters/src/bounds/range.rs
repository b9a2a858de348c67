//! Rectangular tile ranges.

use serde::Serialize;

use crate::config::ConfigurationError;
use crate::coord::{grid_side, LonLat, PixelOffset, TileCoord};

/// Rectangle of tiles at a fixed zoom.
///
/// Invariants: `x_min ≤ x_max`, `y_min ≤ y_max`, and every index lies inside
/// the zoom's grid. Fields are private so the invariants survive construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileBounds {
    z: u8,
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl TileBounds {
    /// Build the rectangle spanned by two corner tiles, in any order.
    pub fn new(z: u8, a: (u32, u32), b: (u32, u32)) -> Result<Self, ConfigurationError> {
        let side = grid_side(z).map_err(|_| ConfigurationError::InvalidZoom(z))?;
        for (x, y) in [a, b] {
            if u64::from(x) >= side || u64::from(y) >= side {
                return Err(ConfigurationError::TileOutOfGrid {
                    zoom: z,
                    x,
                    y,
                    max_index: side - 1,
                });
            }
        }
        Ok(Self {
            z,
            x_min: a.0.min(b.0),
            y_min: a.1.min(b.1),
            x_max: a.0.max(b.0),
            y_max: a.1.max(b.1),
        })
    }

    /// A one-tile rectangle.
    pub fn single(tile: TileCoord) -> Self {
        Self {
            z: tile.z,
            x_min: tile.x,
            y_min: tile.y,
            x_max: tile.x,
            y_max: tile.y,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.z
    }

    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    /// Number of tiles in the rectangle.
    pub fn request_size(&self) -> u64 {
        u64::from(self.x_max - self.x_min + 1) * u64::from(self.y_max - self.y_min + 1)
    }

    pub fn contains(&self, tile: &TileCoord) -> bool {
        tile.z == self.z
            && (self.x_min..=self.x_max).contains(&tile.x)
            && (self.y_min..=self.y_max).contains(&tile.y)
    }

    /// Every tile in the rectangle, column by column.
    pub fn tiles(&self) -> TileBoundsIter {
        TileBoundsIter {
            bounds: *self,
            next_x: self.x_min,
            next_y: self.y_min,
            remaining: self.request_size(),
        }
    }

    /// Geographic rectangle covered by the range.
    ///
    /// Corners are taken at pixel `(0, 0)` of the first tile and pixel
    /// `(254, 254)` of the last tile. The 254 is deliberate and must not be
    /// changed to 255: stored bounds computed this way are compared against it.
    pub fn geo_bounds(&self) -> GeoBounds {
        let first = TileCoord {
            z: self.z,
            x: self.x_min,
            y: self.y_min,
        };
        let last = TileCoord {
            z: self.z,
            x: self.x_max,
            y: self.y_max,
        };
        let north_west = first.lon_lat_at(PixelOffset::ORIGIN);
        let south_east = last.lon_lat_at(PixelOffset::FAR_CORNER);
        GeoBounds {
            min: LonLat::new(
                north_west.lon.min(south_east.lon),
                north_west.lat.min(south_east.lat),
            ),
            max: LonLat::new(
                north_west.lon.max(south_east.lon),
                north_west.lat.max(south_east.lat),
            ),
        }
    }
}

impl IntoIterator for &TileBounds {
    type Item = TileCoord;
    type IntoIter = TileBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

/// Iterator over the tiles of a [`TileBounds`].
#[derive(Debug, Clone)]
pub struct TileBoundsIter {
    bounds: TileBounds,
    next_x: u32,
    next_y: u32,
    remaining: u64,
}

impl Iterator for TileBoundsIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tile = TileCoord {
            z: self.bounds.z,
            x: self.next_x,
            y: self.next_y,
        };
        self.remaining -= 1;
        if self.next_y == self.bounds.y_max {
            self.next_y = self.bounds.y_min;
            self.next_x += 1;
        } else {
            self.next_y += 1;
        }
        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileBoundsIter {}

/// Longitude/latitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    /// South-west corner
    pub min: LonLat,
    /// North-east corner
    pub max: LonLat,
}

impl GeoBounds {
    /// `[[lon_min, lat_min], [lon_max, lat_max]]`
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [self.min.to_array(), self.max.to_array()]
    }

    /// Closed polygon ring, counter-clockwise from the south-west corner.
    pub fn ring(&self) -> [LonLat; 5] {
        [
            self.min,
            LonLat::new(self.max.lon, self.min.lat),
            self.max,
            LonLat::new(self.min.lon, self.max.lat),
            self.min,
        ]
    }
}
