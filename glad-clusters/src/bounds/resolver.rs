//! Location input shapes and their resolution to a tile range.

use tracing::debug;

use super::range::TileBounds;
use crate::config::ConfigurationError;
use crate::coord::{lon_lat_to_tile, LonLat, TileCoord};
use crate::error::RunError;

/// The four ways a request can name its area of interest.
///
/// Any combination may be set; [`resolve`] uses the highest-precedence one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSpec {
    tile_bounds: Option<[(u32, u32); 2]>,
    bounds: Option<[LonLat; 2]>,
    point: Option<LonLat>,
    tile: Option<(u32, u32)>,
}

impl LocationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two opposite corner tiles `(x, y)`.
    pub fn with_tile_bounds(mut self, a: (u32, u32), b: (u32, u32)) -> Self {
        self.tile_bounds = Some([a, b]);
        self
    }

    /// Two opposite corners as `(lon, lat)`.
    pub fn with_bounds(mut self, a: (f64, f64), b: (f64, f64)) -> Self {
        self.bounds = Some([LonLat::new(a.0, a.1), LonLat::new(b.0, b.1)]);
        self
    }

    /// A single geographic point.
    pub fn with_point(mut self, lon: f64, lat: f64) -> Self {
        self.point = Some(LonLat::new(lon, lat));
        self
    }

    /// A single tile `(x, y)`.
    pub fn with_tile(mut self, x: u32, y: u32) -> Self {
        self.tile = Some((x, y));
        self
    }

    /// The shape that will be used, if any was supplied.
    pub fn shape(&self) -> Option<LocationShape> {
        if self.tile_bounds.is_some() {
            Some(LocationShape::TileBounds)
        } else if self.bounds.is_some() {
            Some(LocationShape::LonLatBounds)
        } else if self.point.is_some() {
            Some(LocationShape::Point)
        } else if self.tile.is_some() {
            Some(LocationShape::Tile)
        } else {
            None
        }
    }

    fn supplied(&self) -> usize {
        [
            self.tile_bounds.is_some(),
            self.bounds.is_some(),
            self.point.is_some(),
            self.tile.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// Which input shape a range was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationShape {
    TileBounds,
    LonLatBounds,
    Point,
    Tile,
}

impl LocationShape {
    /// Single-tile shapes skip the grid fan-out.
    pub fn is_point(&self) -> bool {
        matches!(self, LocationShape::Point | LocationShape::Tile)
    }
}

/// Outcome of resolving a [`LocationSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    /// Normalized tile rectangle
    pub bounds: TileBounds,
    /// The single requested tile, for point-shaped inputs
    pub focus: Option<TileCoord>,
    /// Shape the range came from
    pub shape: LocationShape,
}

/// Resolve a location to a tile range at `zoom`.
///
/// # Errors
///
/// - [`ConfigurationError::NoLocation`] when no shape was supplied
/// - [`ConfigurationError::TileOutOfGrid`] / [`ConfigurationError::InvalidZoom`]
///   for tile inputs that don't exist at `zoom`
/// - [`RunError::InvalidCoordinate`] for lon/lat inputs outside Web Mercator
pub fn resolve(spec: &LocationSpec, zoom: u8) -> Result<ResolvedRange, RunError> {
    let shape = spec.shape().ok_or(ConfigurationError::NoLocation)?;
    if spec.supplied() > 1 {
        debug!(
            ?shape,
            supplied = spec.supplied(),
            "Multiple location shapes supplied, using highest precedence"
        );
    }

    let (bounds, focus) = if let Some([a, b]) = spec.tile_bounds {
        (TileBounds::new(zoom, a, b)?, None)
    } else if let Some([a, b]) = spec.bounds {
        let a = lon_lat_to_tile(a.lon, a.lat, zoom)?;
        let b = lon_lat_to_tile(b.lon, b.lat, zoom)?;
        (TileBounds::new(zoom, (a.x, a.y), (b.x, b.y))?, None)
    } else if let Some(point) = spec.point {
        let tile = lon_lat_to_tile(point.lon, point.lat, zoom)?;
        (TileBounds::single(tile), Some(tile))
    } else if let Some((x, y)) = spec.tile {
        let bounds = TileBounds::new(zoom, (x, y), (x, y))?;
        (bounds, Some(TileCoord { z: zoom, x, y }))
    } else {
        return Err(ConfigurationError::NoLocation.into());
    };

    debug!(
        ?shape,
        zoom,
        x_min = bounds.x_min(),
        x_max = bounds.x_max(),
        y_min = bounds.y_min(),
        y_max = bounds.y_max(),
        "Resolved tile range"
    );

    Ok(ResolvedRange {
        bounds,
        focus,
        shape,
    })
}
