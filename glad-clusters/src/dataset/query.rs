//! Cluster lookups.

use crate::aggregate::ClusterRecord;
use crate::coord::{LonLat, TileCoord};

/// Where to look for a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryLocation {
    /// Any cluster in this tile
    Tile(TileCoord),
    /// A cluster at exactly this position
    LonLat(LonLat),
}

/// Criteria for [`Dataset::find`](super::Dataset::find).
///
/// Without a location every row matches. Among the matches the latest
/// timestamp wins unless `ascending` is set.
///
/// ```
/// use glad_clusters::dataset::ClusterQuery;
///
/// let query = ClusterQuery::new()
///     .at_tile(12, 1400, 2050)
///     .ascending(true);
/// assert!(query.is_ascending());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterQuery {
    location: Option<QueryLocation>,
    timestamp: Option<String>,
    ascending: bool,
}

impl ClusterQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_tile(mut self, z: u8, x: u32, y: u32) -> Self {
        self.location = Some(QueryLocation::Tile(TileCoord { z, x, y }));
        self
    }

    pub fn at_lon_lat(mut self, lon: f64, lat: f64) -> Self {
        self.location = Some(QueryLocation::LonLat(LonLat::new(lon, lat)));
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Pick the earliest match instead of the latest.
    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    pub fn location(&self) -> Option<QueryLocation> {
        self.location
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub(super) fn matches(&self, record: &ClusterRecord) -> bool {
        let location_matches = match self.location {
            None => true,
            Some(QueryLocation::Tile(tile)) => record.tile() == tile,
            Some(QueryLocation::LonLat(point)) => {
                record.longitude == point.lon && record.latitude == point.lat
            }
        };
        location_matches
            && self
                .timestamp
                .as_deref()
                .map_or(true, |ts| record.timestamp == ts)
    }
}
