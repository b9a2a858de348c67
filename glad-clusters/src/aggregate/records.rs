//! Output table rows.

use serde::{Deserialize, Serialize};

use crate::coord::TileCoord;

/// One alert pixel contributing to a cluster.
///
/// Serialized the way the worker sends it: `[row, col]` or
/// `[row, col, weight]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct AlertHit {
    pub row: i64,
    pub col: i64,
    pub weight: Option<i64>,
}

impl TryFrom<Vec<i64>> for AlertHit {
    type Error = String;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [row, col] => Ok(Self {
                row: *row,
                col: *col,
                weight: None,
            }),
            [row, col, weight] => Ok(Self {
                row: *row,
                col: *col,
                weight: Some(*weight),
            }),
            other => Err(format!(
                "alert must have 2 or 3 elements, got {}",
                other.len()
            )),
        }
    }
}

impl From<AlertHit> for Vec<i64> {
    fn from(hit: AlertHit) -> Self {
        let mut values = vec![hit.row, hit.col];
        values.extend(hit.weight);
        values
    }
}

/// A row of the cluster table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub count: u64,
    pub area: u64,
    pub min_date: String,
    pub max_date: String,
    pub longitude: f64,
    pub latitude: f64,
    pub z: u8,
    pub x: u32,
    pub y: u32,
    pub i: u8,
    pub j: u8,
    pub file_name: String,
    pub timestamp: String,
    pub alerts: Vec<AlertHit>,
}

impl ClusterRecord {
    pub fn tile(&self) -> TileCoord {
        TileCoord {
            z: self.z,
            x: self.x,
            y: self.y,
        }
    }

    /// Projection onto the view columns.
    pub fn view(&self) -> ClusterView {
        ClusterView {
            count: self.count,
            area: self.area,
            min_date: self.min_date.clone(),
            max_date: self.max_date.clone(),
            longitude: self.longitude,
            latitude: self.latitude,
            x: self.x,
            y: self.y,
            timestamp: self.timestamp.clone(),
        }
    }
}

/// Cluster row without the raw inputs (alerts, zoom, pixel, source file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterView {
    pub count: u64,
    pub area: u64,
    pub min_date: String,
    pub max_date: String,
    pub longitude: f64,
    pub latitude: f64,
    pub x: u32,
    pub y: u32,
    pub timestamp: String,
}

/// A row of the error table. One per failed tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub z: u8,
    pub x: Option<u32>,
    pub y: Option<u32>,
    /// Longitude of the tile's central pixel
    pub centroid_longitude: Option<f64>,
    pub centroid_latitude: Option<f64>,
    pub error: String,
    pub error_trace: String,
}

impl ErrorRecord {
    /// Error row for `tile`, centred on pixel `(128, 128)`.
    pub fn for_tile(tile: TileCoord, error: impl Into<String>, trace: impl Into<String>) -> Self {
        let centroid = tile.center();
        Self {
            z: tile.z,
            x: Some(tile.x),
            y: Some(tile.y),
            centroid_longitude: Some(centroid.lon),
            centroid_latitude: Some(centroid.lat),
            error: error.into(),
            error_trace: trace.into(),
        }
    }

    /// The tile, when the row carries one.
    pub fn tile(&self) -> Option<TileCoord> {
        Some(TileCoord {
            z: self.z,
            x: self.x?,
            y: self.y?,
        })
    }
}
