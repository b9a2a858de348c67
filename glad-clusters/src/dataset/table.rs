//! Cluster and error tables.

use std::collections::BTreeSet;

use thiserror::Error;

use super::query::ClusterQuery;
use crate::aggregate::{
    compare_timestamps, AggregateSummary, Aggregation, ClusterRecord, ClusterView, ErrorRecord,
};
use crate::bounds::TileBounds;
use crate::coord::TileCoord;

/// Columns of the cluster table, in order.
pub const CLUSTER_COLUMNS: [&str; 14] = [
    "count",
    "area",
    "min_date",
    "max_date",
    "longitude",
    "latitude",
    "z",
    "x",
    "y",
    "i",
    "j",
    "file_name",
    "timestamp",
    "alerts",
];

/// Columns of [`ClusterView`], in order.
pub const VIEW_COLUMNS: [&str; 9] = [
    "count",
    "area",
    "min_date",
    "max_date",
    "longitude",
    "latitude",
    "x",
    "y",
    "timestamp",
];

/// Columns of the error table, in order.
pub const ERROR_COLUMNS: [&str; 7] = [
    "z",
    "x",
    "y",
    "centroid_longitude",
    "centroid_latitude",
    "error",
    "error_trace",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("Row {row_id} out of range (table has {rows} rows)")]
    OutOfRange { row_id: usize, rows: usize },

    #[error("No cluster matches the query")]
    NoMatch,
}

/// Results of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    bounds: TileBounds,
    clusters: Vec<ClusterRecord>,
    errors: Vec<ErrorRecord>,
    empty_tiles: Vec<TileCoord>,
    summary: AggregateSummary,
}

impl Dataset {
    /// Wrap a finished aggregation for the range it was computed over.
    pub fn new(bounds: TileBounds, aggregation: Aggregation) -> Self {
        Self {
            bounds,
            clusters: aggregation.clusters,
            errors: aggregation.errors,
            empty_tiles: aggregation.empty_tiles,
            summary: aggregation.summary,
        }
    }

    /// Wrap tables produced elsewhere.
    ///
    /// Empty tiles can't be recovered from stored tables, so the summary
    /// counts only what the rows show.
    pub fn from_tables(
        bounds: TileBounds,
        mut clusters: Vec<ClusterRecord>,
        errors: Vec<ErrorRecord>,
    ) -> Self {
        clusters.sort_by(|a, b| compare_timestamps(&b.timestamp, &a.timestamp));
        let tiles_with_clusters = clusters
            .iter()
            .map(ClusterRecord::tile)
            .collect::<BTreeSet<_>>()
            .len();
        let summary = AggregateSummary {
            responses: tiles_with_clusters + errors.len(),
            cluster_rows: clusters.len(),
            tiles_with_clusters,
            error_rows: errors.len(),
            empty_tiles: 0,
        };
        Self {
            bounds,
            clusters,
            errors,
            empty_tiles: Vec::new(),
            summary,
        }
    }

    /// Full cluster table, latest timestamp first.
    pub fn clusters(&self) -> &[ClusterRecord] {
        &self.clusters
    }

    /// Cluster table projected onto [`VIEW_COLUMNS`].
    pub fn view(&self) -> Vec<ClusterView> {
        self.clusters.iter().map(ClusterRecord::view).collect()
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Tiles that answered with zero clusters.
    pub fn empty_tiles(&self) -> &[TileCoord] {
        &self.empty_tiles
    }

    pub fn summary(&self) -> &AggregateSummary {
        &self.summary
    }

    pub fn tile_bounds(&self) -> &TileBounds {
        &self.bounds
    }

    pub fn row(&self, row_id: usize) -> Result<&ClusterRecord, DatasetError> {
        self.clusters.get(row_id).ok_or(DatasetError::OutOfRange {
            row_id,
            rows: self.clusters.len(),
        })
    }

    /// Every row from the same tile as `row_id`, in table order.
    pub fn tile_rows(&self, row_id: usize) -> Result<Vec<&ClusterRecord>, DatasetError> {
        let tile = self.row(row_id)?.tile();
        Ok(self.clusters.iter().filter(|r| r.tile() == tile).collect())
    }

    /// First row matching `query`; see [`ClusterQuery`] for ordering.
    pub fn find(&self, query: &ClusterQuery) -> Result<&ClusterRecord, DatasetError> {
        let mut matches = self.clusters.iter().filter(|r| query.matches(r));
        let found = if query.is_ascending() {
            matches.min_by(|a, b| compare_timestamps(&a.timestamp, &b.timestamp))
        } else {
            matches.next()
        };
        found.ok_or(DatasetError::NoMatch)
    }

    /// Number of tiles in the range.
    pub fn request_size(&self) -> u64 {
        self.bounds.request_size()
    }

    /// `[[lon_min, lat_min], [lon_max, lat_max]]` of the range.
    pub fn bounds(&self) -> [[f64; 2]; 2] {
        self.bounds.geo_bounds().to_array()
    }

    /// Closed ring around [`bounds`](Self::bounds).
    pub fn bounding_box(&self) -> [[f64; 2]; 5] {
        self.bounds.geo_bounds().ring().map(|p| p.to_array())
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.errors.is_empty()
    }
}
