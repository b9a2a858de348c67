//! Classification of raw responses into table rows.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::payload::{error_message, error_trace, SuccessPayload};
use super::records::{ClusterRecord, ErrorRecord};
use crate::coord::{tile_pixel_to_lon_lat, PixelOffset, TileCoord};
use crate::dispatch::{RawResponse, ResponseBody};

/// Trace tag for worker-reported failures that carry no trace of their own.
pub const TRACE_ERROR: &str = "aggregate.error";

/// Trace tag for success-shaped payloads that could not be read.
pub const TRACE_MALFORMED: &str = "aggregate.malformed";

/// Row counts for one aggregation.
///
/// `responses == error_rows + tiles_with_clusters + empty_tiles`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub responses: usize,
    pub cluster_rows: usize,
    pub tiles_with_clusters: usize,
    pub error_rows: usize,
    pub empty_tiles: usize,
}

/// Tables built from a batch of responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Sorted by timestamp, latest first
    pub clusters: Vec<ClusterRecord>,
    pub errors: Vec<ErrorRecord>,
    /// Tiles that answered successfully with zero clusters
    pub empty_tiles: Vec<TileCoord>,
    pub summary: AggregateSummary,
}

/// How one response was classified.
enum Classified {
    Clusters(Vec<ClusterRecord>),
    Empty,
    Error(ErrorRecord),
}

/// Consume the responses and build the cluster and error tables.
pub fn aggregate(responses: Vec<RawResponse>) -> Aggregation {
    let mut aggregation = Aggregation {
        summary: AggregateSummary {
            responses: responses.len(),
            ..Default::default()
        },
        ..Default::default()
    };

    for response in responses {
        let tile = response.tile;
        match classify(response) {
            Classified::Clusters(rows) => {
                debug!(tile = %tile, clusters = rows.len(), "Tile produced clusters");
                aggregation.summary.tiles_with_clusters += 1;
                aggregation.clusters.extend(rows);
            }
            Classified::Empty => {
                debug!(tile = %tile, "Tile produced no clusters");
                aggregation.empty_tiles.push(tile);
            }
            Classified::Error(row) => aggregation.errors.push(row),
        }
    }

    aggregation
        .clusters
        .sort_by(|a, b| compare_timestamps(&b.timestamp, &a.timestamp));
    aggregation.empty_tiles.sort();

    aggregation.summary.cluster_rows = aggregation.clusters.len();
    aggregation.summary.error_rows = aggregation.errors.len();
    aggregation.summary.empty_tiles = aggregation.empty_tiles.len();

    info!(
        responses = aggregation.summary.responses,
        cluster_rows = aggregation.summary.cluster_rows,
        tiles_with_clusters = aggregation.summary.tiles_with_clusters,
        error_rows = aggregation.summary.error_rows,
        empty_tiles = aggregation.summary.empty_tiles,
        "Aggregated tile responses"
    );

    aggregation
}

fn classify(response: RawResponse) -> Classified {
    let tile = response.tile;
    let payload = match response.body {
        ResponseBody::InvocationFailed { error, trace } => {
            return Classified::Error(ErrorRecord::for_tile(tile, error, trace));
        }
        ResponseBody::Payload(payload) => payload,
    };

    if let Some(error) = error_message(&payload) {
        let trace = error_trace(&payload).unwrap_or_else(|| TRACE_ERROR.to_string());
        warn!(tile = %tile, error = %error, trace = %trace, "Worker reported failure");
        return Classified::Error(ErrorRecord::for_tile(tile, error, trace));
    }

    match cluster_rows(tile, payload) {
        Ok(rows) if rows.is_empty() => Classified::Empty,
        Ok(rows) => Classified::Clusters(rows),
        Err(e) => {
            warn!(tile = %tile, error = %e, "Malformed worker payload");
            Classified::Error(ErrorRecord::for_tile(
                tile,
                format!("malformed payload: {}", e),
                TRACE_MALFORMED,
            ))
        }
    }
}

fn cluster_rows(tile: TileCoord, payload: Value) -> Result<Vec<ClusterRecord>, serde_json::Error> {
    let payload: SuccessPayload = serde_json::from_value(payload)?;
    let (file_name, timestamp, clusters) = payload.into_clusters();

    Ok(clusters
        .into_iter()
        .map(|cluster| {
            let position = tile_pixel_to_lon_lat(&tile, PixelOffset { i: cluster.i, j: cluster.j });
            ClusterRecord {
                count: cluster.count,
                area: cluster.area,
                min_date: cluster.min_date,
                max_date: cluster.max_date,
                longitude: position.lon,
                latitude: position.lat,
                z: tile.z,
                x: tile.x,
                y: tile.y,
                i: cluster.i,
                j: cluster.j,
                file_name: file_name.clone(),
                timestamp: timestamp.clone(),
                alerts: cluster.alerts,
            }
        })
        .collect())
}

/// Total order on timestamps.
///
/// Numeric timestamps compare as numbers and rank above every non-numeric
/// one, so a descending sort puts them first. Non-numeric timestamps compare
/// as text among themselves.
pub(crate) fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (numeric_timestamp(a), numeric_timestamp(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

fn numeric_timestamp(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{TRACE_INVOKE, TRACE_PANIC};
    use serde_json::json;

    fn tile(x: u32, y: u32) -> TileCoord {
        TileCoord { z: 12, x, y }
    }

    fn success(timestamp: &str, clusters: Value) -> Value {
        json!({"file_name": "f.tif", "timestamp": timestamp, "data": {"clusters": clusters}})
    }

    fn cluster(i: u8, j: u8) -> Value {
        json!({"count": 30, "area": 12, "min_date": "20200101", "max_date": "20200301",
               "i": i, "j": j, "alerts": [[1, 2]]})
    }

    #[test]
    fn test_mixed_batch_counts_balance() {
        let responses = vec![
            RawResponse::payload(tile(1, 1), success("100", json!([cluster(0, 0), cluster(10, 10)]))),
            RawResponse::payload(tile(1, 2), success("200", json!([]))),
            RawResponse::payload(tile(1, 3), json!({"errorMessage": "Task timed out"})),
            RawResponse::failed(tile(1, 4), "connection reset", TRACE_INVOKE),
            RawResponse::payload(tile(1, 5), json!({"file_name": "f"})),
        ];

        let result = aggregate(responses);
        let s = result.summary;

        assert_eq!(s.responses, 5);
        assert_eq!(s.cluster_rows, 2);
        assert_eq!(s.tiles_with_clusters, 1);
        assert_eq!(s.error_rows, 3);
        assert_eq!(s.empty_tiles, 1);
        assert_eq!(s.responses, s.error_rows + s.tiles_with_clusters + s.empty_tiles);
        assert_eq!(result.empty_tiles, vec![tile(1, 2)]);
    }

    #[test]
    fn test_cluster_position_from_local_pixel() {
        let t = TileCoord { z: 10, x: 341, y: 520 };
        let result = aggregate(vec![RawResponse::payload(t, success("1", json!([cluster(128, 128)])))]);

        let row = &result.clusters[0];
        assert!((row.longitude - -59.94071691176471).abs() < 1e-9);
        assert!((row.latitude - -2.987615794853717).abs() < 1e-9);
        assert_eq!((row.z, row.x, row.y, row.i, row.j), (10, 341, 520, 128, 128));
        assert_eq!(row.file_name, "f.tif");
    }

    #[test]
    fn test_sorted_by_timestamp_descending() {
        let responses = vec![
            RawResponse::payload(tile(1, 1), success("9", json!([cluster(1, 1)]))),
            RawResponse::payload(tile(1, 2), success("100", json!([cluster(2, 2)]))),
            RawResponse::payload(tile(1, 3), success("20", json!([cluster(3, 3)]))),
        ];

        let result = aggregate(responses);
        let timestamps: Vec<_> = result.clusters.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(timestamps, vec!["100", "20", "9"]);
    }

    #[test]
    fn test_timestamp_order_is_transitive_for_mixed_input() {
        let values = ["9", "10", "1a", "", "nan", "2020-01-01", "1e3", "-5"];

        for a in values {
            assert_eq!(compare_timestamps(a, a), Ordering::Equal);
            for b in values {
                assert_eq!(compare_timestamps(a, b), compare_timestamps(b, a).reverse());
                for c in values {
                    if compare_timestamps(a, b) == Ordering::Less
                        && compare_timestamps(b, c) == Ordering::Less
                    {
                        assert_eq!(compare_timestamps(a, c), Ordering::Less, "{a} < {b} < {c}");
                    }
                }
            }
        }

        assert_eq!(compare_timestamps("9", "10"), Ordering::Less);
        assert_eq!(compare_timestamps("10", "1a"), Ordering::Greater);
        assert_eq!(compare_timestamps("1a", "9"), Ordering::Less);
    }

    #[test]
    fn test_mixed_timestamps_sorted_numbers_first() {
        let responses = vec![
            RawResponse::payload(tile(1, 1), success("1a", json!([cluster(1, 1)]))),
            RawResponse::payload(tile(1, 2), success("9", json!([cluster(2, 2)]))),
            RawResponse::payload(tile(1, 3), success("b", json!([cluster(3, 3)]))),
            RawResponse::payload(tile(1, 4), success("10", json!([cluster(4, 4)]))),
        ];

        let result = aggregate(responses);
        let timestamps: Vec<_> = result.clusters.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(timestamps, vec!["10", "9", "b", "1a"]);
        assert!(result
            .clusters
            .windows(2)
            .all(|w| compare_timestamps(&w[0].timestamp, &w[1].timestamp) != Ordering::Less));
    }

    #[test]
    fn test_sort_is_stable_within_a_timestamp() {
        let result = aggregate(vec![RawResponse::payload(
            tile(1, 1),
            success("5", json!([cluster(1, 1), cluster(2, 2), cluster(3, 3)])),
        )]);
        let pixels: Vec<_> = result.clusters.iter().map(|r| r.i).collect();
        assert_eq!(pixels, vec![1, 2, 3]);
    }

    #[test]
    fn test_error_payload_trace_defaults_and_is_preserved() {
        let responses = vec![
            RawResponse::payload(tile(2, 1), json!({"error": "bad input"})),
            RawResponse::payload(tile(2, 2), json!({"error": "x", "error_trace": "worker.7"})),
        ];
        let result = aggregate(responses);

        let trace_for = |y| {
            result
                .errors
                .iter()
                .find(|e| e.y == Some(y))
                .map(|e| e.error_trace.clone())
                .unwrap()
        };
        assert_eq!(trace_for(1), TRACE_ERROR);
        assert_eq!(trace_for(2), "worker.7");
    }

    #[test]
    fn test_invocation_failure_keeps_dispatch_trace() {
        let result = aggregate(vec![RawResponse::failed(tile(3, 3), "worker panicked: x", TRACE_PANIC)]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].error_trace, TRACE_PANIC);
        assert_eq!(result.errors[0].error, "worker panicked: x");
    }

    #[test]
    fn test_malformed_payload_becomes_error_row() {
        let responses = vec![
            RawResponse::payload(tile(4, 1), json!(null)),
            RawResponse::payload(tile(4, 2), json!({"timestamp": "1"})),
            RawResponse::payload(
                tile(4, 3),
                success("1", json!([{"count": 1, "area": 1, "min_date": "d", "max_date": "d", "i": 300, "j": 0}])),
            ),
        ];
        let result = aggregate(responses);

        assert_eq!(result.errors.len(), 3);
        assert!(result.clusters.is_empty());
        assert!(result.errors.iter().all(|e| e.error_trace == TRACE_MALFORMED));
        assert!(result.errors.iter().all(|e| e.error.starts_with("malformed payload")));
    }

    #[test]
    fn test_compare_timestamps() {
        assert_eq!(compare_timestamps("10", "9"), Ordering::Greater);
        assert_eq!(compare_timestamps("2021-01-02", "2021-01-01"), Ordering::Greater);
        assert_eq!(compare_timestamps("5", "5"), Ordering::Equal);
    }
}
