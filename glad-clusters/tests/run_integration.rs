//! Integration tests for complete cluster runs.
//!
//! These tests drive `ClusterRun` end to end with in-process workers:
//! - Point runs that touch a single tile
//! - Grid runs that fan out over a tile rectangle
//! - Worker failures folded into the error table
//! - Concurrency bounds and the re-run guard

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use glad_clusters::bounds::LocationSpec;
use glad_clusters::config::{ConfigFile, DispatchConfig, RunConfig};
use glad_clusters::coord::{PixelOffset, TileCoord};
use glad_clusters::dispatch::TRACE_INVOKE;
use glad_clusters::run::{ClusterRun, RunOptions, RunOutcome};
use glad_clusters::worker::{TileWorker, WorkerError, WorkerRequest};
use serde_json::{json, Value};

// =============================================================================
// Test Helpers
// =============================================================================

/// Answers every tile with a fixed number of clusters and records the tiles.
struct ScriptedWorker {
    clusters_per_tile: usize,
    failing_tile: Option<(u32, u32)>,
    seen: Mutex<Vec<WorkerRequest>>,
}

impl ScriptedWorker {
    fn new(clusters_per_tile: usize) -> Self {
        Self {
            clusters_per_tile,
            failing_tile: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing_at(mut self, x: u32, y: u32) -> Self {
        self.failing_tile = Some((x, y));
        self
    }

    fn tiles(&self) -> Vec<TileCoord> {
        self.seen.lock().unwrap().iter().map(|r| r.tile()).collect()
    }
}

impl TileWorker for ScriptedWorker {
    fn invoke(&self, request: &WorkerRequest) -> Result<Value, WorkerError> {
        self.seen.lock().unwrap().push(request.clone());

        if self.failing_tile == Some((request.x, request.y)) {
            return Ok(json!({"errorMessage": "Task timed out after 600.00 seconds"}));
        }

        let clusters: Vec<Value> = (0..self.clusters_per_tile)
            .map(|n| {
                json!({
                    "count": 30 + n,
                    "area": 5,
                    "min_date": "20200101",
                    "max_date": 20200301,
                    "i": 10 * n,
                    "j": 20,
                    "alerts": [[1, 2], [3, 4, 1]]
                })
            })
            .collect();

        Ok(json!({
            "file_name": format!("{}_{}_{}.png", request.z, request.x, request.y),
            "timestamp": format!("{}", 1_600_000_000 + request.x * 10 + request.y),
            "data": {"clusters": clusters}
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn grid_location() -> LocationSpec {
    // x spans 3, y spans 2: 4 x 3 tiles
    LocationSpec::new().with_tile_bounds((1403, 2048), (1400, 2050))
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_point_run_with_no_clusters() {
    let config = RunConfig::builder().with_zoom(10).build().unwrap();
    let location = LocationSpec::new().with_point(-60.0, -3.0);
    let worker = ScriptedWorker::new(0);

    let mut run = ClusterRun::new(config, &location).unwrap();
    assert_eq!(run.request_size(), 1);
    assert_eq!(run.focus(), Some(TileCoord { z: 10, x: 341, y: 520 }));

    let outcome = run.run(&worker, RunOptions::default()).unwrap();
    assert!(matches!(outcome, RunOutcome::Completed(s) if s.dispatched == 1));
    assert_eq!(worker.tiles(), vec![TileCoord { z: 10, x: 341, y: 520 }]);

    let dataset = run.dataset().unwrap();
    assert!(dataset.clusters().is_empty());
    assert!(dataset.errors().is_empty());
    assert_eq!(dataset.request_size(), 1);
    assert_eq!(dataset.empty_tiles(), &[TileCoord { z: 10, x: 341, y: 520 }]);
}

#[test]
fn test_grid_run_invokes_every_tile_once() {
    let worker = ScriptedWorker::new(2);
    let mut run = ClusterRun::new(RunConfig::default(), &grid_location())
        .unwrap()
        .with_dispatch_config(DispatchConfig::new().with_max_in_flight(4));

    assert_eq!(run.request_size(), 12);
    run.run(&worker, RunOptions::default()).unwrap();

    let tiles = worker.tiles();
    assert_eq!(tiles.len(), 12);
    let unique: HashSet<_> = tiles.iter().copied().collect();
    assert_eq!(unique.len(), 12);
    assert!(tiles.iter().all(|t| run.bounds().contains(t)));

    let dataset = run.dataset().unwrap();
    assert_eq!(dataset.clusters().len(), 24);
    assert!(dataset.errors().is_empty());

    // Latest first
    let timestamps: Vec<u64> = dataset
        .clusters()
        .iter()
        .map(|r| r.timestamp.parse().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));

    // Numeric dates were kept as text
    assert!(dataset.clusters().iter().all(|r| r.max_date == "20200301"));
}

#[test]
fn test_worker_error_becomes_single_error_row() {
    let worker = ScriptedWorker::new(1).failing_at(1401, 2049);
    let mut run = ClusterRun::new(RunConfig::default(), &grid_location()).unwrap();
    run.run(&worker, RunOptions::default()).unwrap();

    let dataset = run.dataset().unwrap();
    assert_eq!(dataset.errors().len(), 1);
    assert_eq!(dataset.clusters().len(), 11);

    let error = &dataset.errors()[0];
    assert_eq!((error.z, error.x, error.y), (12, Some(1401), Some(2049)));
    assert_eq!(error.error, "Task timed out after 600.00 seconds");
    assert_eq!(error.error_trace, "aggregate.error");

    let center = TileCoord { z: 12, x: 1401, y: 2049 }.lon_lat_at(PixelOffset::CENTER);
    assert_eq!(error.centroid_longitude, Some(center.lon));
    assert_eq!(error.centroid_latitude, Some(center.lat));
}

#[test]
fn test_responses_balance_with_request_size() {
    struct MixedWorker;

    impl TileWorker for MixedWorker {
        fn invoke(&self, request: &WorkerRequest) -> Result<Value, WorkerError> {
            match (request.x + request.y) % 4 {
                0 => Err(WorkerError::Transport("connection reset".to_string())),
                1 => Ok(json!({"error": "out of memory"})),
                2 => Ok(json!({"file_name": "f", "timestamp": "1", "data": {"clusters": []}})),
                _ => Ok(json!({"file_name": "f", "timestamp": "1", "data": {"clusters": [
                    {"count": 1, "area": 1, "min_date": "20200101", "max_date": "20200101", "i": 0, "j": 0}
                ]}})),
            }
        }

        fn name(&self) -> &str {
            "mixed"
        }
    }

    let mut run = ClusterRun::new(RunConfig::default(), &grid_location()).unwrap();
    run.run(&MixedWorker, RunOptions::default()).unwrap();
    let request_size = run.request_size() as usize;

    let dataset = run.dataset().unwrap();
    let summary = dataset.summary();
    assert_eq!(summary.responses, request_size);
    assert_eq!(
        summary.responses,
        summary.error_rows + summary.tiles_with_clusters + summary.empty_tiles
    );
    assert!(dataset
        .errors()
        .iter()
        .any(|e| e.error_trace == TRACE_INVOKE));
}

#[test]
fn test_in_flight_never_exceeds_bound() {
    struct SlowWorker {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl TileWorker for SlowWorker {
        fn invoke(&self, _request: &WorkerRequest) -> Result<Value, WorkerError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(json!({}))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    let worker = SlowWorker {
        current: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    };
    let location = LocationSpec::new().with_tile_bounds((0, 0), (7, 7));
    let mut run = ClusterRun::new(RunConfig::default(), &location)
        .unwrap()
        .with_dispatch_config(DispatchConfig::new().with_max_in_flight(3));

    let outcome = run.run(&worker, RunOptions::default()).unwrap();
    assert!(matches!(outcome, RunOutcome::Completed(s) if s.dispatched == 64 && s.pool_size == 3));
    assert!(worker.peak.load(Ordering::SeqCst) <= 3);
}

#[test]
fn test_rerun_guard() {
    let worker = ScriptedWorker::new(1);
    let mut run = ClusterRun::new(RunConfig::default(), &grid_location()).unwrap();

    run.run(&worker, RunOptions::default()).unwrap();
    let rows = run.dataset().unwrap().clusters().len();

    let outcome = run.run(&worker, RunOptions::default()).unwrap();
    assert_eq!(outcome, RunOutcome::AlreadyLoaded);
    assert_eq!(worker.tiles().len(), 12);
    assert_eq!(run.dataset().unwrap().clusters().len(), rows);

    run.run(&worker, RunOptions::forced()).unwrap();
    assert_eq!(worker.tiles().len(), 24);
}

#[test]
fn test_request_carries_config_file_parameters() {
    let file = ConfigFile::from_ini_str(
        "[run]\nzoom = 12\nstart_date = 2019-06-01\nmin_count = 40\n\n[tuning]\ndownsample = 2\n",
    )
    .unwrap();
    let worker = ScriptedWorker::new(0);
    let location = LocationSpec::new().with_tile(1400, 2048);

    let mut run = ClusterRun::new(file.run, &location).unwrap();
    run.run(&worker, RunOptions::default()).unwrap();

    let seen = worker.seen.lock().unwrap();
    let body = serde_json::to_value(&seen[0]).unwrap();
    assert_eq!(body["start_date"], "2019-06-01");
    assert_eq!(body["end_date"], "2025-01-01");
    assert_eq!(body["min_count"], 40);
    assert_eq!(body["downsample"], 2);
    assert_eq!((body["x"].as_u64(), body["y"].as_u64()), (Some(1400), Some(2048)));
}

#[test]
fn test_reloaded_tables_keep_rows_and_range() {
    let worker = ScriptedWorker::new(1);
    let mut run = ClusterRun::new(RunConfig::default(), &grid_location()).unwrap();
    run.run(&worker, RunOptions::default()).unwrap();

    let (clusters, errors) = {
        let dataset = run.dataset().unwrap();
        (dataset.clusters().to_vec(), dataset.errors().to_vec())
    };

    let mut reloaded = ClusterRun::from_tables(clusters.clone(), errors).unwrap();
    assert_eq!(reloaded.bounds(), run.bounds());
    assert_eq!(reloaded.config().zoom(), 12);
    assert_eq!(reloaded.dataset().unwrap().clusters(), clusters.as_slice());
}
