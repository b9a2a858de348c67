//! Worker types and traits

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::RunConfig;
use crate::coord::TileCoord;

/// Errors from a single worker invocation.
///
/// Everything except [`WorkerError::Setup`] is recovered by the dispatcher
/// and ends up as an error row for the tile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerError {
    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The worker answered with a failure status
    #[error("Worker returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The worker answered with something that isn't JSON
    #[error("Malformed worker payload: {0}")]
    MalformedPayload(String),

    /// The worker handle could not be created
    #[error("Worker setup failed: {0}")]
    Setup(String),
}

/// Contract for the remote per-tile clustering function.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// thread of the dispatch pool. `invoke` blocks until the worker answers.
pub trait TileWorker: Send + Sync {
    /// Run the clustering for one tile and return the raw JSON payload.
    ///
    /// A payload carrying an `error`/`errorMessage` field is still `Ok`;
    /// classification happens during aggregation.
    fn invoke(&self, request: &WorkerRequest) -> Result<Value, WorkerError>;

    /// Worker name for logging.
    fn name(&self) -> &str;
}

/// Request body sent to the worker for one tile.
///
/// Serializes as a flat JSON object:
///
/// ```json
/// {"z": 12, "x": 1400, "y": 2050, "start_date": "2015-01-01",
///  "end_date": "2025-01-01", "min_count": 25, "width": 5, "iterations": 25}
/// ```
///
/// followed by any tuning values from the [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerRequest {
    pub z: u8,
    pub x: u32,
    pub y: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_count: u32,
    pub width: u32,
    pub iterations: u32,
    #[serde(flatten)]
    pub tuning: BTreeMap<String, Value>,
}

/// Field names owned by the standard request; tuning keys can't shadow them.
const RESERVED_KEYS: [&str; 8] = [
    "z",
    "x",
    "y",
    "start_date",
    "end_date",
    "min_count",
    "width",
    "iterations",
];

impl WorkerRequest {
    pub fn new(tile: TileCoord, config: &RunConfig) -> Self {
        let tuning = config
            .tuning()
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            z: tile.z,
            x: tile.x,
            y: tile.y,
            start_date: config.start_date(),
            end_date: config.end_date(),
            min_count: config.min_count(),
            width: config.width(),
            iterations: config.iterations(),
            tuning,
        }
    }

    /// Tile this request targets.
    pub fn tile(&self) -> TileCoord {
        TileCoord {
            z: self.z,
            x: self.x,
            y: self.y,
        }
    }
}
