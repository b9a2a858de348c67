//! Scoped thread pool driving the tile worker.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::response::{RawResponse, TRACE_INVOKE, TRACE_PANIC};
use crate::bounds::{ResolvedRange, TileBoundsIter};
use crate::config::{DispatchConfig, RunConfig};
use crate::coord::TileCoord;
use crate::worker::{TileWorker, WorkerRequest};

/// Setup failures that stop a dispatch before any tile runs.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Tile range contains no tiles")]
    NoTiles,

    #[error("Tile range of {tiles} tiles exceeds the limit of {limit}")]
    TooManyTiles { tiles: u64, limit: u64 },

    #[error("Failed to spawn tile worker thread: {0}")]
    PoolSpawn(#[source] io::Error),
}

/// Counters describing a finished dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Tiles handed to the worker
    pub dispatched: usize,
    /// Tiles whose invocation returned an error or panicked
    pub invocation_failures: usize,
    /// Threads that actually ran
    pub pool_size: usize,
    pub elapsed: Duration,
}

/// Responses plus the summary of how they were produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutput {
    pub responses: Vec<RawResponse>,
    pub summary: DispatchSummary,
}

/// Invokes a [`TileWorker`] for every tile of a range with bounded
/// concurrency.
///
/// The call blocks until every tile has a response. Tiles come off a shared
/// iterator, so each one is attempted exactly once regardless of how the
/// threads interleave.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Run the worker over `range`.
    ///
    /// Point-shaped ranges invoke the worker once for the focus tile on the
    /// calling thread. Everything else fans out over a pool of
    /// `min(max_in_flight, tile_count)` scoped threads.
    pub fn dispatch(
        &self,
        worker: &dyn TileWorker,
        run: &RunConfig,
        range: &ResolvedRange,
    ) -> Result<DispatchOutput, DispatchError> {
        let started = Instant::now();

        if let Some(tile) = range.focus {
            info!(tile = %tile, worker = worker.name(), "Dispatching single tile");
            let response = invoke_tile(worker, run, tile);
            let summary = DispatchSummary {
                dispatched: 1,
                invocation_failures: usize::from(response.is_invocation_failure()),
                pool_size: 1,
                elapsed: started.elapsed(),
            };
            log_summary(&summary);
            return Ok(DispatchOutput {
                responses: vec![response],
                summary,
            });
        }

        let tile_count = range.bounds.request_size();
        if tile_count == 0 {
            return Err(DispatchError::NoTiles);
        }
        let limit = self.config.max_tiles();
        let tile_count = usize::try_from(tile_count)
            .ok()
            .filter(|_| tile_count <= limit)
            .ok_or(DispatchError::TooManyTiles {
                tiles: tile_count,
                limit,
            })?;
        let pool_size = self.config.max_in_flight().min(tile_count);

        info!(
            tiles = tile_count,
            pool_size,
            zoom = range.bounds.zoom(),
            worker = worker.name(),
            "Dispatching tiles"
        );

        let queue = Mutex::new(range.bounds.tiles());
        let results = Mutex::new(Vec::new());

        let spawned = thread::scope(|scope| {
            let queue = &queue;
            let results = &results;
            let mut spawned = 0usize;

            for n in 0..pool_size {
                let spawn = thread::Builder::new()
                    .name(format!("tile-worker-{}", n))
                    .spawn_scoped(scope, move || worker_loop(worker, run, queue, results));

                match spawn {
                    Ok(_) => spawned += 1,
                    Err(e) if spawned == 0 => return Err(DispatchError::PoolSpawn(e)),
                    Err(e) => {
                        // The threads already running drain the whole queue
                        warn!(
                            requested = pool_size,
                            spawned,
                            error = %e,
                            "Could not spawn full worker pool, continuing with fewer threads"
                        );
                        break;
                    }
                }
            }

            Ok(spawned)
        })?;

        let responses = results.into_inner();
        let summary = DispatchSummary {
            dispatched: responses.len(),
            invocation_failures: responses
                .iter()
                .filter(|r| r.is_invocation_failure())
                .count(),
            pool_size: spawned,
            elapsed: started.elapsed(),
        };
        log_summary(&summary);

        Ok(DispatchOutput { responses, summary })
    }
}

/// Pull tiles until the shared iterator is exhausted.
fn worker_loop(
    worker: &dyn TileWorker,
    run: &RunConfig,
    queue: &Mutex<TileBoundsIter>,
    results: &Mutex<Vec<RawResponse>>,
) {
    loop {
        // The guard is dropped before the invocation starts
        let Some(tile) = queue.lock().next() else {
            break;
        };
        let response = invoke_tile(worker, run, tile);
        results.lock().push(response);
    }
}

/// One invocation; errors and panics become an `InvocationFailed` response.
fn invoke_tile(worker: &dyn TileWorker, run: &RunConfig, tile: TileCoord) -> RawResponse {
    let request = WorkerRequest::new(tile, run);
    debug!(tile = %tile, "Invoking tile worker");

    match panic::catch_unwind(AssertUnwindSafe(|| worker.invoke(&request))) {
        Ok(Ok(payload)) => RawResponse::payload(tile, payload),
        Ok(Err(e)) => {
            warn!(tile = %tile, error = %e, "Tile invocation failed");
            RawResponse::failed(tile, e.to_string(), TRACE_INVOKE)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(tile = %tile, panic = %message, "Tile worker panicked");
            RawResponse::failed(tile, format!("worker panicked: {}", message), TRACE_PANIC)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_summary(summary: &DispatchSummary) {
    info!(
        dispatched = summary.dispatched,
        failures = summary.invocation_failures,
        pool_size = summary.pool_size,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Dispatch complete"
    );
}
