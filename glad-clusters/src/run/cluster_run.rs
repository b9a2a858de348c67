//! The orchestrating run instance.

use tracing::{info, warn};

use super::params::RunParams;
use crate::aggregate::{aggregate, ClusterRecord, ErrorRecord};
use crate::bounds::{resolve, LocationShape, LocationSpec, ResolvedRange, TileBounds};
use crate::config::{DispatchConfig, RunConfig, WorkerConfig};
use crate::coord::TileCoord;
use crate::dataset::Dataset;
use crate::dispatch::{DispatchSummary, Dispatcher, RawResponse};
use crate::error::RunError;
use crate::worker::{HttpTileWorker, TileWorker};

/// Options for [`ClusterRun::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Dispatch again even when results already exist
    pub force: bool,
}

impl RunOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// What [`ClusterRun::run`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every tile was dispatched
    Completed(DispatchSummary),
    /// Results already existed and `force` was not set; nothing was dispatched
    AlreadyLoaded,
}

#[derive(Debug, Default)]
enum RunState {
    #[default]
    Idle,
    Pending(Vec<RawResponse>),
    Loaded(Dataset),
}

/// One cluster request: configuration, resolved range, and its results.
#[derive(Debug)]
pub struct ClusterRun {
    config: RunConfig,
    range: ResolvedRange,
    dispatcher: Dispatcher,
    state: RunState,
}

impl ClusterRun {
    /// Resolve `location` at the configured zoom.
    ///
    /// Fails with a configuration or coordinate error before anything is
    /// dispatched.
    pub fn new(config: RunConfig, location: &LocationSpec) -> Result<Self, RunError> {
        let range = resolve(location, config.zoom())?;
        Ok(Self {
            config,
            range,
            dispatcher: Dispatcher::default(),
            state: RunState::Idle,
        })
    }

    /// Rebuild a loaded run from stored tables.
    ///
    /// Zoom, tile range and dates are recovered from the cluster rows; the
    /// remaining parameters take their defaults.
    pub fn from_tables(
        clusters: Vec<ClusterRecord>,
        errors: Vec<ErrorRecord>,
    ) -> Result<Self, RunError> {
        let params = RunParams::from_clusters(&clusters)?;
        let config = RunConfig::builder()
            .with_zoom(params.zoom)
            .with_start_date(params.start_date)
            .with_end_date(params.end_date)
            .build()?;
        let range = ResolvedRange {
            bounds: params.bounds,
            focus: None,
            shape: LocationShape::TileBounds,
        };

        Ok(Self {
            config,
            range,
            dispatcher: Dispatcher::default(),
            state: RunState::Loaded(Dataset::from_tables(params.bounds, clusters, errors)),
        })
    }

    pub fn with_dispatch_config(mut self, config: DispatchConfig) -> Self {
        self.dispatcher = Dispatcher::new(config);
        self
    }

    /// Invoke `worker` for every tile in the range.
    ///
    /// A run that already holds results (pending or aggregated) is left
    /// untouched unless `options.force` is set.
    pub fn run(
        &mut self,
        worker: &dyn TileWorker,
        options: RunOptions,
    ) -> Result<RunOutcome, RunError> {
        if self.skip(options) {
            return Ok(RunOutcome::AlreadyLoaded);
        }

        info!(
            zoom = self.config.zoom(),
            tiles = self.request_size(),
            start_date = %self.config.start_date(),
            end_date = %self.config.end_date(),
            min_count = self.config.min_count(),
            worker = worker.name(),
            "Starting cluster run"
        );

        let output = self.dispatcher.dispatch(worker, &self.config, &self.range)?;
        self.state = RunState::Pending(output.responses);

        Ok(RunOutcome::Completed(output.summary))
    }

    /// [`run`](Self::run) against the HTTP worker described by `worker`.
    pub fn run_http(
        &mut self,
        worker: &WorkerConfig,
        options: RunOptions,
    ) -> Result<RunOutcome, RunError> {
        if self.skip(options) {
            return Ok(RunOutcome::AlreadyLoaded);
        }
        let worker = HttpTileWorker::new(worker).map_err(RunError::WorkerSetup)?;
        self.run(&worker, options)
    }

    /// Results, aggregating pending responses on first access.
    ///
    /// `None` until the run has been dispatched.
    pub fn dataset(&mut self) -> Option<&Dataset> {
        self.state = match std::mem::take(&mut self.state) {
            RunState::Pending(responses) => {
                RunState::Loaded(Dataset::new(self.range.bounds, aggregate(responses)))
            }
            other => other,
        };

        match &self.state {
            RunState::Loaded(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Whether results exist, aggregated or not.
    pub fn has_results(&self) -> bool {
        !matches!(self.state, RunState::Idle)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn range(&self) -> &ResolvedRange {
        &self.range
    }

    pub fn bounds(&self) -> &TileBounds {
        &self.range.bounds
    }

    pub fn focus(&self) -> Option<TileCoord> {
        self.range.focus
    }

    pub fn request_size(&self) -> u64 {
        self.range.bounds.request_size()
    }

    fn skip(&self, options: RunOptions) -> bool {
        if self.has_results() && !options.force {
            warn!("Run already has results, skipping dispatch (use force to re-run)");
            return true;
        }
        false
    }
}
