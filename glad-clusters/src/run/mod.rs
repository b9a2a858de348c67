//! Orchestration of a single cluster request.
//!
//! [`ClusterRun`] resolves the location once, dispatches the worker over the
//! range, and aggregates the responses into a [`Dataset`](crate::dataset::Dataset)
//! the first time the results are read.
//!
//! # Example
//!
//! ```no_run
//! use glad_clusters::bounds::LocationSpec;
//! use glad_clusters::config::{RunConfig, WorkerConfig};
//! use glad_clusters::run::{ClusterRun, RunOptions};
//!
//! let config = RunConfig::builder().with_zoom(10).build()?;
//! let location = LocationSpec::new().with_point(-60.0, -3.0);
//!
//! let mut run = ClusterRun::new(config, &location)?;
//! run.run_http(&WorkerConfig::new("https://example.invalid/cluster"), RunOptions::default())?;
//!
//! if let Some(dataset) = run.dataset() {
//!     println!("{} clusters", dataset.clusters().len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cluster_run;
mod params;

pub use cluster_run::{ClusterRun, RunOptions, RunOutcome};
pub use params::RunParams;
