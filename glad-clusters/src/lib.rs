//! glad-clusters - GLAD alert cluster discovery over slippy-map tile grids
//!
//! A request names an area of interest and a set of run parameters. The
//! library resolves the area to a rectangle of Web Mercator tiles, fans a
//! remote clustering function out over every tile with bounded concurrency,
//! and folds the responses into a cluster table and an error table.
//!
//! # High-Level API
//!
//! [`run::ClusterRun`] ties the pieces together:
//!
//! ```no_run
//! use glad_clusters::bounds::LocationSpec;
//! use glad_clusters::config::{RunConfig, WorkerConfig};
//! use glad_clusters::run::{ClusterRun, RunOptions};
//!
//! let endpoint = "https://example.invalid/cluster";
//! let location = LocationSpec::new().with_tile_bounds((1400, 2048), (1403, 2050));
//! let mut run = ClusterRun::new(RunConfig::default(), &location)?;
//! run.run_http(&WorkerConfig::new(endpoint), RunOptions::default())?;
//!
//! if let Some(dataset) = run.dataset() {
//!     for row in dataset.view() {
//!         println!("{} alerts at {}, {}", row.count, row.longitude, row.latitude);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod bounds;
pub mod config;
pub mod coord;
pub mod dataset;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod run;
pub mod worker;

pub use error::RunError;

/// Version of the glad-clusters library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
