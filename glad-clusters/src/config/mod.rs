//! Configuration types for a cluster run.
//!
//! Every component receives its configuration explicitly; nothing is read
//! from the environment or from globals after startup.
//!
//! - [`RunConfig`]: the parameters forwarded to the per-tile worker
//! - [`DispatchConfig`]: fan-out concurrency and range limit
//! - [`WorkerConfig`]: where and how to reach the remote worker
//! - [`ConfigFile`]: all of the above loaded from an INI file
//!
//! # Example
//!
//! ```
//! use glad_clusters::config::{DispatchConfig, RunConfig};
//!
//! let run = RunConfig::builder()
//!     .with_zoom(10)
//!     .with_min_count(40)
//!     .build()
//!     .unwrap();
//! assert_eq!(run.zoom(), 10);
//!
//! let dispatch = DispatchConfig::default().with_max_in_flight(16);
//! assert_eq!(dispatch.max_in_flight(), 16);
//! ```

mod defaults;
mod dispatch;
mod error;
mod file;
mod parser;
mod run;
mod worker;

pub use defaults::*;
pub use dispatch::DispatchConfig;
pub use error::ConfigurationError;
pub use file::{ConfigFile, ConfigFileError};
pub use run::{RunConfig, RunConfigBuilder};
pub use worker::WorkerConfig;
