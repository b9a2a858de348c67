//! Errors that abort a run.
//!
//! Only setup-stage failures end up here. Anything that goes wrong while a
//! single tile is being processed is recorded as an error row instead.

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::coord::CoordError;
use crate::dispatch::DispatchError;
use crate::worker::WorkerError;

/// Fatal run errors. When one of these is returned no tile has been
/// dispatched and no output table exists.
#[derive(Debug, Error)]
pub enum RunError {
    /// Location or parameters could not be resolved
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A lon/lat input lies outside Web Mercator
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordError),

    /// The worker handle could not be created
    #[error("Failed to set up tile worker: {0}")]
    WorkerSetup(#[source] WorkerError),

    /// The dispatcher could not start
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
