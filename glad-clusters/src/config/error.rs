//! Configuration-stage errors.

use chrono::NaiveDate;
use thiserror::Error;

/// Fatal errors raised while setting up a run, before any tile is dispatched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// None of the four location shapes was supplied
    #[error("No location given: supply tile bounds, lon/lat bounds, a lon/lat point, or a tile x/y")]
    NoLocation,

    /// A tile index does not exist at the requested zoom
    #[error("Tile ({x}, {y}) is outside the zoom {zoom} grid (max index {max_index})")]
    TileOutOfGrid {
        zoom: u8,
        x: u32,
        y: u32,
        max_index: u64,
    },

    /// Zoom level cannot be represented
    #[error("Invalid zoom level {0} (must be between 0 and {max})", max = crate::coord::MAX_ZOOM)]
    InvalidZoom(u8),

    /// Start date after end date
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Run parameters were requested from an empty cluster table
    #[error("Cannot derive run parameters from an empty cluster table")]
    EmptyTable,

    /// A stored value could not be interpreted
    #[error("Invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}
