//! Default values for run, dispatch, and worker settings.

use chrono::NaiveDate;

/// Default zoom level for cluster runs.
pub const DEFAULT_ZOOM: u8 = 12;

/// Default minimum number of alerts for a cluster to be reported.
pub const DEFAULT_MIN_COUNT: u32 = 25;

/// Default mean-shift window width, in pixels.
pub const DEFAULT_WIDTH: u32 = 5;

/// Default number of mean-shift iterations.
pub const DEFAULT_ITERATIONS: u32 = 25;

/// Default upper bound on concurrent worker invocations.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 100;

/// Default cap on the number of tiles one dispatch may cover.
///
/// A zoom 12 range over the pan-tropical belt is a few hundred thousand tiles.
pub const DEFAULT_MAX_TILES: u64 = 1_000_000;

/// Default request timeout for the HTTP worker (seconds).
///
/// Clustering a dense tile can take minutes; this matches the read timeout
/// the worker function is deployed with.
pub const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 600;

/// First day of the alert record.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Default end of the alert window.
pub fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}
