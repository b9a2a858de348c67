//! Dispatcher configuration.

use super::defaults::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_MAX_TILES};

/// Configuration for the per-tile fan-out.
///
/// # Example
///
/// ```
/// use glad_clusters::config::DispatchConfig;
///
/// let config = DispatchConfig::default();
/// assert_eq!(config.max_in_flight(), 100);
///
/// // A bound of zero would stall the pool; it is raised to one
/// let config = DispatchConfig::new().with_max_in_flight(0);
/// assert_eq!(config.max_in_flight(), 1);
///
/// let config = DispatchConfig::new().with_max_tiles(500);
/// assert_eq!(config.max_tiles(), 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum number of concurrent worker invocations
    max_in_flight: usize,
    /// Largest tile range a single dispatch accepts
    max_tiles: u64,
}

impl DispatchConfig {
    /// Create a dispatch configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of concurrent worker invocations.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Get the maximum number of concurrent worker invocations.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Set the largest tile range a dispatch accepts (at least one).
    pub fn with_max_tiles(mut self, max_tiles: u64) -> Self {
        self.max_tiles = max_tiles.max(1);
        self
    }

    pub fn max_tiles(&self) -> u64 {
        self.max_tiles
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            max_tiles: DEFAULT_MAX_TILES,
        }
    }
}
