//! Run parameters shared by every tile of a request.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use super::defaults::*;
use super::error::ConfigurationError;
use crate::coord::MAX_ZOOM;

/// Immutable parameters of one cluster run.
///
/// These values are forwarded verbatim to the worker for every tile. Build
/// one with [`RunConfig::builder`]; validation happens in
/// [`RunConfigBuilder::build`], so a `RunConfig` is always consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    zoom: u8,
    start_date: NaiveDate,
    end_date: NaiveDate,
    min_count: u32,
    width: u32,
    iterations: u32,
    tuning: BTreeMap<String, Value>,
}

impl RunConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Zoom level of every tile in the run.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// First alert date considered by the worker.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last alert date considered by the worker.
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Minimum alert count for a cluster.
    pub fn min_count(&self) -> u32 {
        self.min_count
    }

    /// Mean-shift window width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mean-shift iterations.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Extra worker-specific values, sent alongside the standard fields.
    pub fn tuning(&self) -> &BTreeMap<String, Value> {
        &self.tuning
    }

    /// Builder pre-filled with this configuration's values.
    pub fn to_builder(&self) -> RunConfigBuilder {
        RunConfigBuilder {
            zoom: self.zoom,
            start_date: self.start_date,
            end_date: self.end_date,
            min_count: self.min_count,
            width: self.width,
            iterations: self.iterations,
            tuning: self.tuning.clone(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        let builder = RunConfigBuilder::default();
        Self {
            zoom: builder.zoom,
            start_date: builder.start_date,
            end_date: builder.end_date,
            min_count: builder.min_count,
            width: builder.width,
            iterations: builder.iterations,
            tuning: builder.tuning,
        }
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    zoom: u8,
    start_date: NaiveDate,
    end_date: NaiveDate,
    min_count: u32,
    width: u32,
    iterations: u32,
    tuning: BTreeMap<String, Value>,
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            start_date: default_start_date(),
            end_date: default_end_date(),
            min_count: DEFAULT_MIN_COUNT,
            width: DEFAULT_WIDTH,
            iterations: DEFAULT_ITERATIONS,
            tuning: BTreeMap::new(),
        }
    }
}

impl RunConfigBuilder {
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = date;
        self
    }

    pub fn with_min_count(mut self, min_count: u32) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Add a worker-specific value. Keys that collide with a standard
    /// request field are ignored when the request is built.
    pub fn with_tuning(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.tuning.insert(key.into(), value.into());
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<RunConfig, ConfigurationError> {
        if self.zoom > MAX_ZOOM {
            return Err(ConfigurationError::InvalidZoom(self.zoom));
        }
        if self.start_date > self.end_date {
            return Err(ConfigurationError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(RunConfig {
            zoom: self.zoom,
            start_date: self.start_date,
            end_date: self.end_date,
            min_count: self.min_count,
            width: self.width,
            iterations: self.iterations,
            tuning: self.tuning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.zoom(), DEFAULT_ZOOM);
        assert_eq!(config.start_date(), date(2015, 1, 1));
        assert_eq!(config.end_date(), date(2025, 1, 1));
        assert_eq!(config.min_count(), 25);
        assert_eq!(config.width(), 5);
        assert_eq!(config.iterations(), 25);
        assert!(config.tuning().is_empty());
    }

    #[test]
    fn test_builder_default_matches_default() {
        assert_eq!(RunConfig::builder().build().unwrap(), RunConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = RunConfig::builder()
            .with_zoom(10)
            .with_start_date(date(2019, 1, 1))
            .with_end_date(date(2019, 6, 30))
            .with_min_count(12)
            .with_width(3)
            .with_iterations(8)
            .with_tuning("downsample", 2)
            .build()
            .unwrap();

        assert_eq!(config.zoom(), 10);
        assert_eq!(config.end_date(), date(2019, 6, 30));
        assert_eq!(config.min_count(), 12);
        assert_eq!(config.tuning().get("downsample"), Some(&Value::from(2)));
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let result = RunConfig::builder()
            .with_start_date(date(2020, 1, 2))
            .with_end_date(date(2020, 1, 1))
            .build();
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_zoom_out_of_range_rejected() {
        let result = RunConfig::builder().with_zoom(MAX_ZOOM + 1).build();
        assert_eq!(result, Err(ConfigurationError::InvalidZoom(MAX_ZOOM + 1)));
    }

    #[test]
    fn test_to_builder_round_trip() {
        let config = RunConfig::builder().with_width(9).build().unwrap();
        let copy = config.to_builder().build().unwrap();
        assert_eq!(config, copy);
    }
}
