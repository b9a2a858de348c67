//! Command-line arguments.
//!
//! Values given on the command line override the config file, which in turn
//! overrides the built-in defaults.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::Parser;

use glad_clusters::bounds::LocationSpec;
use glad_clusters::config::{ConfigFile, DispatchConfig, RunConfig, WorkerConfig};
use glad_clusters::RunError;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "glad-clusters")]
#[command(version = glad_clusters::VERSION)]
#[command(about = "Find GLAD alert clusters over a range of map tiles", long_about = None)]
pub struct Args {
    /// Opposite corner tiles: X1,Y1,X2,Y2
    #[arg(long, value_name = "X1,Y1,X2,Y2")]
    pub tile_bounds: Option<TileCorners>,

    /// Opposite corners in degrees: LON1,LAT1,LON2,LAT2
    #[arg(long, value_name = "LON1,LAT1,LON2,LAT2", allow_hyphen_values = true)]
    pub bounds: Option<LonLatCorners>,

    /// Longitude of a single point
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Latitude of a single point
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Column of a single tile
    #[arg(long = "x", requires = "tile_y")]
    pub tile_x: Option<u32>,

    /// Row of a single tile
    #[arg(long = "y", requires = "tile_x")]
    pub tile_y: Option<u32>,

    /// Zoom level of the tile grid
    #[arg(long)]
    pub zoom: Option<u8>,

    /// First day of alerts to consider (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,

    /// Last day of alerts to consider (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// Minimum number of alerts in a cluster
    #[arg(long)]
    pub min_count: Option<u32>,

    /// Clustering window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Clustering iterations
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Worker endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Maximum concurrent worker invocations
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Largest tile range to dispatch
    #[arg(long)]
    pub max_tiles: Option<u64>,

    /// Config file (INI)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the error table instead of the cluster view
    #[arg(long)]
    pub errors: bool,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub run: RunConfig,
    pub dispatch: DispatchConfig,
    pub worker: WorkerConfig,
}

impl Args {
    /// Every location flag that was given; resolution picks one.
    pub fn location(&self) -> LocationSpec {
        let mut spec = LocationSpec::new();
        if let Some(TileCorners(a, b)) = self.tile_bounds {
            spec = spec.with_tile_bounds(a, b);
        }
        if let Some(LonLatCorners(a, b)) = self.bounds {
            spec = spec.with_bounds(a, b);
        }
        if let (Some(lon), Some(lat)) = (self.lon, self.lat) {
            spec = spec.with_point(lon, lat);
        }
        if let (Some(x), Some(y)) = (self.tile_x, self.tile_y) {
            spec = spec.with_tile(x, y);
        }
        spec
    }

    /// Layer command-line values over `file`.
    pub fn settings(&self, file: ConfigFile) -> Result<Settings, CliError> {
        let mut run = file.run.to_builder();
        if let Some(zoom) = self.zoom {
            run = run.with_zoom(zoom);
        }
        if let Some(date) = self.start_date {
            run = run.with_start_date(date);
        }
        if let Some(date) = self.end_date {
            run = run.with_end_date(date);
        }
        if let Some(min_count) = self.min_count {
            run = run.with_min_count(min_count);
        }
        if let Some(width) = self.width {
            run = run.with_width(width);
        }
        if let Some(iterations) = self.iterations {
            run = run.with_iterations(iterations);
        }
        let run = run.build().map_err(|e| CliError::Run(RunError::from(e)))?;

        let mut dispatch = file.dispatch;
        if let Some(max) = self.max_in_flight {
            if max == 0 {
                return Err(CliError::InvalidArgument(
                    "--max-in-flight must be at least 1".to_string(),
                ));
            }
            dispatch = dispatch.with_max_in_flight(max);
        }
        if let Some(max) = self.max_tiles {
            if max == 0 {
                return Err(CliError::InvalidArgument(
                    "--max-tiles must be at least 1".to_string(),
                ));
            }
            dispatch = dispatch.with_max_tiles(max);
        }

        let mut worker = file.worker;
        if let Some(endpoint) = &self.endpoint {
            worker.endpoint = Some(endpoint.clone());
        }

        Ok(Settings {
            run,
            dispatch,
            worker,
        })
    }
}

/// Two corner tiles, `X1,Y1,X2,Y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCorners(pub (u32, u32), pub (u32, u32));

impl FromStr for TileCorners {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x1, y1, x2, y2] = four_values::<u32>(s)?;
        Ok(Self((x1, y1), (x2, y2)))
    }
}

/// Two corner points, `LON1,LAT1,LON2,LAT2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatCorners(pub (f64, f64), pub (f64, f64));

impl FromStr for LonLatCorners {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [lon1, lat1, lon2, lat2] = four_values::<f64>(s)?;
        Ok(Self((lon1, lat1), (lon2, lat2)))
    }
}

fn four_values<T: FromStr + Copy>(s: &str) -> Result<[T; 4], String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<T>()
                .map_err(|_| format!("'{}' is not a valid number", part.trim()))
        })
        .collect::<Result<Vec<T>, String>>()?;

    <[T; 4]>::try_from(values)
        .map_err(|v| format!("expected 4 comma-separated values, got {}", v.len()))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}
