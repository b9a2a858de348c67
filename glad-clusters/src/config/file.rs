//! Configuration file handling.
//!
//! Loads run, dispatch, and worker settings from an INI file. Parsing lives
//! in [`super::parser`].
//!
//! ```ini
//! [run]
//! zoom = 12
//! start_date = 2019-01-01
//! end_date = 2019-12-31
//! min_count = 25
//! width = 5
//! iterations = 25
//!
//! [dispatch]
//! max_in_flight = 100
//! max_tiles = 1000000
//!
//! [worker]
//! endpoint = https://example.execute-api.us-west-2.amazonaws.com/meanshift
//! timeout = 600
//!
//! [tuning]
//! downsample = 2
//! ```

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::dispatch::DispatchConfig;
use super::error::ConfigurationError;
use super::run::RunConfig;
use super::worker::WorkerConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the INI file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// A value has the wrong format
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// An explicitly requested file does not exist
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Values parse individually but are inconsistent together
    #[error("Invalid configuration: {0}")]
    Inconsistent(#[from] ConfigurationError),
}

/// Everything a run needs, as loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// `[run]` and `[tuning]` sections
    pub run: RunConfig,
    /// `[dispatch]` section
    pub dispatch: DispatchConfig,
    /// `[worker]` section
    pub worker: WorkerConfig,
}

impl ConfigFile {
    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Load configuration from a path the user named explicitly.
    ///
    /// Unlike [`ConfigFile::load_from`], a missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.is_file() {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }
        Self::load_from(path)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(ini::Error::Parse)?;
        super::parser::parse_ini(&ini)
    }
}
