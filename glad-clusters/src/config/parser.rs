//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::str::FromStr;

use chrono::NaiveDate;
use ini::{Ini, Properties};
use serde_json::Value;

use super::file::{ConfigFile, ConfigFileError};
use super::run::RunConfig;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from the defaults and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();
    let mut run = RunConfig::builder();

    // [run] section
    if let Some(section) = ini.section(Some("run")) {
        if let Some(v) = section.get("zoom") {
            run = run.with_zoom(parse_number(
                "run",
                "zoom",
                v,
                "must be an integer between 0 and 30",
            )?);
        }
        if let Some(v) = section.get("start_date") {
            run = run.with_start_date(parse_date("start_date", v)?);
        }
        if let Some(v) = section.get("end_date") {
            run = run.with_end_date(parse_date("end_date", v)?);
        }
        if let Some(v) = section.get("min_count") {
            run = run.with_min_count(parse_number(
                "run",
                "min_count",
                v,
                "must be a non-negative integer",
            )?);
        }
        if let Some(v) = section.get("width") {
            run = run.with_width(parse_number(
                "run",
                "width",
                v,
                "must be a non-negative integer",
            )?);
        }
        if let Some(v) = section.get("iterations") {
            run = run.with_iterations(parse_number(
                "run",
                "iterations",
                v,
                "must be a non-negative integer",
            )?);
        }
    }

    // [tuning] section: free-form worker values
    if let Some(section) = ini.section(Some("tuning")) {
        for (key, value) in section.iter() {
            run = run.with_tuning(key, tuning_value(value));
        }
    }

    config.run = run.build()?;

    // [dispatch] section
    if let Some(section) = ini.section(Some("dispatch")) {
        if let Some(v) = section.get("max_in_flight") {
            let parsed: usize = parse_number(
                "dispatch",
                "max_in_flight",
                v,
                "must be a positive integer",
            )?;
            if parsed == 0 {
                return Err(invalid(
                    "dispatch",
                    "max_in_flight",
                    v,
                    "must be a positive integer",
                ));
            }
            config.dispatch = config.dispatch.with_max_in_flight(parsed);
        }
        if let Some(v) = section.get("max_tiles") {
            let parsed: u64 =
                parse_number("dispatch", "max_tiles", v, "must be a positive integer")?;
            if parsed == 0 {
                return Err(invalid(
                    "dispatch",
                    "max_tiles",
                    v,
                    "must be a positive integer",
                ));
            }
            config.dispatch = config.dispatch.with_max_tiles(parsed);
        }
    }

    // [worker] section
    if let Some(section) = ini.section(Some("worker")) {
        parse_worker(section, &mut config)?;
    }

    Ok(config)
}

fn parse_worker(section: &Properties, config: &mut ConfigFile) -> Result<(), ConfigFileError> {
    if let Some(v) = section.get("endpoint") {
        let v = v.trim();
        if !v.is_empty() {
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid(
                    "worker",
                    "endpoint",
                    v,
                    "must be an http:// or https:// URL",
                ));
            }
            config.worker.endpoint = Some(v.to_string());
        }
    }
    if let Some(v) = section.get("timeout") {
        config.worker.timeout_secs = parse_number(
            "worker",
            "timeout",
            v,
            "must be a positive integer (seconds)",
        )?;
    }
    if let Some(v) = section.get("bearer_token") {
        let v = v.trim();
        if !v.is_empty() {
            config.worker.bearer_token = Some(v.to_string());
        }
    }
    Ok(())
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, ConfigFileError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid("run", key, value, "expected a date like 2019-01-31"))
}

/// Interpret a tuning value as the most specific JSON type it parses as.
///
/// Non-finite floats such as `nan` or `inf` have no JSON form and stay text.
fn tuning_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Value::from(v);
    }
    if let Some(v) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return Value::from(v);
    }
    match raw.to_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
