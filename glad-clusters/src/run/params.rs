//! Run parameters recovered from a stored cluster table.

use chrono::NaiveDate;

use crate::aggregate::ClusterRecord;
use crate::bounds::TileBounds;
use crate::config::ConfigurationError;

/// What a cluster table says about the run that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    pub zoom: u8,
    pub bounds: TileBounds,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RunParams {
    /// Derive parameters from cluster rows.
    ///
    /// Zoom comes from the first row, the tile range from the extreme x/y
    /// values, and the dates from the earliest `min_date` and latest
    /// `max_date`. Dates may be `YYYYMMDD` or `YYYY-MM-DD`.
    pub fn from_clusters(clusters: &[ClusterRecord]) -> Result<Self, ConfigurationError> {
        let first = clusters.first().ok_or(ConfigurationError::EmptyTable)?;
        let zoom = first.z;

        let mut x = (first.x, first.x);
        let mut y = (first.y, first.y);
        let mut start = parse_date("min_date", &first.min_date)?;
        let mut end = parse_date("max_date", &first.max_date)?;

        for row in &clusters[1..] {
            x = (x.0.min(row.x), x.1.max(row.x));
            y = (y.0.min(row.y), y.1.max(row.y));
            start = start.min(parse_date("min_date", &row.min_date)?);
            end = end.max(parse_date("max_date", &row.max_date)?);
        }

        Ok(Self {
            zoom,
            bounds: TileBounds::new(zoom, (x.0, y.0), (x.1, y.1))?,
            start_date: start,
            end_date: end,
        })
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ConfigurationError> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| ConfigurationError::InvalidValue {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(x: u32, y: u32, min_date: &str, max_date: &str) -> ClusterRecord {
        ClusterRecord {
            count: 1,
            area: 1,
            min_date: min_date.to_string(),
            max_date: max_date.to_string(),
            longitude: 0.0,
            latitude: 0.0,
            z: 12,
            x,
            y,
            i: 0,
            j: 0,
            file_name: "f".to_string(),
            timestamp: "1".to_string(),
            alerts: Vec::new(),
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(
            RunParams::from_clusters(&[]),
            Err(ConfigurationError::EmptyTable)
        );
    }

    #[test]
    fn test_params_from_rows() {
        let rows = vec![
            row(1401, 2050, "20190305", "20190901"),
            row(1400, 2052, "20180101", "20200101"),
            row(1403, 2051, "2019-01-01", "2021-06-30"),
        ];
        let params = RunParams::from_clusters(&rows).unwrap();

        assert_eq!(params.zoom, 12);
        assert_eq!(params.bounds, TileBounds::new(12, (1400, 2050), (1403, 2052)).unwrap());
        assert_eq!(params.start_date, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(params.end_date, NaiveDate::from_ymd_opt(2021, 6, 30).unwrap());
    }

    #[test]
    fn test_bad_date_rejected() {
        let rows = vec![row(1, 1, "yesterday", "20200101")];
        assert_eq!(
            RunParams::from_clusters(&rows),
            Err(ConfigurationError::InvalidValue {
                field: "min_date",
                value: "yesterday".to_string()
            })
        );
    }
}
