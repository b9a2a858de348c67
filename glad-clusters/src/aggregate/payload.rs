//! Wire shape of a successful worker response.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::records::AlertHit;

/// `{file_name, timestamp, data: {clusters: [...]}}`
#[derive(Debug, Deserialize)]
pub(super) struct SuccessPayload {
    pub file_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub timestamp: String,
    #[serde(default)]
    pub data: Option<ClusterData>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ClusterData {
    #[serde(default)]
    pub clusters: Option<Vec<RawCluster>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawCluster {
    #[serde(deserialize_with = "whole_number")]
    pub count: u64,
    #[serde(deserialize_with = "whole_number")]
    pub area: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub min_date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub max_date: String,
    pub i: u8,
    pub j: u8,
    #[serde(default)]
    pub alerts: Vec<AlertHit>,
}

impl SuccessPayload {
    /// Clusters in the payload; a missing `data` or `clusters` member is none.
    pub(super) fn into_clusters(self) -> (String, String, Vec<RawCluster>) {
        let clusters = self.data.and_then(|d| d.clusters).unwrap_or_default();
        (self.file_name, self.timestamp, clusters)
    }
}

/// Worker-reported failure message, if any.
///
/// `error` wins over `errorMessage`. Empty strings, `null` and `false` do not
/// count as errors; any other non-string value is rendered as JSON.
pub(crate) fn error_message(payload: &Value) -> Option<String> {
    ["error", "errorMessage"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find_map(|value| match value {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

/// Optional `error_trace` string carried by a failure payload.
pub(super) fn error_trace(payload: &Value) -> Option<String> {
    payload
        .get("error_trace")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accept `"20200101"` or `20200101` and keep it as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    StringOrNumber::deserialize(deserializer).map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

/// Accept an integer or a float; floats are truncated toward zero.
fn whole_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WholeNumber {
        Int(u64),
        Float(f64),
    }

    match WholeNumber::deserialize(deserializer)? {
        WholeNumber::Int(n) => Ok(n),
        WholeNumber::Float(f) if f.is_finite() && f >= 0.0 => Ok(f.trunc() as u64),
        WholeNumber::Float(f) => Err(serde::de::Error::custom(format!(
            "expected a non-negative number, got {}",
            f
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_payload_accepts_numeric_dates() {
        let payload: SuccessPayload = serde_json::from_value(json!({
            "file_name": "a.tif",
            "timestamp": 1600000000,
            "data": {"clusters": [
                {"count": 30, "area": 12.7, "min_date": 20200101, "max_date": "20200301",
                 "i": 4, "j": 9, "alerts": [[1, 2], [3, 4, 5]]}
            ]}
        }))
        .unwrap();

        let (file_name, timestamp, clusters) = payload.into_clusters();
        assert_eq!(file_name, "a.tif");
        assert_eq!(timestamp, "1600000000");
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].min_date, "20200101");
        assert_eq!(clusters[0].area, 12);
        assert_eq!(clusters[0].alerts.len(), 2);
    }

    #[test]
    fn test_missing_data_means_no_clusters() {
        let payload: SuccessPayload =
            serde_json::from_value(json!({"file_name": "a", "timestamp": "t"})).unwrap();
        assert!(payload.into_clusters().2.is_empty());

        let payload: SuccessPayload =
            serde_json::from_value(json!({"file_name": "a", "timestamp": "t", "data": {}}))
                .unwrap();
        assert!(payload.into_clusters().2.is_empty());
    }

    #[test]
    fn test_pixel_out_of_range_rejected() {
        let result: Result<SuccessPayload, _> = serde_json::from_value(json!({
            "file_name": "a",
            "timestamp": "t",
            "data": {"clusters": [
                {"count": 1, "area": 1, "min_date": "d", "max_date": "d", "i": 256, "j": 0}
            ]}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_area_rejected() {
        let result: Result<RawCluster, _> = serde_json::from_value(json!(
            {"count": 1, "area": -2.5, "min_date": "d", "max_date": "d", "i": 0, "j": 0}
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_message_detection() {
        assert_eq!(error_message(&json!({"error": "boom"})), Some("boom".to_string()));
        assert_eq!(
            error_message(&json!({"errorMessage": "Task timed out"})),
            Some("Task timed out".to_string())
        );
        assert_eq!(
            error_message(&json!({"error": "", "errorMessage": "second"})),
            Some("second".to_string())
        );
        assert_eq!(error_message(&json!({"error": null})), None);
        assert_eq!(error_message(&json!({"file_name": "a"})), None);
        assert_eq!(error_message(&json!(null)), None);
    }

    #[test]
    fn test_error_trace() {
        assert_eq!(
            error_trace(&json!({"error": "x", "error_trace": "worker.3"})),
            Some("worker.3".to_string())
        );
        assert_eq!(error_trace(&json!({"error": "x"})), None);
    }
}
