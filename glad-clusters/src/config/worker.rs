//! Remote worker configuration.

use super::defaults::DEFAULT_WORKER_TIMEOUT_SECS;

/// Where and how to reach the per-tile clustering function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// HTTPS endpoint that accepts the JSON tile request
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Optional bearer token sent with every invocation
    pub bearer_token: Option<String>,
}

impl WorkerConfig {
    /// Create a worker configuration pointing at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Set the request timeout in seconds.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_WORKER_TIMEOUT_SECS,
            bearer_token: None,
        }
    }
}
