//! HTTP transport for the remote clustering function

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::types::{TileWorker, WorkerError, WorkerRequest};
use crate::aggregate::error_message;
use crate::config::WorkerConfig;

/// User-Agent sent with every invocation.
const USER_AGENT: &str = concat!("glad-clusters/", env!("CARGO_PKG_VERSION"));

/// Longest response body kept in a [`WorkerError::Remote`].
const MAX_ERROR_BODY: usize = 512;

/// Invokes the clustering function with a JSON POST per tile.
///
/// The blocking reqwest client is shared by every pool thread; it pools
/// connections internally.
#[derive(Clone)]
pub struct HttpTileWorker {
    client: reqwest::blocking::Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl HttpTileWorker {
    /// Build a worker from configuration.
    ///
    /// # Errors
    ///
    /// [`WorkerError::Setup`] when no endpoint is configured or the HTTP
    /// client can't be created.
    pub fn new(config: &WorkerConfig) -> Result<Self, WorkerError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| WorkerError::Setup("no worker endpoint configured".to_string()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WorkerError::Setup(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            endpoint = %endpoint,
            timeout_secs = config.timeout_secs,
            authenticated = config.bearer_token.is_some(),
            "Created HTTP tile worker"
        );

        Ok(Self {
            client,
            endpoint,
            bearer_token: config.bearer_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpTileWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTileWorker")
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TileWorker for HttpTileWorker {
    fn invoke(&self, request: &WorkerRequest) -> Result<Value, WorkerError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().map_err(|e| {
            warn!(tile = %request.tile(), error = %e, "Worker request failed");
            WorkerError::Transport(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| WorkerError::Transport(format!("Failed to read response: {}", e)))?;
        trace!(tile = %request.tile(), status = status.as_u16(), bytes = body.len(), "Worker responded");

        if !status.is_success() {
            // A function-level failure still carries a JSON error payload;
            // hand it back so aggregation records the worker's own message.
            if let Ok(payload @ Value::Object(_)) = serde_json::from_str::<Value>(&body) {
                if error_message(&payload).is_some() {
                    return Ok(payload);
                }
            }
            return Err(WorkerError::Remote {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WorkerError::MalformedPayload(format!("Response is not JSON: {}", e)))
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}
