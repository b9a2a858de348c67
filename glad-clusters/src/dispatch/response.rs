//! Raw per-tile results.

use serde_json::Value;

use crate::coord::TileCoord;

/// Trace tag for a worker call that returned an error.
pub const TRACE_INVOKE: &str = "dispatch.invoke";

/// Trace tag for a worker call that panicked.
pub const TRACE_PANIC: &str = "dispatch.panic";

/// Outcome of one worker invocation, tagged with its tile.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub tile: TileCoord,
    pub body: ResponseBody,
}

/// What came back from the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Whatever JSON the worker returned, success- or failure-shaped
    Payload(Value),
    /// The invocation itself failed
    InvocationFailed { error: String, trace: &'static str },
}

impl RawResponse {
    pub fn payload(tile: TileCoord, payload: Value) -> Self {
        Self {
            tile,
            body: ResponseBody::Payload(payload),
        }
    }

    pub fn failed(tile: TileCoord, error: impl Into<String>, trace: &'static str) -> Self {
        Self {
            tile,
            body: ResponseBody::InvocationFailed {
                error: error.into(),
                trace,
            },
        }
    }

    pub fn is_invocation_failure(&self) -> bool {
        matches!(self.body, ResponseBody::InvocationFailed { .. })
    }
}
