//! Per-tile worker boundary.
//!
//! The clustering itself runs remotely. This module defines the contract the
//! dispatcher relies on ([`TileWorker`]), the request every invocation sends
//! ([`WorkerRequest`]), and the production implementation that reaches the
//! function over HTTPS ([`HttpTileWorker`]).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dispatcher                            │
//! │              (depends on &dyn TileWorker)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TileWorker Trait                         │
//! │          invoke(&WorkerRequest) -> serde_json::Value        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//! ┌─────────────────────────┐   ┌─────────────────────────────┐
//! │     HttpTileWorker      │   │      test doubles           │
//! │  (reqwest, JSON POST)   │   │                             │
//! └─────────────────────────┘   └─────────────────────────────┘
//! ```

mod http;
mod types;

pub use http::HttpTileWorker;
pub use types::{TileWorker, WorkerError, WorkerRequest};
