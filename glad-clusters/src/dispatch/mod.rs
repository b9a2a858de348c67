//! Bounded-concurrency fan-out of tile invocations.
//!
//! The dispatcher walks a resolved tile range and invokes the
//! [`TileWorker`](crate::worker::TileWorker) once per tile, collecting one
//! [`RawResponse`] per tile. Per-tile failures never abort the batch; they
//! come back as [`ResponseBody::InvocationFailed`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ResolvedRange                            │
//! │        TileBounds (grid)  or  focus tile (point)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Dispatcher                              │
//! │  - Scoped thread pool (min(max_in_flight, tiles) threads)   │
//! │  - Shared tile iterator behind a mutex                      │
//! │  - Panics and errors captured per tile                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │             Vec<RawResponse> (one per tile)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod dispatcher;
mod response;

pub use dispatcher::{DispatchError, DispatchOutput, DispatchSummary, Dispatcher};
pub use response::{RawResponse, ResponseBody, TRACE_INVOKE, TRACE_PANIC};
