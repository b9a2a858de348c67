//! Turning raw tile responses into tables.
//!
//! Every response lands in exactly one place:
//!
//! - an [`ErrorRecord`] when the invocation failed, the worker reported an
//!   `error`/`errorMessage`, or the payload could not be read;
//! - one [`ClusterRecord`] per entry of `data.clusters` otherwise;
//! - the empty-tile list when a successful payload had no clusters.

mod aggregator;
mod payload;
mod records;

pub(crate) use aggregator::compare_timestamps;
pub(crate) use payload::error_message;
pub use aggregator::{aggregate, AggregateSummary, Aggregation, TRACE_ERROR, TRACE_MALFORMED};
pub use records::{AlertHit, ClusterRecord, ClusterView, ErrorRecord};
