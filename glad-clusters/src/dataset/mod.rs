//! Read-only query surface over a finished run.
//!
//! A [`Dataset`] owns the cluster and error tables produced by aggregation,
//! together with the tile range they were computed for. Row ids are
//! zero-based positions in the cluster table.

mod query;
mod table;

pub use query::{ClusterQuery, QueryLocation};
pub use table::{Dataset, DatasetError, CLUSTER_COLUMNS, ERROR_COLUMNS, VIEW_COLUMNS};
