//! Output formatting for result tables.

use std::io::{self, Write};

use serde::Serialize;

use glad_clusters::dataset::Dataset;

/// Write one JSON object per row.
pub fn write_json_lines<W: Write, T: Serialize>(out: &mut W, rows: &[T]) -> io::Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// One-line human summary of a dataset.
pub fn summary_line(dataset: &Dataset) -> String {
    let summary = dataset.summary();
    format!(
        "{} tiles: {} clusters from {} tiles, {} empty, {} errors",
        dataset.request_size(),
        summary.cluster_rows,
        summary.tiles_with_clusters,
        summary.empty_tiles,
        summary.error_rows
    )
}
