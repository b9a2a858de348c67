//! Tile range resolution.
//!
//! A request names its area of interest in one of four shapes. This module
//! normalizes whichever shape was supplied into a [`TileBounds`] rectangle at
//! the run's zoom level.
//!
//! | Precedence | Shape | Point-shaped |
//! |---|---|---|
//! | 1 | tile-corner pair | no |
//! | 2 | lon/lat corner pair | no |
//! | 3 | single lon/lat point | yes |
//! | 4 | single tile x/y | yes |
//!
//! Point-shaped inputs also yield a distinguished focus tile so the
//! dispatcher can skip the grid walk entirely.
//!
//! # Example
//!
//! ```
//! use glad_clusters::bounds::{resolve, LocationSpec};
//!
//! let spec = LocationSpec::new().with_point(-60.0, -3.0);
//! let range = resolve(&spec, 10).unwrap();
//! assert_eq!(range.bounds.request_size(), 1);
//! assert!(range.focus.is_some());
//! ```

mod range;
mod resolver;

pub use range::{GeoBounds, TileBounds, TileBoundsIter};
pub use resolver::{resolve, LocationShape, LocationSpec, ResolvedRange};
