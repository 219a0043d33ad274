//! Layout engine for columns, rows and the scroll viewport.
//!
//! This module handles:
//! - Column widths, offsets and the frozen partition
//! - Grouping and flattening rows into a single logical sequence
//! - Computing the overscanned row and column windows for a scroll offset
//! - Scroll-into-view offsets for cells

mod columns;
mod rows;
mod viewport;

pub use columns::{ColumnLayout, ColumnWindow};
pub use rows::{FlatRow, GroupByCell, GroupRow, RowGrouper, RowModel, RowWindow};
pub use viewport::Viewport;
