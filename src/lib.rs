//! vgrid - virtualized data grid core
//!
//! Layout, virtualization and interaction logic for a spreadsheet-like grid,
//! drawn to Canvas 2D when built for WebAssembly:
//! - Column widths, frozen columns and horizontal virtualization
//! - Grouped rows flattened into one sequence, with overscanned row windows
//! - Cell selection, keyboard navigation and in-place editing
//! - Copy/paste and drag-to-fill across cell ranges
//! - Cost formatting for pasted and edited values
//!
//! The host owns the data. Rows, sort, filters, expanded groups and selected
//! rows are passed in and every change comes back through a callback.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'vgrid';
//! await init();
//! const grid = new GridView(container, canvas, columns, rows, { rowKey: 'id' }, devicePixelRatio);
//! grid.on('rowsChange', ({ rows }) => grid.setRows(rows));
//! ```

pub mod clipboard;
pub mod config;
pub mod error;
pub mod fill;
pub mod format;
pub mod grid;
pub mod layout;
pub mod render;
pub mod selection;
pub mod types;
#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use config::{CellNavigationMode, DefaultColumnOptions, GridConfig};
pub use error::{GridError, Result};
pub use grid::{GridCallbacks, GridController, KeyOutcome, ScrollRequest};
pub use types::*;
#[cfg(target_arch = "wasm32")]
pub use viewer::GridView;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
