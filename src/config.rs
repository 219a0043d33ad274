//! Grid configuration.
//!
//! Everything here deserializes from a camelCase JS object so the WASM facade
//! can accept the host's options verbatim. Missing fields fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rows kept beyond the visible window before batch rounding kicks in.
pub const OVERSCAN_THRESHOLD: usize = 4;

/// Row windows are rounded outward to multiples of this many rows.
pub const RENDER_BATCH_SIZE: usize = 8;

/// Extra columns rendered on each side of the visible column range.
pub const COLUMN_OVERSCAN: usize = 1;

/// Global minimum column width when the caller does not set one.
pub const DEFAULT_MIN_COLUMN_WIDTH: f32 = 54.0;

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: f32 = 35.0;

/// Default height of the header filter row in pixels.
pub const DEFAULT_HEADER_FILTERS_HEIGHT: f32 = 45.0;

/// Key of the row-selection checkbox column. Always laid out first.
pub const SELECT_COLUMN_KEY: &str = "select-row";

/// What happens when keyboard navigation runs past the first or last column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellNavigationMode {
    /// Stay on the edge column.
    #[default]
    None,
    /// Continue on the adjacent row at the opposite edge.
    ChangeRow,
    /// Wrap around within the same row.
    LoopOverRow,
}

/// Options applied to every column that does not set its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultColumnOptions {
    /// Minimum width for columns without an explicit `min_width`.
    pub min_width: f32,
    /// Whether columns are sortable unless they say otherwise.
    pub sortable: bool,
    /// Whether columns are resizable unless they say otherwise.
    pub resizable: bool,
}

impl Default for DefaultColumnOptions {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_COLUMN_WIDTH,
            sortable: false,
            resizable: false,
        }
    }
}

/// Grid-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Height of every data and group row.
    pub row_height: f32,
    /// Height of the header row. Falls back to `row_height`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_row_height: Option<f32>,
    /// Height of the filter row shown under the header.
    pub header_filters_height: f32,
    /// Whether the filter row is shown.
    pub enable_filter_row: bool,
    /// Number of summary rows pinned to the bottom.
    pub summary_row_count: usize,
    /// Behaviour of horizontal navigation at row edges.
    pub cell_navigation_mode: CellNavigationMode,
    /// Defaults for every column.
    pub default_column_options: DefaultColumnOptions,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            header_row_height: None,
            header_filters_height: DEFAULT_HEADER_FILTERS_HEIGHT,
            enable_filter_row: false,
            summary_row_count: 0,
            cell_navigation_mode: CellNavigationMode::None,
            default_column_options: DefaultColumnOptions::default(),
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective header row height.
    pub fn header_row_height(&self) -> f32 {
        self.header_row_height.unwrap_or(self.row_height)
    }

    /// Header height plus the filter row when it is enabled.
    pub fn total_header_height(&self) -> f32 {
        let filters = if self.enable_filter_row {
            self.header_filters_height
        } else {
            0.0
        };
        self.header_row_height() + filters
    }

    /// Height of the pinned summary rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn summary_rows_height(&self) -> f32 {
        self.summary_row_count as f32 * self.row_height
    }

    /// Height left for scrolling rows in a grid of the given outer height.
    pub fn client_height(&self, grid_height: f32) -> f32 {
        (grid_height - self.total_header_height() - self.summary_rows_height()).max(0.0)
    }
}
