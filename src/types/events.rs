use serde::{Deserialize, Serialize};

use super::Position;

/// A key press as seen by the grid.
///
/// `key` uses DOM key names (`"ArrowLeft"`, `"Tab"`, `"a"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl or Cmd held together with another key.
    pub fn is_ctrl_held(&self) -> bool {
        (self.ctrl || self.meta) && self.key != "Control"
    }
}

/// Why a new row array was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChangeCause<R> {
    /// An editor committed changes to one row.
    Commit {
        /// Index into the raw row array.
        row_idx: usize,
        column_key: String,
    },
    /// Clipboard text was written into a block of cells.
    Paste {
        column_key: String,
        /// Raw indices of the rows that were written.
        target_rows: Vec<usize>,
        target_cols: Vec<String>,
        updated_target_rows: Vec<R>,
    },
    /// A fill drag was released.
    Fill {
        column_key: String,
        /// Raw indices of the rows handed to the fill collaborator.
        target_rows: Vec<usize>,
        target_cols: Vec<String>,
        updated_target_rows: Vec<R>,
        across: bool,
    },
    /// The fill handle was double-clicked.
    FillToEnd { column_key: String },
    /// A formatter replaced a row.
    RowUpdate { row_idx: usize },
}

/// Notification carrying the complete new row array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsChangeEvent<R> {
    pub new_rows: Vec<R>,
    pub cause: ChangeCause<R>,
}

/// Request handed to the fill collaborator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillEvent<'a, R> {
    pub column_key: &'a str,
    pub source_row: &'a R,
    pub target_rows: &'a [R],
    /// Columns to fill for across-fills. Empty for down-fills.
    pub target_cols: &'a [String],
    pub across: bool,
}

/// Notification sent just before a paste is applied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteEvent<'a> {
    pub text: &'a str,
    pub position: Position,
    pub column_key: &'a str,
}

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Active sort, `None` direction meaning unsorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortColumn {
    pub column_key: String,
    pub direction: Option<SortDirection>,
}

/// Scroll notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollEvent {
    pub scroll_top: f32,
    pub scroll_left: f32,
    /// Bottom of the data reached. Hosts use it to fetch the next page.
    pub at_bottom: bool,
}
