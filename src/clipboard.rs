//! Copy ranges and paste mutations.
//!
//! Copies are one column wide: the selected cell plus every row down (or up)
//! to the dragged-over row. Pastes write a tab/newline separated block
//! starting at the selected cell.

use std::collections::HashSet;

use crate::error::{GridError, Result};
use crate::fill::DragOverState;
use crate::selection::GridContext;
use crate::types::{CellValue, ChangeCause, GridRow, Position, RowsChangeEvent};

/// Row key getter supplied by the host.
pub type RowKeyFn<R> = dyn Fn(&R) -> String;

/// Snapshot of the rows and column last copied.
#[derive(Debug, Clone, PartialEq)]
pub struct CopiedRange<R> {
    pub rows: Vec<R>,
    pub column_key: String,
    row_keys: HashSet<String>,
    first_key: Option<String>,
    last_key: Option<String>,
}

impl<R> CopiedRange<R> {
    pub fn contains_key(&self, key: &str) -> bool {
        self.row_keys.contains(key)
    }

    pub fn first_key(&self) -> Option<&str> {
        self.first_key.as_deref()
    }

    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Membership and edge markers for the row with this key.
    pub fn marks(&self, key: &str) -> CopyMarks {
        let copied = self.contains_key(key);
        CopyMarks {
            copied,
            first: copied && self.first_key() == Some(key),
            last: copied && self.last_key() == Some(key),
        }
    }
}

/// How one row relates to the copied range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyMarks {
    pub copied: bool,
    pub first: bool,
    pub last: bool,
}

/// Split clipboard text into rows of cells.
///
/// Lines split on `\n` with any `\r` removed, cells split on tabs only so
/// free text containing spaces stays in one cell. A single trailing newline,
/// as spreadsheets append, does not add an empty row.
pub fn parse_clipboard_text(text: &str) -> Vec<Vec<String>> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.len() > 1 && lines.last().is_some_and(|l| l.trim_matches('\r').is_empty()) {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| line.split('\t').map(|cell| cell.replace('\r', "")).collect())
        .collect()
}

/// Tracks the copied range and applies pastes.
#[derive(Debug, Clone)]
pub struct ClipboardController<R> {
    copied: Option<CopiedRange<R>>,
}

impl<R> Default for ClipboardController<R> {
    fn default() -> Self {
        Self { copied: None }
    }
}

impl<R: GridRow> ClipboardController<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copied(&self) -> Option<&CopiedRange<R>> {
        self.copied.as_ref()
    }

    /// Forget the copied range.
    pub fn clear(&mut self) {
        self.copied = None;
    }

    /// Copy the selected cell's column from the selected row to the
    /// dragged-over row.
    ///
    /// Returns the clipboard text, one line per row, or `None` when nothing
    /// is copied because no column is selected or the selected cell is
    /// disabled. Disabled cells inside the range still contribute their text
    /// so the pasted block keeps its shape.
    pub fn copy(
        &mut self,
        ctx: &GridContext<'_, R>,
        selected: Position,
        drag: &DragOverState,
        row_key: Option<&RowKeyFn<R>>,
    ) -> Result<Option<String>> {
        let (Some(column), Some(row_idx)) = (ctx.column(selected.idx), selected.row()) else {
            return Ok(None);
        };
        if ctx.row(row_idx).is_none() || ctx.is_cell_disabled(selected) {
            return Ok(None);
        }
        let row_key = row_key.ok_or(GridError::MissingRowKeyGetter { feature: "copy" })?;

        let over_row = drag.over_row.unwrap_or(row_idx);
        let rows: Vec<R> = (row_idx.min(over_row)..=row_idx.max(over_row))
            .filter_map(|i| ctx.row(i))
            .cloned()
            .collect();
        let key = column.key();
        let text = rows
            .iter()
            .map(|r| r.cell_text(key))
            .collect::<Vec<_>>()
            .join("\n");

        tracing::debug!(column = key, rows = rows.len(), "copied");
        let keys: Vec<String> = rows.iter().map(row_key).collect();
        self.copied = Some(CopiedRange {
            first_key: keys.first().cloned(),
            last_key: keys.last().cloned(),
            row_keys: keys.into_iter().collect(),
            rows,
            column_key: key.to_string(),
        });
        Ok(Some(text))
    }

    /// Write `text` into the block starting at the selected cell.
    ///
    /// Nothing happens unless `enabled` (the host handles both pastes and
    /// row changes), the text is non-empty and the selected cell is editable
    /// and not disabled. Disabled cells inside the block are skipped one by
    /// one. On success the drag markers move to the block's bottom-right
    /// corner and the copied range is cleared.
    pub fn paste(
        &mut self,
        ctx: &GridContext<'_, R>,
        selected: Position,
        text: &str,
        enabled: bool,
        drag: &mut DragOverState,
    ) -> Option<RowsChangeEvent<R>> {
        let (start_col, start_row) = (selected.col()?, selected.row()?);
        let column = ctx.column(selected.idx)?;
        if !enabled
            || text.is_empty()
            || !ctx.is_cell_editable(selected)
            || ctx.is_cell_disabled(selected)
        {
            return None;
        }

        let block = parse_clipboard_text(text);
        let width = block.first().map_or(1, Vec::len).max(1);
        let end_col = start_col + width - 1;
        let end_row = start_row + block.len().saturating_sub(1);

        let mut new_rows = ctx.raw_rows.to_vec();
        let mut target_rows = Vec::new();
        let mut updated_target_rows = Vec::new();
        for (i, cells) in block.iter().enumerate() {
            let Some(raw_idx) = ctx.rows.raw_index(start_row + i) else {
                continue;
            };
            let Some(row) = new_rows.get_mut(raw_idx) else {
                continue;
            };
            for (offset, value) in cells.iter().enumerate() {
                let Some(target) = ctx.columns.get(start_col + offset) else {
                    continue;
                };
                let key = target.key();
                if row.is_cell_disabled(key) {
                    continue;
                }
                let value = target.column.formatted_paste_value(value);
                let cell = row
                    .cell(key)
                    .map_or_else(|| CellValue::Plain(value.clone()), |c| c.with_text(value.clone()));
                row.set_cell(key, cell);
            }
            target_rows.push(raw_idx);
            updated_target_rows.push(row.clone());
        }

        let target_cols: Vec<String> = (start_col..=end_col)
            .filter_map(|i| ctx.columns.get(i))
            .map(|c| c.key().to_string())
            .collect();

        tracing::debug!(
            rows = target_rows.len(),
            cols = target_cols.len(),
            "pasted"
        );
        drag.set_over_row(Some(end_row));
        drag.set_over_col(Some(end_col));
        self.clear();

        Some(RowsChangeEvent {
            new_rows,
            cause: ChangeCause::Paste {
                column_key: column.key().to_string(),
                target_rows,
                target_cols,
                updated_target_rows,
            },
        })
    }

    /// Where `row` sits in the copied range. Rows are matched by key, so
    /// the marks survive the host handing back new row values.
    pub fn marks(&self, row: &R, row_key: &RowKeyFn<R>) -> CopyMarks {
        self.copied
            .as_ref()
            .map(|c| c.marks(&row_key(row)))
            .unwrap_or_default()
    }

    /// Layout index of the copied column.
    pub fn copied_column_idx(&self, ctx: &GridContext<'_, R>) -> Option<usize> {
        self.copied
            .as_ref()
            .and_then(|c| ctx.columns.index_of(&c.column_key))
    }
}
