//! Header interactions: sorting, filters, row selection and column resize.
//!
//! Sort, filters and the selected-row set are owned by the host. The grid
//! mirrors the latest values it was given and reports each change through a
//! callback; the host answers with the matching setter.

use std::collections::{BTreeMap, HashSet};

use super::GridController;
use crate::error::{GridError, Result};
use crate::types::{GridRow, SortColumn, SortDirection};

/// An active column resize gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub column_idx: usize,
    /// Width of the column when the gesture started.
    pub start_width: f32,
}

/// Header-level state mirrored from the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderState {
    pub sort: Option<SortColumn>,
    pub filters: BTreeMap<String, String>,
    pub selected_rows: HashSet<String>,
    /// Flat index of the last row checked without shift, for range selection.
    pub last_selected_row_idx: Option<usize>,
    pub resize: Option<ResizeSession>,
}

/// Next direction when a sortable header is clicked.
///
/// Cycles `none -> asc -> desc -> none`, or `none -> desc -> asc -> none`
/// for columns that sort descending first.
pub fn next_sort_direction(
    current: Option<SortDirection>,
    descending_first: bool,
) -> Option<SortDirection> {
    match (current, descending_first) {
        (None, false) | (Some(SortDirection::Desc), true) => Some(SortDirection::Asc),
        (None, true) | (Some(SortDirection::Asc), false) => Some(SortDirection::Desc),
        (Some(SortDirection::Asc), true) | (Some(SortDirection::Desc), false) => None,
    }
}

impl<R: GridRow> GridController<R> {
    // ----- sort -----------------------------------------------------------

    /// Current sort direction of column `key`.
    pub fn sort_direction(&self, key: &str) -> Option<SortDirection> {
        self.header
            .sort
            .as_ref()
            .filter(|s| s.column_key == key)
            .and_then(|s| s.direction)
    }

    /// Header click on column `idx`. Non-sortable columns ignore it.
    pub fn sort_column(&mut self, idx: usize) {
        let Some(column) = self.layout.get(idx) else {
            return;
        };
        if !column.sortable {
            return;
        }
        let event = SortColumn {
            column_key: column.key().to_string(),
            direction: next_sort_direction(
                self.sort_direction(column.key()),
                column.column.sort_descending_first,
            ),
        };
        tracing::debug!(column = %event.column_key, direction = ?event.direction, "sort requested");
        if let Some(f) = self.callbacks.on_sort.as_mut() {
            f(&event);
        }
    }

    pub fn set_sort(&mut self, sort: Option<SortColumn>) {
        self.header.sort = sort;
    }

    // ----- filters --------------------------------------------------------

    /// Edit in the filter row. An empty value clears that column's filter.
    pub fn set_filter(&mut self, key: &str, value: &str) {
        let mut filters = self.header.filters.clone();
        if value.is_empty() {
            filters.remove(key);
        } else {
            filters.insert(key.to_string(), value.to_string());
        }
        if let Some(f) = self.callbacks.on_filters_change.as_mut() {
            f(&filters);
        }
    }

    pub fn set_filters(&mut self, filters: BTreeMap<String, String>) {
        self.header.filters = filters;
    }

    pub fn filter_value(&self, key: &str) -> &str {
        self.header.filters.get(key).map_or("", String::as_str)
    }

    // ----- row selection --------------------------------------------------

    fn row_key_getter(&self) -> Result<&crate::clipboard::RowKeyFn<R>> {
        self.callbacks
            .row_key
            .as_deref()
            .ok_or(GridError::MissingRowKeyGetter {
                feature: "row selection",
            })
    }

    /// Check or uncheck the row at flat index `flat_idx`.
    ///
    /// Group rows apply to every row in the group. Shift-checking a leaf
    /// row also checks the leaf rows between it and the previously checked
    /// one.
    pub fn select_row(&mut self, flat_idx: usize, checked: bool, shift: bool) -> Result<()> {
        let key_fn = self.row_key_getter()?;
        let ctx = self.context();
        let mut selected = self.header.selected_rows.clone();
        let mut last_selected = self.header.last_selected_row_idx;

        if let Some(group) = ctx.group_row(flat_idx) {
            for row in group.child_rows.iter().filter_map(|&i| self.rows.get(i)) {
                if checked {
                    selected.insert(key_fn(row));
                } else {
                    selected.remove(&key_fn(row));
                }
            }
        } else {
            let Some(row) = ctx.row(flat_idx) else {
                return Ok(());
            };
            if checked {
                selected.insert(key_fn(row));
                let previous = last_selected.replace(flat_idx);
                if let Some(previous) = previous.filter(|&p| shift && p != flat_idx) {
                    let (lo, hi) = (previous.min(flat_idx), previous.max(flat_idx));
                    for i in lo + 1..hi {
                        if let Some(row) = ctx.row(i) {
                            selected.insert(key_fn(row));
                        }
                    }
                }
            } else {
                selected.remove(&key_fn(row));
                last_selected = None;
            }
        }

        self.header.last_selected_row_idx = last_selected;
        if let Some(f) = self.callbacks.on_selected_rows_change.as_mut() {
            f(&selected);
        }
        Ok(())
    }

    /// Check or uncheck every row.
    pub fn select_all_rows(&mut self, checked: bool) -> Result<()> {
        let key_fn = self.row_key_getter()?;
        let mut selected = self.header.selected_rows.clone();
        for row in &self.rows {
            if checked {
                selected.insert(key_fn(row));
            } else {
                selected.remove(&key_fn(row));
            }
        }
        if let Some(f) = self.callbacks.on_selected_rows_change.as_mut() {
            f(&selected);
        }
        Ok(())
    }

    /// Whether every row is checked. `false` for an empty grid.
    pub fn all_rows_selected(&self) -> Result<bool> {
        let key_fn = self.row_key_getter()?;
        Ok(!self.rows.is_empty()
            && self
                .rows
                .iter()
                .all(|row| self.header.selected_rows.contains(&key_fn(row))))
    }

    pub fn is_row_selected(&self, flat_idx: usize) -> Result<bool> {
        let key_fn = self.row_key_getter()?;
        Ok(self
            .context()
            .row(flat_idx)
            .is_some_and(|row| self.header.selected_rows.contains(&key_fn(row))))
    }

    pub fn set_selected_rows(&mut self, rows: HashSet<String>) {
        self.header.selected_rows = rows;
    }

    // ----- column resize --------------------------------------------------

    /// Start resizing column `idx`. Returns `false` for columns that are not
    /// resizable.
    pub fn begin_resize(&mut self, idx: usize) -> bool {
        let Some(column) = self.layout.get(idx) else {
            return false;
        };
        if !column.resizable {
            return false;
        }
        self.header.resize = Some(ResizeSession {
            column_idx: idx,
            start_width: column.width,
        });
        true
    }

    /// Pointer moved `dx` pixels since the resize started.
    pub fn resize_to(&mut self, dx: f32) {
        let Some(session) = self.header.resize else {
            return;
        };
        let width = session.start_width + dx;
        if width <= 0.0 {
            return;
        }
        let Some(key) = self.layout.get(session.column_idx).map(|c| c.key().to_string()) else {
            return;
        };
        self.column_widths.insert(key, width);
        self.refresh_columns();
        let applied = self
            .layout
            .get(session.column_idx)
            .map_or(width, |c| c.width);
        if let Some(f) = self.callbacks.on_column_resize.as_mut() {
            f(session.column_idx, applied);
        }
    }

    pub fn end_resize(&mut self) {
        self.header.resize = None;
    }

    pub fn is_resizing(&self) -> bool {
        self.header.resize.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_cycles() {
        let asc = Some(SortDirection::Asc);
        let desc = Some(SortDirection::Desc);
        assert_eq!(next_sort_direction(None, false), asc);
        assert_eq!(next_sort_direction(asc, false), desc);
        assert_eq!(next_sort_direction(desc, false), None);
        assert_eq!(next_sort_direction(None, true), desc);
        assert_eq!(next_sort_direction(desc, true), asc);
        assert_eq!(next_sort_direction(asc, true), None);
    }
}
