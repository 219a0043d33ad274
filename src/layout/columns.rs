//! Column layout: effective widths, offsets, frozen partition and the
//! horizontally visible window.

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{DefaultColumnOptions, COLUMN_OVERSCAN, SELECT_COLUMN_KEY};
use crate::types::{CalculatedColumn, Column};

/// Inclusive range of non-frozen columns to render, overscan included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWindow {
    pub overscan_start: usize,
    pub overscan_end: usize,
}

/// Laid-out columns for one combination of declarations, width overrides,
/// viewport width and group-by keys.
#[derive(Debug, Clone)]
pub struct ColumnLayout<R> {
    pub columns: Vec<CalculatedColumn<R>>,
    /// Sum of all column widths.
    pub total_width: f32,
    /// Index of the last left-frozen column.
    pub last_frozen_idx: Option<usize>,
    /// Right edge of the last left-frozen column.
    pub total_frozen_width: f32,
    /// Keys of the row-group columns in layout order.
    pub group_by: Vec<String>,
    viewport_width: f32,
}

impl<R> Default for ColumnLayout<R> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            total_width: 0.0,
            last_frozen_idx: None,
            total_frozen_width: 0.0,
            group_by: Vec::new(),
            viewport_width: 0.0,
        }
    }
}

fn clamp_width<R>(width: f32, column: &Column<R>, global_min: f32) -> f32 {
    let min = column.min_width.map_or(global_min, |m| m.max(global_min));
    let width = width.max(min);
    match column.max_width {
        Some(max) => width.min(max),
        None => width,
    }
}

impl<R> ColumnLayout<R> {
    /// Lay out `raw` columns.
    ///
    /// `overrides` holds widths set by the user through resizing and wins
    /// over every declared width. Columns whose key is in `group_by` become
    /// frozen row-group columns and move to the front, after the selection
    /// column, in `group_by` order. Other left-frozen columns follow them,
    /// ahead of every scrollable column.
    pub fn compute(
        raw: &[Rc<Column<R>>],
        overrides: &HashMap<String, f32>,
        viewport_width: f32,
        group_by: &[String],
        defaults: &DefaultColumnOptions,
    ) -> Self {
        let global_min = defaults.min_width;
        let mut allocated = 0.0_f32;
        let mut unassigned_count = 0_u32;

        let mut resolved: Vec<(Rc<Column<R>>, Option<f32>, bool)> = raw
            .iter()
            .map(|column| {
                let specified = overrides
                    .get(&column.key)
                    .copied()
                    .or_else(|| column.width.resolve(viewport_width));
                let width = match specified {
                    Some(w) => {
                        let w = clamp_width(w, column, global_min);
                        allocated += w;
                        Some(w)
                    }
                    None => {
                        unassigned_count += 1;
                        None
                    }
                };
                let row_group = group_by.iter().any(|k| *k == column.key);
                (Rc::clone(column), width, row_group)
            })
            .collect();

        // Stable: declaration order survives inside each band.
        resolved.sort_by_key(|(column, _, row_group)| {
            if column.key == SELECT_COLUMN_KEY {
                0
            } else if *row_group {
                1 + group_by
                    .iter()
                    .position(|k| *k == column.key)
                    .unwrap_or(0)
            } else if column.frozen && !column.is_frozen_right() {
                usize::MAX - 1
            } else {
                usize::MAX
            }
        });

        let unallocated_width = if unassigned_count == 0 {
            global_min
        } else {
            #[allow(clippy::cast_precision_loss)]
            let share = ((viewport_width - allocated) / unassigned_count as f32).floor();
            share.max(global_min)
        };

        let mut left = 0.0_f32;
        let mut total_width = 0.0_f32;
        let mut layout_group_by = Vec::new();
        let mut columns: Vec<CalculatedColumn<R>> = resolved
            .into_iter()
            .enumerate()
            .map(|(idx, (column, width, row_group))| {
                let width =
                    width.unwrap_or_else(|| clamp_width(unallocated_width, &column, global_min));
                let frozen = column.frozen || row_group;
                let frozen_right = frozen && column.is_frozen_right();
                if row_group {
                    layout_group_by.push(column.key.clone());
                }
                let calculated = CalculatedColumn {
                    idx,
                    left: if frozen_right {
                        viewport_width - width
                    } else {
                        left
                    },
                    width,
                    frozen,
                    row_group,
                    is_last_frozen_column: false,
                    sortable: column.sortable.unwrap_or(defaults.sortable),
                    resizable: column.resizable.unwrap_or(defaults.resizable),
                    column,
                };
                total_width += width;
                if !frozen_right {
                    left += width;
                }
                calculated
            })
            .collect();

        let last_frozen_idx = columns
            .iter()
            .rposition(|c| c.frozen && !c.is_frozen_right());
        let mut total_frozen_width = 0.0;
        if let Some(last) = last_frozen_idx.and_then(|i| columns.get_mut(i)) {
            last.is_last_frozen_column = true;
            total_frozen_width = last.right();
        }

        tracing::debug!(
            columns = columns.len(),
            total_width,
            total_frozen_width,
            unassigned = unassigned_count,
            "column layout computed"
        );

        Self {
            columns,
            total_width,
            last_frozen_idx,
            total_frozen_width,
            group_by: layout_group_by,
            viewport_width,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&CalculatedColumn<R>> {
        self.columns.get(idx)
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Layout index of the column with `key`.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key() == key)
    }

    /// Whether `idx` is past the frozen block and therefore scrolls.
    pub fn is_scrollable(&self, idx: usize) -> bool {
        self.last_frozen_idx.map_or(true, |last| idx > last)
    }

    /// Columns overlapping `[scroll_left + frozen width, scroll_left + viewport width]`,
    /// widened by one column of overscan on each side.
    ///
    /// A viewport narrower than the frozen block collapses the window to the
    /// first unfrozen column.
    pub fn viewport_window(&self, scroll_left: f32) -> Option<ColumnWindow> {
        let last_col_idx = self.columns.len().checked_sub(1)?;
        let viewport_left = scroll_left + self.total_frozen_width;
        let viewport_right = scroll_left + self.viewport_width;
        let first_unfrozen = self
            .last_frozen_idx
            .map_or(0, |i| i + 1)
            .min(last_col_idx);

        if viewport_left >= viewport_right {
            return Some(ColumnWindow {
                overscan_start: first_unfrozen,
                overscan_end: first_unfrozen,
            });
        }

        let mut visible_start = first_unfrozen;
        while visible_start < last_col_idx {
            match self.columns.get(visible_start) {
                Some(c) if c.right() > viewport_left => break,
                _ => visible_start += 1,
            }
        }

        let mut visible_end = visible_start;
        while visible_end < last_col_idx {
            match self.columns.get(visible_end) {
                Some(c) if c.right() >= viewport_right => break,
                _ => visible_end += 1,
            }
        }

        let window = ColumnWindow {
            overscan_start: visible_start
                .saturating_sub(COLUMN_OVERSCAN)
                .max(first_unfrozen),
            overscan_end: (visible_end + COLUMN_OVERSCAN).min(last_col_idx),
        };
        tracing::trace!(
            scroll_left,
            start = window.overscan_start,
            end = window.overscan_end,
            "column window"
        );
        Some(window)
    }

    /// Frozen columns followed by the columns of `window`, in layout order.
    pub fn viewport_columns(
        &self,
        window: ColumnWindow,
    ) -> impl Iterator<Item = &CalculatedColumn<R>> + '_ {
        self.columns.iter().filter(move |c| {
            c.frozen || (window.overscan_start..=window.overscan_end).contains(&c.idx)
        })
    }

    /// On-screen x of a column's left edge for the given scroll offset.
    pub fn rect_left(&self, idx: usize, scroll_left: f32) -> Option<f32> {
        let column = self.columns.get(idx)?;
        Some(if column.frozen {
            column.left
        } else {
            column.left - scroll_left
        })
    }

    /// Column under an on-screen x coordinate.
    pub fn column_at_x(&self, x: f32, scroll_left: f32) -> Option<usize> {
        if x < 0.0 {
            return None;
        }
        let contains = |left: f32, width: f32| x >= left && x < left + width;
        if let Some(c) = self
            .columns
            .iter()
            .find(|c| c.frozen && contains(c.left, c.width))
        {
            return Some(c.idx);
        }
        if x < self.total_frozen_width {
            return None;
        }
        self.columns
            .iter()
            .find(|c| !c.frozen && contains(c.left - scroll_left, c.width))
            .map(|c| c.idx)
    }
}
