//! Fill-handle and range drags.
//!
//! [`DragOverState`] is the one piece of mutable interaction state shared by
//! selection, clipboard and fill logic. It is passed by `&mut` to whichever
//! controller is handling the current event and read synchronously by the
//! others, so there is never a stale copy to reconcile.
//!
//! A gesture is an owned [`DragSession`]: created on mouse-down, consumed on
//! release or pointer loss.

use crate::selection::GridContext;
use crate::types::{ChangeCause, FillEvent, GridRow, Position, RowsChangeEvent};

/// Inclusive run of column indices starting at the anchor column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub start: usize,
    pub end: usize,
}

impl ColumnSpan {
    pub fn contains(self, col: usize) -> bool {
        col >= self.start && col <= self.end
    }
}

/// Live drag-over markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragOverState {
    /// Column the selection was anchored on when it was last made.
    pub anchor_col: Option<usize>,
    /// Row the pointer is over, or where the last drag or paste ended.
    pub over_row: Option<usize>,
    /// Columns from the anchor to the pointer.
    pub over_cols: Option<ColumnSpan>,
}

impl DragOverState {
    /// Drop the row and column markers. The anchor stays.
    pub fn reset(&mut self) {
        self.over_row = None;
        self.over_cols = None;
    }

    pub fn set_over_row(&mut self, row: Option<usize>) {
        self.over_row = row;
    }

    /// Extend the column markers from the anchor to `col`.
    ///
    /// `None` collapses them to the anchor column. Columns left of the
    /// anchor are not tracked, so they collapse to the anchor too.
    pub fn set_over_col(&mut self, col: Option<usize>) {
        self.over_cols = self.anchor_col.map(|anchor| ColumnSpan {
            start: anchor,
            end: col.map_or(anchor, |c| c.max(anchor)),
        });
    }

    /// Column the pointer was last over.
    pub fn over_col(&self) -> Option<usize> {
        self.over_cols.map(|span| span.end)
    }

    /// Whether the cell at `(row, col)` is inside the dragged-over block
    /// spanning from `selected_row` to the live over row, in either direction.
    pub fn is_dragged_over(&self, selected_row: usize, row: usize, col: usize) -> bool {
        let (Some(over_row), Some(cols)) = (self.over_row, self.over_cols) else {
            return false;
        };
        cols.contains(col) && row >= selected_row.min(over_row) && row <= selected_row.max(over_row)
    }
}

/// What started the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Mouse-down on a cell: extends a range selection.
    Cell,
    /// Mouse-down on the fill handle.
    Fill,
}

/// An active mouse-down drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub kind: DragKind,
    /// For fills, the row the previous range ended on, or the selected row.
    pub origin_row: Option<usize>,
}

impl DragSession {
    pub fn is_fill(&self) -> bool {
        self.kind == DragKind::Fill
    }
}

/// Collaborator that computes filled rows.
pub type FillFn<'f, R> = dyn FnMut(&FillEvent<'_, R>) -> Vec<R> + 'f;

/// Tracks the active drag gesture and turns releases into fills.
#[derive(Debug, Default)]
pub struct FillDragController {
    session: Option<DragSession>,
}

impl FillDragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_filling(&self) -> bool {
        self.session.as_ref().is_some_and(DragSession::is_fill)
    }

    /// Start a range drag from the selected cell.
    pub fn begin_cell_drag(&mut self) {
        self.session = Some(DragSession {
            kind: DragKind::Cell,
            origin_row: None,
        });
    }

    /// Start a fill drag from the fill handle.
    pub fn begin_fill_drag(&mut self, selected: Position, drag: &DragOverState) {
        self.session = Some(DragSession {
            kind: DragKind::Fill,
            origin_row: drag.over_row.or_else(|| selected.row()),
        });
    }

    /// Pointer entered the cell at `(row, col)` while the button is held.
    ///
    /// Range drags follow the pointer down the anchor column. Fill drags
    /// follow it down the anchor column while they started on the selected
    /// row; once the pointer moves sideways, or when the fill started from
    /// the end of an earlier range, the row marker stays on that origin row
    /// and only the columns grow. That turns a vertical range into an
    /// L-shaped across-fill.
    pub fn drag_enter(&mut self, row: usize, col: usize, selected: Position, drag: &mut DragOverState) {
        let Some(session) = &self.session else {
            return;
        };
        match (session.kind, session.origin_row) {
            (DragKind::Fill, Some(origin)) => {
                if Some(origin) == selected.row() && Some(col) == selected.col() {
                    drag.set_over_row(Some(row));
                } else {
                    drag.set_over_row(Some(origin));
                }
            }
            _ => drag.set_over_row(Some(row)),
        }
        if session.is_fill() {
            drag.set_over_col(Some(col));
        } else {
            drag.set_over_col(selected.col());
        }
    }

    /// Whether a pointer event with `buttons` pressed means the drag was
    /// lost (button released outside the grid).
    pub fn pointer_lost(&self, buttons: u16) -> bool {
        self.session.is_some() && buttons != 1
    }

    /// End the gesture, returning the session that was active.
    pub fn end_drag(&mut self) -> Option<DragSession> {
        self.session.take()
    }
}

/// Double-click on the fill handle: fill every row below the selection.
pub fn fill_to_end<R: GridRow>(
    ctx: &GridContext<'_, R>,
    selected: Position,
    on_fill: &mut FillFn<'_, R>,
) -> Option<RowsChangeEvent<R>> {
    let column = ctx.column(selected.idx)?;
    let row_idx = selected.row()?;
    let source_row = ctx.raw_rows.get(row_idx)?;
    let targets = ctx.raw_rows.get(row_idx + 1..)?;
    let updated = on_fill(&FillEvent {
        column_key: column.key(),
        source_row,
        target_rows: targets,
        target_cols: &[],
        across: false,
    });
    let new_rows = splice(ctx.raw_rows, row_idx + 1, ctx.raw_rows.len(), &updated);
    tracing::debug!(column = column.key(), rows = targets.len(), "filled to end");
    Some(RowsChangeEvent {
        new_rows,
        cause: ChangeCause::FillToEnd {
            column_key: column.key().to_string(),
        },
    })
}

/// Rows produced by releasing a fill drag.
///
/// When the pointer ended in the anchor column this is a down-fill of the
/// rows strictly past the selected row up to the over row, in either
/// direction. Otherwise it is an across-fill of every row from the selected
/// row to the over row, inclusive, for the columns right of the anchor up to
/// the over column. The collaborator's rows are spliced back positionally.
pub fn fill_release<R: GridRow>(
    ctx: &GridContext<'_, R>,
    selected: Position,
    drag: &DragOverState,
    on_fill: &mut FillFn<'_, R>,
) -> Option<RowsChangeEvent<R>> {
    let over_row = drag.over_row?;
    let anchor = drag.anchor_col?;
    let over_col = drag.over_col().unwrap_or(anchor);
    let row_idx = selected.row()?;
    let column = ctx.column(selected.idx)?;
    let source_row = ctx.raw_rows.get(row_idx)?;

    let across = over_col != anchor;
    let (start, end) = if across {
        (row_idx.min(over_row), row_idx.max(over_row) + 1)
    } else if row_idx < over_row {
        (row_idx + 1, over_row + 1)
    } else {
        (over_row, row_idx)
    };
    let targets = ctx.raw_rows.get(start..end.min(ctx.raw_rows.len()))?;
    if targets.is_empty() {
        return None;
    }
    let target_cols: Vec<String> = if across {
        ctx.columns
            .columns
            .iter()
            .filter(|c| c.idx > anchor && c.idx <= over_col)
            .map(|c| c.key().to_string())
            .collect()
    } else {
        Vec::new()
    };

    let updated = on_fill(&FillEvent {
        column_key: column.key(),
        source_row,
        target_rows: targets,
        target_cols: &target_cols,
        across,
    });
    let new_rows = splice(ctx.raw_rows, start, start + targets.len(), &updated);
    tracing::debug!(
        column = column.key(),
        start,
        rows = targets.len(),
        across,
        "fill applied"
    );
    Some(RowsChangeEvent {
        new_rows,
        cause: ChangeCause::Fill {
            column_key: column.key().to_string(),
            target_rows: (start..start + targets.len()).collect(),
            target_cols,
            updated_target_rows: updated,
            across,
        },
    })
}

/// Fill collaborator that copies the source cell's text into each target
/// cell, skipping disabled targets. Across-fills copy each target column
/// from the same column of the source row.
pub fn copy_source_value<R: GridRow>(event: &FillEvent<'_, R>) -> Vec<R> {
    let single = [event.column_key.to_string()];
    let keys: &[String] = if event.across { event.target_cols } else { &single };
    event
        .target_rows
        .iter()
        .map(|target| {
            let mut row = target.clone();
            for key in keys {
                if target.is_cell_disabled(key) {
                    continue;
                }
                let text = event.source_row.cell_text(key);
                let cell = target
                    .cell(key)
                    .map_or_else(|| text.into(), |c| c.with_text(text));
                row.set_cell(key, cell);
            }
            row
        })
        .collect()
}

/// Copy of `rows` with `start..end` replaced positionally by `updated`.
fn splice<R: Clone>(rows: &[R], start: usize, end: usize, updated: &[R]) -> Vec<R> {
    if updated.len() < end.saturating_sub(start) {
        tracing::warn!(
            expected = end.saturating_sub(start),
            returned = updated.len(),
            "fill returned fewer rows than requested, keeping the rest unchanged"
        );
    }
    let mut new_rows = rows.to_vec();
    for (slot, row) in new_rows
        .iter_mut()
        .skip(start)
        .take(end.saturating_sub(start))
        .zip(updated)
    {
        *slot = row.clone();
    }
    new_rows
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn state(anchor: usize, over_row: usize, over_col: usize) -> DragOverState {
        let mut drag = DragOverState {
            anchor_col: Some(anchor),
            ..DragOverState::default()
        };
        drag.set_over_row(Some(over_row));
        drag.set_over_col(Some(over_col));
        drag
    }

    #[test]
    fn dragged_over_both_directions() {
        let down = state(1, 4, 1);
        assert!(down.is_dragged_over(2, 3, 1));
        assert!(down.is_dragged_over(2, 2, 1));
        assert!(down.is_dragged_over(2, 4, 1));
        assert!(!down.is_dragged_over(2, 5, 1));
        assert!(!down.is_dragged_over(2, 3, 2));

        let up = state(1, 0, 3);
        assert!(up.is_dragged_over(2, 0, 3));
        assert!(up.is_dragged_over(2, 1, 2));
        assert!(!up.is_dragged_over(2, 3, 2));
        assert!(!up.is_dragged_over(2, 1, 0));
    }

    #[test]
    fn columns_left_of_anchor_collapse() {
        let drag = state(2, 0, 0);
        assert_eq!(drag.over_cols, Some(ColumnSpan { start: 2, end: 2 }));
        assert_eq!(drag.over_col(), Some(2));
    }

    #[test]
    fn no_markers_without_anchor() {
        let mut drag = DragOverState::default();
        drag.set_over_col(Some(3));
        assert!(drag.over_cols.is_none());
        assert!(!drag.is_dragged_over(0, 0, 3));
    }

    #[test]
    fn splice_keeps_rows_outside_range() {
        let rows = vec![1, 2, 3, 4, 5];
        assert_eq!(splice(&rows, 1, 4, &[20, 30, 40]), vec![1, 20, 30, 40, 5]);
        assert_eq!(splice(&rows, 1, 4, &[20]), vec![1, 20, 3, 4, 5]);
    }

    #[test]
    fn cell_drag_follows_pointer() {
        let mut fill = FillDragController::new();
        let mut drag = DragOverState {
            anchor_col: Some(1),
            ..DragOverState::default()
        };
        fill.begin_cell_drag();
        fill.drag_enter(3, 2, Position::new(1, 0), &mut drag);
        assert_eq!(drag.over_row, Some(3));
        assert_eq!(drag.over_cols, Some(ColumnSpan { start: 1, end: 1 }));
        assert!(fill.pointer_lost(0));
        assert!(!fill.pointer_lost(1));
    }
}
