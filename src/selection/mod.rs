//! Cell selection and the select/edit state machine.
//!
//! The controller holds exactly one [`SelectionState`]. Every operation takes
//! a [`GridContext`] built from the derived views of the current interaction,
//! so indices are always resolved against the freshly computed columns and
//! rows.

pub mod keys;
pub mod navigation;

use crate::fill::DragOverState;
use crate::layout::{ColumnLayout, GroupRow, RowModel};
use crate::types::{
    CalculatedColumn, CellValue, ChangeCause, EditState, GridRow, Position, RowsChangeEvent,
    SelectionState,
};

/// Derived views for one interaction.
pub struct GridContext<'a, R> {
    pub columns: &'a ColumnLayout<R>,
    pub rows: &'a RowModel,
    pub raw_rows: &'a [R],
}

impl<R> Clone for GridContext<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for GridContext<'_, R> {}

impl<'a, R: GridRow> GridContext<'a, R> {
    pub fn new(columns: &'a ColumnLayout<R>, rows: &'a RowModel, raw_rows: &'a [R]) -> Self {
        Self {
            columns,
            rows,
            raw_rows,
        }
    }

    /// Rows in the flattened sequence.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `-1` when whole group rows can be selected.
    pub fn min_col_idx(&self) -> isize {
        if self.rows.is_grouped() {
            -1
        } else {
            0
        }
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        let rows = navigation::to_isize(self.row_count());
        let cols = navigation::to_isize(self.columns.len());
        pos.row_idx >= 0 && pos.row_idx < rows && pos.idx >= self.min_col_idx() && pos.idx < cols
    }

    pub fn column(&self, idx: isize) -> Option<&'a CalculatedColumn<R>> {
        usize::try_from(idx).ok().and_then(|i| self.columns.get(i))
    }

    /// Leaf row at a flat index.
    pub fn row(&self, flat_idx: usize) -> Option<&'a R> {
        self.rows
            .raw_index(flat_idx)
            .and_then(|raw| self.raw_rows.get(raw))
    }

    pub fn group_row(&self, flat_idx: usize) -> Option<&'a GroupRow> {
        self.rows.get(flat_idx).and_then(|r| r.as_group())
    }

    /// Cell value at a position, when the position names a leaf cell.
    pub fn cell(&self, pos: Position) -> Option<&'a CellValue> {
        let column = self.column(pos.idx)?;
        self.row(pos.row()?)?.cell(column.key())
    }

    pub fn is_cell_disabled(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(CellValue::is_disabled)
    }

    /// A cell is editable when it is in bounds, its column has an editor and
    /// is not a row-group column, the row is not a group row and the column's
    /// `editable` rule allows the row.
    pub fn is_cell_editable(&self, pos: Position) -> bool {
        if !self.is_within_bounds(pos) {
            return false;
        }
        let Some(column) = self.column(pos.idx) else {
            return false;
        };
        let Some(row) = pos.row().and_then(|r| self.row(r)) else {
            return false;
        };
        column.column.editor.is_some() && !column.row_group && column.column.editable.allows(row)
    }

    /// Copy of the raw rows with the row at `raw_idx` replaced.
    pub fn replace_row(&self, raw_idx: usize, row: R) -> Vec<R> {
        let mut new_rows = self.raw_rows.to_vec();
        if let Some(slot) = new_rows.get_mut(raw_idx) {
            *slot = row;
        }
        new_rows
    }
}

/// Owner of the current selection.
#[derive(Debug, Clone)]
pub struct SelectionController<R> {
    state: SelectionState<R>,
}

impl<R> Default for SelectionController<R> {
    fn default() -> Self {
        Self {
            state: SelectionState::default(),
        }
    }
}

impl<R: GridRow> SelectionController<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState<R> {
        &self.state
    }

    pub fn position(&self) -> Position {
        self.state.position()
    }

    pub fn is_editing(&self) -> bool {
        self.state.is_editing()
    }

    /// Move the selection.
    ///
    /// Out-of-bounds positions are ignored and return `None`. Otherwise any
    /// pending edit is committed first (the returned outer `Some` carries the
    /// commit, if one happened) and the drag markers are cleared. When
    /// `open_editor` is set and the cell is editable the editor opens on the
    /// current row; otherwise the cell is selected and becomes the fill
    /// anchor column.
    pub fn select_cell(
        &mut self,
        ctx: &GridContext<'_, R>,
        pos: Position,
        open_editor: bool,
        drag: &mut DragOverState,
    ) -> Option<Option<RowsChangeEvent<R>>> {
        if !ctx.is_within_bounds(pos) {
            tracing::trace!(idx = pos.idx, row_idx = pos.row_idx, "select_cell out of bounds");
            return None;
        }
        let commit = self.commit(ctx);
        drag.reset();

        let editing_row = if open_editor && ctx.is_cell_editable(pos) {
            pos.row().and_then(|r| ctx.row(r)).cloned()
        } else {
            None
        };
        self.state = match editing_row {
            Some(row) => SelectionState::Edit(EditState {
                position: pos,
                key: None,
                original_row: row.clone(),
                row,
            }),
            None => {
                drag.anchor_col = pos.col();
                SelectionState::Select(pos)
            }
        };
        tracing::debug!(
            idx = pos.idx,
            row_idx = pos.row_idx,
            editing = self.state.is_editing(),
            "cell selected"
        );
        Some(commit)
    }

    /// Row change for a pending edit, if the edit is dirty and its column has
    /// an editor. The selection state is left untouched.
    pub fn commit(&self, ctx: &GridContext<'_, R>) -> Option<RowsChangeEvent<R>> {
        let SelectionState::Edit(edit) = &self.state else {
            return None;
        };
        let column = ctx.column(edit.position.idx)?;
        if column.column.editor.is_none() || !edit.is_dirty() {
            return None;
        }
        let raw_idx = ctx.rows.raw_index(edit.position.row()?)?;
        tracing::debug!(row = raw_idx, column = column.key(), "edit committed");
        Some(RowsChangeEvent {
            new_rows: ctx.replace_row(raw_idx, edit.row.clone()),
            cause: ChangeCause::Commit {
                row_idx: raw_idx,
                column_key: column.key().to_string(),
            },
        })
    }

    /// Leave edit mode, keeping the position and dropping uncommitted changes.
    pub fn close_editor(&mut self) -> bool {
        match &self.state {
            SelectionState::Select(_) => false,
            SelectionState::Edit(edit) => {
                self.state = SelectionState::Select(edit.position);
                true
            }
        }
    }

    /// Close the editor, committing first when asked to.
    pub fn close(&mut self, ctx: &GridContext<'_, R>, commit: bool) -> Option<RowsChangeEvent<R>> {
        let event = if commit { self.commit(ctx) } else { None };
        self.close_editor();
        event
    }

    /// Row update from an open editor.
    ///
    /// With `commit` the row is written straight through and the editor
    /// closes; otherwise the edited row is only kept in the edit state.
    pub fn set_editor_row(
        &mut self,
        ctx: &GridContext<'_, R>,
        row: R,
        commit: bool,
    ) -> Option<RowsChangeEvent<R>> {
        let SelectionState::Edit(edit) = &mut self.state else {
            return None;
        };
        if !commit {
            edit.row = row;
            return None;
        }
        let pos = edit.position;
        let raw_idx = pos.row().and_then(|r| ctx.rows.raw_index(r));
        let column_key = ctx.column(pos.idx).map(|c| c.key().to_string());
        self.close_editor();
        let raw_idx = raw_idx?;
        Some(RowsChangeEvent {
            new_rows: ctx.replace_row(raw_idx, row),
            cause: ChangeCause::Commit {
                row_idx: raw_idx,
                column_key: column_key.unwrap_or_default(),
            },
        })
    }

    /// Open the editor because `key` was typed on the selected cell.
    ///
    /// The edited cell starts empty (flags kept) and the key is recorded for
    /// the editor to insert.
    pub fn open_editor_with_key(&mut self, ctx: &GridContext<'_, R>, key: &str) -> bool {
        let SelectionState::Select(pos) = self.state else {
            return false;
        };
        if !ctx.is_cell_editable(pos) {
            return false;
        }
        let (Some(column), Some(original)) = (ctx.column(pos.idx), pos.row().and_then(|r| ctx.row(r)))
        else {
            return false;
        };
        let mut row = original.clone();
        let cleared = original
            .cell(column.key())
            .map_or_else(CellValue::default, |cell| cell.with_text(""));
        row.set_cell(column.key(), cleared);
        self.state = SelectionState::Edit(EditState {
            position: pos,
            key: Some(key.to_string()),
            row,
            original_row: original.clone(),
        });
        true
    }

    /// Re-check the selection after columns or rows changed.
    ///
    /// A position past the new bounds resets to nothing selected. An open
    /// editor whose row was replaced underneath it is closed without
    /// committing. Returns whether anything changed.
    pub fn revalidate(&mut self, ctx: &GridContext<'_, R>, drag: &mut DragOverState) -> bool {
        let pos = self.position();
        let cols = navigation::to_isize(ctx.columns.len());
        let rows = navigation::to_isize(ctx.row_count());
        if pos.idx >= cols || pos.row_idx >= rows {
            tracing::debug!(idx = pos.idx, row_idx = pos.row_idx, "selection out of bounds, reset");
            self.state = SelectionState::default();
            drag.over_row = None;
            return true;
        }
        if let SelectionState::Edit(edit) = &self.state {
            let current = pos.row().and_then(|r| ctx.row(r));
            if current != Some(&edit.original_row) {
                tracing::debug!(row_idx = pos.row_idx, "row replaced under editor, closing");
                return self.close_editor();
            }
        }
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::DefaultColumnOptions;
    use crate::types::{Column, Record};
    use std::collections::HashMap;
    use std::rc::Rc;

    fn setup() -> (ColumnLayout<Record>, RowModel, Vec<Record>) {
        let columns = vec![
            Rc::new(Column::new("id", "ID").editable(crate::types::Editable::Never).text_editor()),
            Rc::new(Column::new("val", "Value").text_editor()),
        ];
        let layout = ColumnLayout::compute(&columns, &HashMap::new(), 400.0, &[], &DefaultColumnOptions::default());
        let rows = vec![
            Record::new().with("id", "a").with("val", "1"),
            Record::new().with("id", "b").with("val", "2"),
        ];
        (layout, RowModel::ungrouped(rows.len()), rows)
    }

    #[test]
    fn editability_follows_column_rule() {
        let (layout, model, rows) = setup();
        let ctx = GridContext::new(&layout, &model, &rows);
        assert!(!ctx.is_cell_editable(Position::new(0, 0)));
        assert!(ctx.is_cell_editable(Position::new(1, 0)));
        assert!(!ctx.is_cell_editable(Position::new(1, 5)));
    }

    #[test]
    fn open_editor_then_commit_dirty_row() {
        let (layout, model, rows) = setup();
        let ctx = GridContext::new(&layout, &model, &rows);
        let mut sel = SelectionController::new();
        let mut drag = DragOverState::default();

        assert_eq!(sel.select_cell(&ctx, Position::new(1, 1), true, &mut drag), Some(None));
        assert!(sel.is_editing());

        let mut edited = rows[1].clone();
        edited.set_cell("val", "20".into());
        assert!(sel.set_editor_row(&ctx, edited, false).is_none());

        let event = sel.select_cell(&ctx, Position::new(1, 0), false, &mut drag).unwrap().unwrap();
        assert_eq!(event.new_rows[1].cell_text("val"), "20");
        assert_eq!(event.new_rows[0], rows[0]);
        match event.cause {
            ChangeCause::Commit { row_idx, column_key } => {
                assert_eq!(row_idx, 1);
                assert_eq!(column_key, "val");
            }
            other => panic!("unexpected cause {other:?}"),
        }
        assert_eq!(drag.anchor_col, Some(1));
    }

    #[test]
    fn typing_opens_editor_with_empty_cell() {
        let (layout, model, rows) = setup();
        let ctx = GridContext::new(&layout, &model, &rows);
        let mut sel = SelectionController::new();
        let mut drag = DragOverState::default();
        sel.select_cell(&ctx, Position::new(1, 0), false, &mut drag);

        assert!(sel.open_editor_with_key(&ctx, "x"));
        let edit = sel.state().edit_state().unwrap();
        assert_eq!(edit.row.cell_text("val"), "");
        assert_eq!(edit.key.as_deref(), Some("x"));
        assert_eq!(edit.original_row, rows[0]);
    }

    #[test]
    fn replaced_row_closes_editor() {
        let (layout, model, rows) = setup();
        let mut sel = SelectionController::new();
        let mut drag = DragOverState::default();
        sel.select_cell(&GridContext::new(&layout, &model, &rows), Position::new(1, 0), true, &mut drag);

        let mut replaced = rows.clone();
        replaced[0].set_cell("val", "external".into());
        assert!(sel.revalidate(&GridContext::new(&layout, &model, &replaced), &mut drag));
        assert!(!sel.is_editing());
        assert_eq!(sel.position(), Position::new(1, 0));
    }

    #[test]
    fn shrinking_rows_resets_selection() {
        let (layout, model, rows) = setup();
        let mut sel = SelectionController::new();
        let mut drag = DragOverState::default();
        sel.select_cell(&GridContext::new(&layout, &model, &rows), Position::new(1, 1), false, &mut drag);

        let fewer = vec![rows[0].clone()];
        let model = RowModel::ungrouped(1);
        assert!(sel.revalidate(&GridContext::new(&layout, &model, &fewer), &mut drag));
        assert_eq!(sel.position(), Position::NONE);
    }
}
