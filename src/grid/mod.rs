//! The grid controller.
//!
//! [`GridController`] owns the declarations, the latest rows supplied by the
//! host, scroll metrics and all interaction state. Derived views (column
//! layout and row model) are recomputed as soon as one of their inputs
//! changes, so every event handler indexes into views that match the data it
//! was given. Row mutations never happen in place: they are reported through
//! [`GridCallbacks::on_rows_change`] and take effect when the host hands the
//! new rows back with [`GridController::set_rows`].

mod callbacks;
mod header;
mod keyboard;

pub use callbacks::GridCallbacks;
pub use header::{next_sort_direction, HeaderState, ResizeSession};
pub use keyboard::KeyOutcome;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::clipboard::{ClipboardController, CopyMarks};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::fill::{self, DragOverState, FillDragController};
use crate::layout::{ColumnLayout, ColumnWindow, RowModel, RowWindow, Viewport};
use crate::render::{CellDecorations, CellEditor};
use crate::selection::{GridContext, SelectionController};
use crate::types::{
    CalculatedColumn, ChangeCause, Column, GridRow, Position, RowsChangeEvent, ScrollEvent,
    SelectionState,
};

/// Scroll offsets the host should apply to its scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub scroll_top: f32,
    pub scroll_left: f32,
}

/// Orchestrates layout, selection, clipboard and fill for one grid.
pub struct GridController<R> {
    config: GridConfig,
    raw_columns: Vec<Rc<Column<R>>>,
    rows: Vec<R>,
    group_by: Vec<String>,
    expanded_group_ids: HashSet<String>,
    column_widths: HashMap<String, f32>,
    viewport: Viewport,
    layout: ColumnLayout<R>,
    row_model: RowModel,
    selection: SelectionController<R>,
    clipboard: ClipboardController<R>,
    fill: FillDragController,
    drag: DragOverState,
    header: HeaderState,
    callbacks: GridCallbacks<R>,
    scroll_request: Option<ScrollRequest>,
}

impl<R: GridRow> GridController<R> {
    pub fn new(columns: Vec<Column<R>>, rows: Vec<R>, config: GridConfig) -> Self {
        let mut grid = Self {
            config,
            raw_columns: columns.into_iter().map(Rc::new).collect(),
            rows,
            group_by: Vec::new(),
            expanded_group_ids: HashSet::new(),
            column_widths: HashMap::new(),
            viewport: Viewport::default(),
            layout: ColumnLayout::default(),
            row_model: RowModel::default(),
            selection: SelectionController::new(),
            clipboard: ClipboardController::new(),
            fill: FillDragController::new(),
            drag: DragOverState::default(),
            header: HeaderState::default(),
            callbacks: GridCallbacks::default(),
            scroll_request: None,
        };
        grid.refresh_columns();
        grid.refresh_rows();
        grid
    }

    #[must_use]
    pub fn with_callbacks(mut self, callbacks: GridCallbacks<R>) -> Self {
        self.set_callbacks(callbacks);
        self
    }

    /// Replace the host collaborators. Grouping is re-derived because the
    /// row grouper may have changed.
    pub fn set_callbacks(&mut self, callbacks: GridCallbacks<R>) {
        self.callbacks = callbacks;
        self.refresh_columns();
        self.refresh_rows();
    }

    pub fn callbacks_mut(&mut self) -> &mut GridCallbacks<R> {
        &mut self.callbacks
    }

    // ----- inputs ---------------------------------------------------------

    /// Store the rows the host now owns.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.refresh_rows();
    }

    pub fn set_columns(&mut self, columns: Vec<Column<R>>) {
        self.raw_columns = columns.into_iter().map(Rc::new).collect();
        self.refresh_columns();
        self.revalidate_selection();
    }

    pub fn set_config(&mut self, config: GridConfig) {
        self.config = config;
        self.refresh_columns();
        self.revalidate_selection();
    }

    /// Group rows by these column keys. Needs a row grouper and a row key
    /// getter.
    pub fn set_group_by(&mut self, keys: Vec<String>) -> Result<()> {
        if !keys.is_empty() {
            if self.callbacks.row_grouper.is_none() {
                return Err(GridError::MissingRowGrouper);
            }
            if self.callbacks.row_key.is_none() {
                return Err(GridError::MissingRowKeyGetter { feature: "grouping" });
            }
        }
        if let Some(missing) = keys.iter().find(|k| !self.raw_columns.iter().any(|c| &c.key == *k)) {
            return Err(GridError::ColumnNotFound(missing.clone()));
        }
        self.group_by = keys;
        self.refresh_columns();
        self.refresh_rows();
        Ok(())
    }

    pub fn set_expanded_group_ids(&mut self, ids: HashSet<String>) {
        self.expanded_group_ids = ids;
        self.refresh_rows();
    }

    /// Expand or collapse a group row. The new set of expanded ids is
    /// reported to the host, which passes it back through
    /// [`set_expanded_group_ids`](Self::set_expanded_group_ids).
    pub fn toggle_group(&mut self, group_id: &str) {
        let mut ids = self.expanded_group_ids.clone();
        if !ids.remove(group_id) {
            ids.insert(group_id.to_string());
        }
        tracing::debug!(group_id, expanded = ids.contains(group_id), "group toggled");
        if let Some(f) = self.callbacks.on_expanded_group_ids_change.as_mut() {
            f(&ids);
        }
    }

    /// Apply a measured grid size. Repeated calls with the same size are
    /// no-ops.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) -> bool {
        let width_changed = (self.viewport.width - width).abs() > f32::EPSILON;
        if !self.viewport.resize(width, height) {
            return false;
        }
        if width_changed {
            self.refresh_columns();
        }
        tracing::debug!(width, height, "viewport resized");
        true
    }

    /// Scroll event from the host's scroll container.
    pub fn handle_scroll(&mut self, scroll_top: f32, scroll_left: f32) {
        self.viewport.scroll_to(scroll_top, scroll_left);
        let event = ScrollEvent {
            scroll_top: self.viewport.scroll_top,
            scroll_left: self.viewport.scroll_left,
            at_bottom: self.scrolled_to_end(),
        };
        if let Some(f) = self.callbacks.on_scroll.as_mut() {
            f(&event);
        }
    }

    fn refresh_columns(&mut self) {
        let group_by: &[String] = if self.callbacks.row_grouper.is_some() {
            &self.group_by
        } else {
            &[]
        };
        self.layout = ColumnLayout::compute(
            &self.raw_columns,
            &self.column_widths,
            self.viewport.width,
            group_by,
            &self.config.default_column_options,
        );
    }

    fn refresh_rows(&mut self) {
        self.row_model = RowModel::build(
            &self.rows,
            &self.layout.group_by,
            self.callbacks.row_grouper.as_deref(),
            &self.expanded_group_ids,
        );
        self.revalidate_selection();
    }

    fn revalidate_selection(&mut self) {
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        self.selection.revalidate(&ctx, &mut self.drag);
    }

    // ----- derived views --------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn layout(&self) -> &ColumnLayout<R> {
        &self.layout
    }

    pub fn row_model(&self) -> &RowModel {
        &self.row_model
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn group_by(&self) -> &[String] {
        &self.layout.group_by
    }

    pub fn expanded_group_ids(&self) -> &HashSet<String> {
        &self.expanded_group_ids
    }

    pub fn column_widths(&self) -> &HashMap<String, f32> {
        &self.column_widths
    }

    pub fn header(&self) -> &HeaderState {
        &self.header
    }

    pub fn drag_state(&self) -> &DragOverState {
        &self.drag
    }

    pub fn selection(&self) -> &SelectionState<R> {
        self.selection.state()
    }

    pub fn selected_position(&self) -> Position {
        self.selection.position()
    }

    pub fn clipboard(&self) -> &ClipboardController<R> {
        &self.clipboard
    }

    pub fn context(&self) -> GridContext<'_, R> {
        GridContext::new(&self.layout, &self.row_model, &self.rows)
    }

    /// Whether rows are grouped (and whole group rows are selectable).
    pub fn has_groups(&self) -> bool {
        self.row_model.is_grouped()
    }

    /// Fill drags need a fill collaborator and are off for grouped grids.
    pub fn is_fill_enabled(&self) -> bool {
        !self.has_groups() && self.callbacks.on_fill.is_some()
    }

    /// Height available to data rows.
    pub fn client_height(&self) -> f32 {
        self.config.client_height(self.viewport.height)
    }

    /// Rows scrolled by PageUp/PageDown.
    #[allow(clippy::cast_possible_truncation)]
    pub fn page_rows(&self) -> isize {
        if self.config.row_height <= 0.0 {
            return 0;
        }
        (self.client_height() / self.config.row_height).floor() as isize
    }

    /// Total scrollable height of the data rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn total_rows_height(&self) -> f32 {
        self.row_model.len() as f32 * self.config.row_height
    }

    /// Whether the scroll position reached the last row.
    pub fn scrolled_to_end(&self) -> bool {
        self.viewport.scroll_top + self.client_height() >= self.total_rows_height() - 1.0
    }

    pub fn row_window(&self) -> Option<RowWindow> {
        RowWindow::compute(
            self.row_model.len(),
            self.config.row_height,
            self.viewport.scroll_top,
            self.client_height(),
        )
    }

    pub fn column_window(&self) -> Option<ColumnWindow> {
        self.layout.viewport_window(self.viewport.scroll_left)
    }

    /// Columns to render: frozen ones first, then the overscanned window.
    pub fn viewport_columns(&self) -> Vec<&CalculatedColumn<R>> {
        match self.column_window() {
            Some(window) => self.layout.viewport_columns(window).collect(),
            None => Vec::new(),
        }
    }

    /// Flat index at an on-screen y below the header.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn row_at_y(&self, y: f32) -> Option<usize> {
        let content_y = y - self.config.total_header_height();
        if content_y < 0.0 || content_y >= self.client_height() || self.config.row_height <= 0.0 {
            return None;
        }
        let idx = ((content_y + self.viewport.scroll_top) / self.config.row_height).floor() as usize;
        (idx < self.row_model.len()).then_some(idx)
    }

    /// Cell position at an on-screen point.
    pub fn position_at(&self, x: f32, y: f32) -> Option<Position> {
        let row = self.row_at_y(y)?;
        let col = self.layout.column_at_x(x, self.viewport.scroll_left)?;
        Some(Position::new(
            isize::try_from(col).ok()?,
            isize::try_from(row).ok()?,
        ))
    }

    // ----- imperative handle ----------------------------------------------

    /// Select a cell, optionally opening its editor. Returns `false` when the
    /// position is out of bounds.
    pub fn select_cell(&mut self, pos: Position, open_editor: bool) -> bool {
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let Some(commit) = self.selection.select_cell(&ctx, pos, open_editor, &mut self.drag) else {
            return false;
        };
        if let Some(event) = commit {
            self.callbacks.emit_rows_change(event);
        }
        self.callbacks.emit_selected_cell_change(pos);
        if !self.selection.is_editing() {
            self.scroll_to_cell(pos);
        }
        true
    }

    /// Scroll so column `idx` is fully visible.
    pub fn scroll_to_column(&mut self, idx: usize) {
        if let Some(left) = self.viewport.scroll_left_for_column(&self.layout, idx) {
            self.request_scroll(self.viewport.scroll_top, left);
        }
    }

    /// Scroll so row `row_idx` sits at the top.
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll_to_row(&mut self, row_idx: usize) {
        let top = row_idx as f32 * self.config.row_height;
        self.request_scroll(top, self.viewport.scroll_left);
    }

    fn scroll_to_cell(&mut self, pos: Position) {
        let left = pos
            .col()
            .and_then(|c| self.viewport.scroll_left_for_column(&self.layout, c));
        let top = pos.row().and_then(|r| {
            self.viewport
                .scroll_top_for_row(r, self.config.row_height, self.client_height())
        });
        if left.is_some() || top.is_some() {
            self.request_scroll(
                top.unwrap_or(self.viewport.scroll_top),
                left.unwrap_or(self.viewport.scroll_left),
            );
        }
    }

    fn request_scroll(&mut self, scroll_top: f32, scroll_left: f32) {
        self.viewport.scroll_to(scroll_top, scroll_left);
        self.scroll_request = Some(ScrollRequest {
            scroll_top: self.viewport.scroll_top,
            scroll_left: self.viewport.scroll_left,
        });
    }

    /// Scroll offsets requested since the last call, for the host to apply.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll_request.take()
    }

    // ----- editing --------------------------------------------------------

    /// Update the row held by the open editor, or write it through and close
    /// when `commit` is set.
    pub fn set_editor_row(&mut self, row: R, commit: bool) {
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        if let Some(event) = self.selection.set_editor_row(&ctx, row, commit) {
            self.callbacks.emit_rows_change(event);
        }
    }

    /// Feed text typed into the open editor through the column's editor.
    pub fn editor_input(&mut self, input: &str) -> Result<()> {
        let Some(edit) = self.selection.state().edit_state() else {
            return Ok(());
        };
        let Some(column) = edit.position.col().and_then(|c| self.layout.get(c)) else {
            return Ok(());
        };
        let Some(editor) = column.column.editor.as_ref() else {
            return Ok(());
        };
        let row = editor.apply(&edit.row, column.key(), input).map_err(|e| {
            tracing::warn!(column = column.key(), error = %e, "editor failed");
            e
        })?;
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        self.selection.set_editor_row(&ctx, row, false);
        Ok(())
    }

    /// Text the open editor should display.
    pub fn editor_text(&self) -> Option<String> {
        let edit = self.selection.state().edit_state()?;
        let column = self.layout.get(edit.position.col()?)?;
        let editor: &Rc<dyn CellEditor<R>> = column.column.editor.as_ref()?;
        match editor.render(&edit.row, column.key()) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(column = column.key(), error = %e, "editor failed to render");
                None
            }
        }
    }

    /// Close the editor, committing first when asked to.
    pub fn close_editor(&mut self, commit: bool) {
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        if let Some(event) = self.selection.close(&ctx, commit) {
            self.callbacks.emit_rows_change(event);
        }
    }

    /// A formatter replaced the row at raw index `raw_idx`.
    pub fn apply_formatter_row_change(&mut self, raw_idx: usize, row: R) {
        if raw_idx >= self.rows.len() {
            return;
        }
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let event = RowsChangeEvent {
            new_rows: ctx.replace_row(raw_idx, row),
            cause: ChangeCause::RowUpdate { row_idx: raw_idx },
        };
        self.callbacks.emit_rows_change(event);
    }

    // ----- clipboard ------------------------------------------------------

    /// Copy the selected range and send its text to the clipboard sink.
    pub fn copy(&mut self) -> Result<Option<String>> {
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let text = self.clipboard.copy(
            &ctx,
            self.selection.position(),
            &self.drag,
            self.callbacks.row_key.as_deref(),
        )?;
        if let Some(text) = &text {
            self.callbacks.write_clipboard(text);
        }
        Ok(text)
    }

    /// Paste clipboard text at the selected cell.
    ///
    /// Whatever is selected when this runs is the target, even if the text
    /// was requested for an earlier selection.
    pub fn paste(&mut self, text: &str) -> bool {
        let pos = self.selection.position();
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let enabled = self.callbacks.on_paste.is_some() && self.callbacks.on_rows_change.is_some();
        if !enabled || self.selection.is_editing() {
            return false;
        }
        let column_key = ctx.column(pos.idx).map(|c| c.key().to_string());
        let Some(event) = self.clipboard.paste(&ctx, pos, text, enabled, &mut self.drag) else {
            return false;
        };
        if let (Some(f), Some(key)) = (self.callbacks.on_paste.as_mut(), column_key.as_deref()) {
            f(&crate::types::PasteEvent {
                text,
                position: pos,
                column_key: key,
            });
        }
        self.callbacks.emit_rows_change(event);
        true
    }

    /// Forget the copied range.
    pub fn clear_copied(&mut self) {
        self.clipboard.clear();
    }

    /// Where the leaf row at `flat_idx` sits in the copied range.
    fn copy_marks(&self, flat_idx: usize) -> Result<CopyMarks> {
        if self.clipboard.copied().is_none() {
            return Ok(CopyMarks::default());
        }
        let key_fn = self
            .callbacks
            .row_key
            .as_deref()
            .ok_or(GridError::MissingRowKeyGetter { feature: "copy" })?;
        Ok(self
            .context()
            .row(flat_idx)
            .map(|row| self.clipboard.marks(row, key_fn))
            .unwrap_or_default())
    }

    /// Whether the leaf row at `flat_idx` is part of the copied range.
    pub fn is_copied(&self, flat_idx: usize) -> Result<bool> {
        Ok(self.copy_marks(flat_idx)?.copied)
    }

    pub fn has_first_copied_cell(&self, flat_idx: usize) -> Result<bool> {
        Ok(self.copy_marks(flat_idx)?.first)
    }

    pub fn has_last_copied_cell(&self, flat_idx: usize) -> Result<bool> {
        Ok(self.copy_marks(flat_idx)?.last)
    }

    // ----- pointer --------------------------------------------------------

    /// Disabled cells and cells of frozen columns (either side) take no
    /// pointer selection.
    fn ignores_pointer(&self, pos: Position) -> bool {
        let ctx = self.context();
        ctx.column(pos.idx).is_some_and(|c| c.frozen || c.is_frozen_right())
            || ctx.is_cell_disabled(pos)
    }

    /// Mouse-down on a cell. Selects it and starts a range drag when the
    /// primary button is down.
    pub fn cell_mouse_down(&mut self, pos: Position, buttons: u16) {
        if buttons == 2 || self.ignores_pointer(pos) {
            return;
        }
        if self.select_cell(pos, false) && buttons == 1 {
            self.fill.begin_cell_drag();
        }
    }

    /// Click on a cell: row-click notification.
    pub fn cell_click(&mut self, pos: Position) {
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let (Some(column), Some(flat_idx)) = (ctx.column(pos.idx), pos.row()) else {
            return;
        };
        if let (Some(f), Some(row)) = (self.callbacks.on_row_click.as_mut(), ctx.row(flat_idx)) {
            f(flat_idx, row, column.key());
        }
    }

    /// Double-click on a cell opens its editor.
    pub fn cell_double_click(&mut self, pos: Position) {
        if self.ignores_pointer(pos) {
            return;
        }
        self.select_cell(pos, true);
    }

    /// Mouse-down on the fill handle.
    pub fn fill_handle_mouse_down(&mut self, buttons: u16) {
        if buttons != 1 || !self.is_fill_enabled() || self.selection.is_editing() {
            return;
        }
        self.fill.begin_fill_drag(self.selection.position(), &self.drag);
    }

    /// Double-click on the fill handle fills every row below the selection.
    pub fn fill_handle_double_click(&mut self) {
        if !self.is_fill_enabled() || self.callbacks.on_rows_change.is_none() {
            return;
        }
        let Some(on_fill) = self.callbacks.on_fill.as_mut() else {
            return;
        };
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        if let Some(event) = fill::fill_to_end(&ctx, self.selection.position(), &mut **on_fill) {
            self.callbacks.emit_rows_change(event);
        }
    }

    /// Pointer entered a cell while a button is held.
    pub fn cell_mouse_enter(&mut self, pos: Position, buttons: u16) {
        if buttons != 1 {
            return;
        }
        if let (Some(row), Some(col)) = (pos.row(), pos.col()) {
            self.fill
                .drag_enter(row, col, self.selection.position(), &mut self.drag);
        }
    }

    /// Pointer moved anywhere in the window. Losing the primary button ends
    /// the drag.
    pub fn pointer_moved(&mut self, buttons: u16) {
        if self.fill.pointer_lost(buttons) {
            self.mouse_up();
        }
    }

    /// Mouse released anywhere in the window.
    pub fn mouse_up(&mut self) {
        let Some(session) = self.fill.end_drag() else {
            return;
        };
        if !session.is_fill() || self.callbacks.on_rows_change.is_none() {
            return;
        }
        let Some(on_fill) = self.callbacks.on_fill.as_mut() else {
            return;
        };
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let event = fill::fill_release(&ctx, self.selection.position(), &self.drag, &mut **on_fill);
        if let Some(event) = event {
            self.callbacks.emit_rows_change(event);
        }
        self.clipboard.clear();
    }

    pub fn is_dragging(&self) -> bool {
        self.fill.is_dragging()
    }

    /// Whether the cell at `(row, col)` is in the live drag-over block.
    pub fn is_dragged_over(&self, row: usize, col: usize) -> bool {
        self.selection
            .position()
            .row()
            .is_some_and(|sel| self.drag.is_dragged_over(sel, row, col))
    }

    /// Presentation state of the leaf cell at `(flat_idx, col)`.
    pub fn cell_decorations(&self, flat_idx: usize, col: usize) -> CellDecorations {
        self.decoration_pass().cell(flat_idx, col)
    }

    /// Decorations for many cells at once, as a paint pass needs them.
    pub fn decoration_pass(&self) -> DecorationPass<'_, R> {
        let ctx = self.context();
        DecorationPass {
            grid: self,
            copied_col: self.clipboard.copied_column_idx(&ctx),
            ctx,
        }
    }
}

/// Cell decorations for one paint pass. The copied column is resolved once
/// when the pass is created.
pub struct DecorationPass<'a, R> {
    grid: &'a GridController<R>,
    ctx: GridContext<'a, R>,
    copied_col: Option<usize>,
}

impl<R: GridRow> DecorationPass<'_, R> {
    pub fn cell(&self, flat_idx: usize, col: usize) -> CellDecorations {
        let grid = self.grid;
        let Some(column) = grid.layout.get(col) else {
            return CellDecorations::default();
        };
        let cell = self.ctx.row(flat_idx).and_then(|r| r.cell(column.key()));
        let disabled = cell.is_some_and(|c| c.is_disabled());
        let pos = grid.selection.position();
        let selected = pos.row() == Some(flat_idx) && pos.col() == Some(col);
        let marks = if self.copied_col == Some(col) && !disabled {
            grid.copy_marks(flat_idx).unwrap_or_default()
        } else {
            CopyMarks::default()
        };
        CellDecorations {
            selected,
            editing: selected && grid.selection.is_editing(),
            copied: marks.copied,
            copied_top: marks.first,
            copied_bottom: marks.last,
            dragged_over: !disabled && !column.frozen && grid.is_dragged_over(flat_idx, col),
            disabled,
            error: cell.is_some_and(|c| c.has_error()),
            alert: cell.is_some_and(|c| c.has_alert()),
            warning: cell.is_some_and(|c| c.has_warning()),
            frozen: column.frozen,
            frozen_shadow: column.is_last_frozen_column && grid.viewport.scroll_left > 0.0,
        }
    }
}

impl<R> std::fmt::Debug for GridController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("columns", &self.raw_columns.len())
            .field("rows", &self.rows.len())
            .field("group_by", &self.group_by)
            .field("viewport", &self.viewport)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}
