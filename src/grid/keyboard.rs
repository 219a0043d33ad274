//! Keyboard handling for the focused grid.

use super::GridController;
use crate::config::CellNavigationMode;
use crate::selection::keys;
use crate::selection::navigation::{apply_navigation_mode, can_exit_grid, next_position};
use crate::selection::GridContext;
use crate::types::{GridRow, KeyInput};

/// What the host should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The grid consumed the key; prevent the browser default.
    Handled,
    /// The grid did nothing with the key.
    Ignored,
    /// Tab at the edge of the grid: let focus move on.
    ExitGrid,
    /// Paste shortcut: read the system clipboard and call `paste`.
    ReadClipboard,
}

impl<R: GridRow> GridController<R> {
    /// Handle a key press on the focused grid.
    pub fn handle_key_down(&mut self, key: &KeyInput) -> KeyOutcome {
        let pos = self.selection.position();
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let in_bounds = ctx.is_within_bounds(pos);
        let group = pos.row().and_then(|r| ctx.group_row(r));

        if key.is_ctrl_held()
            && in_bounds
            && group.is_none()
            && pos.idx != -1
            && !self.selection.is_editing()
        {
            if keys::is_copy_shortcut(key) {
                if let Err(e) = self.copy() {
                    tracing::warn!(error = %e, "copy failed");
                }
                return KeyOutcome::Handled;
            }
            if keys::is_paste_shortcut(key) {
                let enabled =
                    self.callbacks.on_paste.is_some() && self.callbacks.on_rows_change.is_some();
                return if enabled {
                    KeyOutcome::ReadClipboard
                } else {
                    KeyOutcome::Ignored
                };
            }
        }

        if let Some(group) = group.filter(|_| in_bounds && pos.idx == -1) {
            let toggles = (key.key == "ArrowLeft" && group.is_expanded)
                || (key.key == "ArrowRight" && !group.is_expanded);
            if toggles {
                let id = group.id.clone();
                self.toggle_group(&id);
                return KeyOutcome::Handled;
            }
        }

        match key.key.as_str() {
            "Escape" => {
                self.clipboard.clear();
                self.close_editor(false);
                KeyOutcome::Handled
            }
            k if keys::is_navigation_key(k) => self.navigate(key),
            _ => self.cell_input(key),
        }
    }

    fn navigate(&mut self, key: &KeyInput) -> KeyOutcome {
        let pos = self.selection.position();
        if let Some(edit) = self.selection.state().edit_state() {
            let allowed = self
                .layout
                .get(edit.position.col().unwrap_or(usize::MAX))
                .is_none_or(|c| c.column.editor_options.allows_navigation(key));
            if !allowed {
                return KeyOutcome::Ignored;
            }
        }

        let page_rows = self.page_rows();
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        let next = next_position(&ctx, pos, key, page_rows);
        let mut mode = self.config.cell_navigation_mode;
        let (columns, rows) = (self.layout.len(), self.row_model.len());

        if key.key == "Tab" {
            if can_exit_grid(mode, columns, rows, pos, key.shift) {
                if let Some(event) = self.selection.commit(&ctx) {
                    self.callbacks.emit_rows_change(event);
                }
                return KeyOutcome::ExitGrid;
            }
            if mode == CellNavigationMode::None {
                mode = CellNavigationMode::ChangeRow;
            }
        }

        let next = apply_navigation_mode(mode, columns, rows, next);
        self.select_cell(next, false);
        KeyOutcome::Handled
    }

    fn cell_input(&mut self, key: &KeyInput) -> KeyOutcome {
        let pos = self.selection.position();
        let ctx = GridContext::new(&self.layout, &self.row_model, &self.rows);
        if !ctx.is_within_bounds(pos) || pos.row().is_some_and(|r| ctx.rows.is_group_row(r)) {
            return KeyOutcome::Ignored;
        }

        if self.selection.is_editing() {
            if key.key == "Enter" {
                self.close_editor(true);
                return KeyOutcome::Handled;
            }
            return KeyOutcome::Ignored;
        }

        if key.is_ctrl_held() || !ctx.is_cell_editable(pos) || !keys::is_default_cell_input(key) {
            return KeyOutcome::Ignored;
        }
        if key.key == "F2" || key.key == "Enter" {
            self.select_cell(pos, true);
        } else {
            self.selection.open_editor_with_key(&ctx, &key.key);
        }
        KeyOutcome::Handled
    }
}
