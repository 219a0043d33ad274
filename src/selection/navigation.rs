//! Keyboard navigation rules.

use super::GridContext;
use crate::config::CellNavigationMode;
use crate::types::{GridRow, KeyInput, Position};

pub(crate) fn to_isize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

/// Position a navigation key would move to, before edge handling.
///
/// The result may be out of bounds. Callers run it through
/// [`apply_navigation_mode`] and then let `select_cell` reject what is still
/// outside the grid.
pub fn next_position<R: GridRow>(
    ctx: &GridContext<'_, R>,
    current: Position,
    key: &KeyInput,
    page_rows: isize,
) -> Position {
    let Position { idx, row_idx } = current;
    let last_col = to_isize(ctx.columns.len()) - 1;
    let last_row = to_isize(ctx.row_count()) - 1;
    let is_row_selected = ctx.is_within_bounds(current) && idx == -1;

    if key.key == "ArrowLeft" && is_row_selected {
        if let Some(flat_idx) = current.row() {
            let collapsed_child = ctx
                .group_row(flat_idx)
                .is_some_and(|g| !g.is_expanded && g.level != 0);
            if collapsed_child {
                if let Some(parent) = ctx.rows.parent_row_idx(flat_idx) {
                    return Position::new(idx, to_isize(parent));
                }
            }
        }
    }

    match key.key.as_str() {
        "ArrowUp" => Position::new(idx, row_idx - 1),
        "ArrowDown" => Position::new(idx, row_idx + 1),
        "ArrowLeft" => {
            if ctx.column(idx - 1).is_some_and(|c| c.frozen) {
                current
            } else {
                Position::new(idx - 1, row_idx)
            }
        }
        "ArrowRight" => Position::new(idx + 1, row_idx),
        "Tab" => {
            if current == Position::NONE {
                if key.shift {
                    Position::new(last_col, last_row)
                } else {
                    Position::new(0, 0)
                }
            } else {
                Position::new(idx + if key.shift { -1 } else { 1 }, row_idx)
            }
        }
        "Home" => {
            if is_row_selected {
                Position::new(idx, 0)
            } else if key.is_ctrl_held() {
                Position::new(0, 0)
            } else {
                Position::new(0, row_idx)
            }
        }
        "End" => {
            if is_row_selected {
                Position::new(idx, last_row)
            } else if key.is_ctrl_held() {
                Position::new(last_col, last_row)
            } else {
                Position::new(last_col, row_idx)
            }
        }
        "PageUp" => Position::new(idx, row_idx - page_rows),
        "PageDown" => Position::new(idx, row_idx + page_rows),
        _ => current,
    }
}

/// Wrap positions that ran one column past either edge of a row.
pub fn apply_navigation_mode(
    mode: CellNavigationMode,
    column_count: usize,
    row_count: usize,
    next: Position,
) -> Position {
    let columns = to_isize(column_count);
    let rows = to_isize(row_count);
    let Position { idx, row_idx } = next;
    match mode {
        CellNavigationMode::None => next,
        CellNavigationMode::ChangeRow if idx == columns && row_idx != rows - 1 => {
            Position::new(0, row_idx + 1)
        }
        CellNavigationMode::ChangeRow if idx == -1 && row_idx != 0 => {
            Position::new(columns - 1, row_idx - 1)
        }
        CellNavigationMode::LoopOverRow if idx == columns => Position::new(0, row_idx),
        CellNavigationMode::LoopOverRow if idx == -1 => Position::new(columns - 1, row_idx),
        _ => next,
    }
}

/// Whether Tab should leave the grid instead of moving the selection.
pub fn can_exit_grid(
    mode: CellNavigationMode,
    column_count: usize,
    row_count: usize,
    current: Position,
    shift: bool,
) -> bool {
    if mode == CellNavigationMode::LoopOverRow {
        return false;
    }
    let Position { idx, row_idx } = current;
    if shift {
        idx == 0 && row_idx == 0
    } else {
        idx == to_isize(column_count) - 1 && row_idx == to_isize(row_count) - 1
    }
}
