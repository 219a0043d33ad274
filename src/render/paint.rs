//! One paint pass over the visible part of the grid.

use crate::grid::GridController;
use crate::layout::GroupRow;
use crate::types::{CalculatedColumn, GridRow};

use super::backend::{default_group_label, DrawContent, Rect, RenderSurface};

/// Side of the fill handle square.
const FILL_HANDLE_SIZE: f32 = 8.0;

/// Draw headers, the overscanned rows, the fill handle and summary rows.
#[allow(clippy::cast_precision_loss)]
pub fn paint<R: GridRow>(grid: &GridController<R>, surface: &mut dyn RenderSurface) {
    let viewport = grid.viewport();
    let window = grid.row_window();
    let _span = tracing::debug_span!(
        "paint",
        rows = ?window.map(|w| (w.overscan_start, w.overscan_end)),
        columns = ?grid.column_window().map(|w| (w.overscan_start, w.overscan_end)),
    )
    .entered();

    surface.begin(viewport.width, viewport.height);
    let columns = grid.viewport_columns();
    let config = grid.config();
    let header_height = config.header_row_height();
    let rows_top = config.total_header_height();

    for column in &columns {
        let Some(rect) = column_rect(grid, column, 0.0, header_height) else {
            continue;
        };
        surface.draw(
            rect,
            &DrawContent::HeaderCell {
                name: &column.column.name,
                sort: grid.sort_direction(column.key()),
            },
        );
        if config.enable_filter_row {
            let filter_rect = Rect {
                y: header_height,
                height: config.header_filters_height,
                ..rect
            };
            surface.draw(
                filter_rect,
                &DrawContent::FilterCell {
                    value: grid.filter_value(column.key()),
                },
            );
        }
    }

    if let Some(window) = window {
        let ctx = grid.context();
        let decorations = grid.decoration_pass();
        let selected = grid.selected_position();
        for flat_idx in window.overscan_start..=window.overscan_end {
            let y = rows_top + flat_idx as f32 * config.row_height - viewport.scroll_top;
            if let Some(group) = ctx.group_row(flat_idx) {
                surface.draw(
                    Rect::new(0.0, y, viewport.width, config.row_height),
                    &DrawContent::GroupRow {
                        label: group_label(grid, group),
                        level: group.level,
                        expanded: group.is_expanded,
                        selected: selected.row() == Some(flat_idx) && selected.idx == -1,
                    },
                );
                continue;
            }
            let Some(row) = ctx.row(flat_idx) else {
                continue;
            };
            for column in &columns {
                let Some(rect) = column_rect(grid, column, y, config.row_height) else {
                    continue;
                };
                surface.draw(
                    rect,
                    &DrawContent::Cell {
                        text: cell_text(column, row),
                        decorations: decorations.cell(flat_idx, column.idx),
                    },
                );
            }
        }

        if let Some(rect) = fill_handle_rect(grid) {
            surface.draw(rect, &DrawContent::FillHandle);
        }
    }

    let summary_top = viewport.height - config.summary_rows_height();
    for summary_idx in 0..config.summary_row_count {
        let y = summary_top + summary_idx as f32 * config.row_height;
        for column in &columns {
            let Some(formatter) = column.column.summary_formatter.as_ref() else {
                continue;
            };
            let Some(rect) = column_rect(grid, column, y, config.row_height) else {
                continue;
            };
            let text = formatter.format(summary_idx, grid.rows()).unwrap_or_else(|e| {
                tracing::warn!(column = column.key(), error = %e, "summary formatter failed");
                String::new()
            });
            surface.draw(rect, &DrawContent::SummaryCell { text });
        }
    }
}

fn column_rect<R: GridRow>(
    grid: &GridController<R>,
    column: &CalculatedColumn<R>,
    y: f32,
    height: f32,
) -> Option<Rect> {
    let x = grid.layout().rect_left(column.idx, grid.viewport().scroll_left)?;
    Some(Rect::new(x, y, column.width, height))
}

/// Formatted text of one cell. A failing formatter leaves the cell empty.
fn cell_text<R: GridRow>(column: &CalculatedColumn<R>, row: &R) -> String {
    let key = column.key();
    let Some(formatter) = column.column.formatter.as_ref() else {
        return row.cell_text(key).to_string();
    };
    let value = row.cell(key).cloned().unwrap_or_default();
    formatter.format(&value, row).unwrap_or_else(|e| {
        tracing::warn!(column = key, error = %e, "formatter failed");
        String::new()
    })
}

fn group_label<R: GridRow>(grid: &GridController<R>, group: &GroupRow) -> String {
    let formatter = grid
        .group_by()
        .get(group.level)
        .and_then(|key| grid.layout().index_of(key))
        .and_then(|idx| grid.layout().get(idx))
        .and_then(|c| c.column.group_formatter.as_ref());
    let Some(formatter) = formatter else {
        return default_group_label(group);
    };
    formatter.format(group).unwrap_or_else(|e| {
        tracing::warn!(group = %group.id, error = %e, "group formatter failed");
        default_group_label(group)
    })
}

/// Fill handle at the selected cell's bottom-right corner, when a fill could
/// start from it.
#[allow(clippy::cast_precision_loss)]
pub fn fill_handle_rect<R: GridRow>(grid: &GridController<R>) -> Option<Rect> {
    let rows_top = grid.config().total_header_height();
    let pos = grid.selected_position();
    if !grid.is_fill_enabled() || grid.selection().is_editing() {
        return None;
    }
    let (col, row) = (pos.col()?, pos.row()?);
    if !grid.row_window()?.contains(row) || grid.context().is_cell_disabled(pos) {
        return None;
    }
    let column = grid.layout().get(col)?;
    let cell = column_rect(
        grid,
        column,
        rows_top + row as f32 * grid.config().row_height - grid.viewport().scroll_top,
        grid.config().row_height,
    )?;
    let half = FILL_HANDLE_SIZE / 2.0;
    Some(Rect::new(
        cell.right() - half,
        cell.bottom() - half,
        FILL_HANDLE_SIZE,
        FILL_HANDLE_SIZE,
    ))
}
