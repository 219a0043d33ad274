//! Shared fixtures for the integration tests.
//!
//! Grids are built over [`Record`] rows. Callbacks record what they receive
//! into a [`Recorded`] log so tests can assert on notifications.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use vgrid::layout::GroupByCell;
use vgrid::{
    CellValue, Column, ColumnWidth, FillEvent, GridCallbacks, GridConfig, GridController, GridRow,
    PasteEvent, Position, Record, RowsChangeEvent, ScrollEvent, SortColumn,
};

/// Everything the callbacks saw, in order.
#[derive(Debug, Default)]
pub struct Recorded {
    pub rows_changes: Vec<RowsChangeEvent<Record>>,
    pub clipboard: Vec<String>,
    pub selected: Vec<Position>,
    pub pastes: Vec<String>,
    pub resizes: Vec<(usize, f32)>,
    pub scrolls: Vec<ScrollEvent>,
    pub sorts: Vec<SortColumn>,
    pub expanded: Vec<HashSet<String>>,
    pub selected_rows: Vec<HashSet<String>>,
    pub clicks: Vec<(usize, String)>,
}

pub type Log = Rc<RefCell<Recorded>>;

/// Callbacks that log every notification and fill by copying the source
/// value. Rows are keyed by their `id` cell.
pub fn recording_callbacks(log: &Log) -> GridCallbacks<Record> {
    macro_rules! record {
        ($field:ident, |$($arg:ident $(: $ty:ty)?),*| $value:expr) => {{
            let log = Rc::clone(log);
            move |$($arg $(: $ty)?),*| log.borrow_mut().$field.push($value)
        }};
    }
    GridCallbacks::new()
        .row_key(|r: &Record| r.cell_text("id").to_string())
        .row_grouper(GroupByCell)
        .on_rows_change(record!(rows_changes, |event| event))
        .clipboard(record!(clipboard, |text: &str| text.to_string()))
        .on_selected_cell_change(record!(selected, |pos| pos))
        .on_paste(record!(pastes, |event: &PasteEvent<'_>| event.text.to_string()))
        .on_column_resize(record!(resizes, |idx, width| (idx, width)))
        .on_scroll(record!(scrolls, |event: &ScrollEvent| *event))
        .on_sort(record!(sorts, |sort: &SortColumn| sort.clone()))
        .on_expanded_group_ids_change(record!(expanded, |ids: &HashSet<String>| ids.clone()))
        .on_selected_rows_change(record!(selected_rows, |ids: &HashSet<String>| ids.clone()))
        .on_row_click(record!(clicks, |idx, _row: &Record, key: &str| (idx, key.to_string())))
        .on_fill(|event: &FillEvent<'_, Record>| vgrid::fill::copy_source_value(event))
}

/// A row with an `id` and one cell per `(key, value)` pair.
pub fn row(id: &str, cells: &[(&str, &str)]) -> Record {
    cells
        .iter()
        .fold(Record::new().with("id", id), |r, (k, v)| r.with(*k, *v))
}

pub fn text_column(key: &str, width: f32) -> Column<Record> {
    Column::new(key, key.to_uppercase())
        .width(ColumnWidth::Pixels(width))
        .text_editor()
}

/// `id` (read-only) plus editable `a`, `b`, `c` columns, 100px each.
pub fn abc_columns() -> Vec<Column<Record>> {
    vec![
        Column::new("id", "ID")
            .width(ColumnWidth::Pixels(100.0))
            .editable(vgrid::Editable::Never),
        text_column("a", 100.0),
        text_column("b", 100.0),
        text_column("c", 100.0),
    ]
}

/// Rows `r0..rN` with `a = "a{i}"`, `b = "b{i}"`, `c = "c{i}"`.
pub fn abc_rows(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            row(
                &format!("r{i}"),
                &[
                    ("a", &format!("a{i}")),
                    ("b", &format!("b{i}")),
                    ("c", &format!("c{i}")),
                ],
            )
        })
        .collect()
}

/// 400x400 grid over `rows` with recording callbacks.
pub fn grid_with(columns: Vec<Column<Record>>, rows: Vec<Record>) -> (GridController<Record>, Log) {
    let log = Log::default();
    let mut grid = GridController::new(columns, rows, GridConfig::default())
        .with_callbacks(recording_callbacks(&log));
    grid.set_viewport_size(400.0, 400.0);
    (grid, log)
}

pub fn abc_grid(n: usize) -> (GridController<Record>, Log) {
    grid_with(abc_columns(), abc_rows(n))
}

/// Hand the last emitted rows back to the grid, as a host would.
pub fn accept_rows(grid: &mut GridController<Record>, log: &Log) {
    let rows = log
        .borrow()
        .rows_changes
        .last()
        .map(|e| e.new_rows.clone())
        .expect("no rows change emitted");
    grid.set_rows(rows);
}

pub fn disabled(text: &str) -> CellValue {
    CellValue::disabled(text)
}

pub fn texts(rows: &[Record], key: &str) -> Vec<String> {
    rows.iter().map(|r| r.cell_text(key).to_string()).collect()
}
