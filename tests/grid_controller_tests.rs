//! Grid controller tests
//!
//! Header interactions, host-owned state round trips, grouping setters and
//! pointer hit testing.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use common::{abc_columns, abc_grid, abc_rows, grid_with, row, text_column};
use vgrid::layout::GroupByCell;
use vgrid::{
    CellNavigationMode, ChangeCause, Column, ColumnWidth, GridCallbacks, GridConfig,
    GridController, GridError, Position, Record, SortColumn, SortDirection,
};

fn ids(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|k| (*k).to_string()).collect()
}

fn team_rows() -> Vec<Record> {
    vec![
        row("1", &[("team", "red")]),
        row("2", &[("team", "blue")]),
        row("3", &[("team", "red")]),
    ]
}

fn team_columns() -> Vec<Column<Record>> {
    vec![text_column("id", 80.0), text_column("team", 80.0)]
}

// ============================================================================
// Sorting
// ============================================================================

fn sortable_columns() -> Vec<Column<Record>> {
    vec![
        text_column("id", 100.0),
        text_column("a", 100.0).sortable(true),
        text_column("b", 100.0),
        text_column("c", 100.0).sortable(true).sort_descending_first(),
    ]
}

#[test]
fn sort_cycle_follows_host_state() {
    let (mut grid, log) = grid_with(sortable_columns(), abc_rows(3));

    grid.sort_column(1);
    assert_eq!(
        log.borrow().sorts.last(),
        Some(&SortColumn {
            column_key: "a".to_string(),
            direction: Some(SortDirection::Asc),
        })
    );
    // Nothing changes until the host hands the sort back.
    assert_eq!(grid.sort_direction("a"), None);

    grid.set_sort(log.borrow().sorts.last().cloned());
    assert_eq!(grid.sort_direction("a"), Some(SortDirection::Asc));
    grid.sort_column(1);
    assert_eq!(
        log.borrow().sorts.last().unwrap().direction,
        Some(SortDirection::Desc)
    );

    grid.set_sort(log.borrow().sorts.last().cloned());
    grid.sort_column(1);
    assert_eq!(log.borrow().sorts.last().unwrap().direction, None);
}

#[test]
fn descending_first_columns_start_descending() {
    let (mut grid, log) = grid_with(sortable_columns(), abc_rows(3));
    grid.set_sort(Some(SortColumn {
        column_key: "a".to_string(),
        direction: Some(SortDirection::Asc),
    }));
    grid.sort_column(3);
    assert_eq!(
        log.borrow().sorts.last(),
        Some(&SortColumn {
            column_key: "c".to_string(),
            direction: Some(SortDirection::Desc),
        })
    );
}

#[test]
fn unsortable_columns_ignore_header_clicks() {
    let (mut grid, log) = grid_with(sortable_columns(), abc_rows(3));
    grid.sort_column(2);
    grid.sort_column(42);
    assert!(log.borrow().sorts.is_empty());
}

#[test]
fn default_options_make_every_column_sortable() {
    let mut config = GridConfig::default();
    config.default_column_options.sortable = true;
    let (mut grid, log) = abc_grid(2);
    grid.set_config(config);
    grid.sort_column(2);
    assert_eq!(log.borrow().sorts[0].column_key, "b");
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn filter_edits_are_reported_not_applied() {
    let (mut grid, _log) = abc_grid(2);
    let seen: Rc<RefCell<Vec<BTreeMap<String, String>>>> = Rc::default();
    grid.callbacks_mut().on_filters_change = Some(Box::new({
        let seen = Rc::clone(&seen);
        move |filters: &BTreeMap<String, String>| seen.borrow_mut().push(filters.clone())
    }));

    grid.set_filter("a", "x");
    assert_eq!(grid.filter_value("a"), "");
    assert_eq!(seen.borrow()[0].get("a").map(String::as_str), Some("x"));

    grid.set_filters(seen.borrow()[0].clone());
    assert_eq!(grid.filter_value("a"), "x");

    grid.set_filter("a", "");
    assert!(seen.borrow()[1].is_empty());
}

// ============================================================================
// Row selection
// ============================================================================

#[test]
fn shift_click_selects_the_range_between() {
    let (mut grid, log) = abc_grid(6);
    grid.select_row(1, true, false).unwrap();
    assert_eq!(log.borrow().selected_rows.last(), Some(&ids(&["r1"])));
    grid.set_selected_rows(ids(&["r1"]));

    grid.select_row(4, true, true).unwrap();
    assert_eq!(
        log.borrow().selected_rows.last(),
        Some(&ids(&["r1", "r2", "r3", "r4"]))
    );
}

#[test]
fn unchecking_forgets_the_range_anchor() {
    let (mut grid, log) = abc_grid(6);
    grid.select_row(1, true, false).unwrap();
    grid.set_selected_rows(ids(&["r1"]));
    grid.select_row(1, false, false).unwrap();
    assert!(log.borrow().selected_rows.last().unwrap().is_empty());
    grid.set_selected_rows(HashSet::new());

    grid.select_row(4, true, true).unwrap();
    assert_eq!(log.borrow().selected_rows.last(), Some(&ids(&["r4"])));
}

#[test]
fn checking_a_group_row_checks_its_members() {
    let (mut grid, log) = grid_with(team_columns(), team_rows());
    grid.set_group_by(vec!["team".to_string()]).unwrap();
    grid.set_expanded_group_ids(ids(&["red", "blue"]));
    // red, 1, 3, blue, 2
    grid.select_row(0, true, false).unwrap();
    assert_eq!(log.borrow().selected_rows.last(), Some(&ids(&["1", "3"])));

    grid.set_selected_rows(ids(&["1", "3"]));
    assert!(grid.is_row_selected(2).unwrap());
    assert!(!grid.is_row_selected(4).unwrap());
}

#[test]
fn shift_range_skips_group_rows() {
    let (mut grid, log) = grid_with(team_columns(), team_rows());
    grid.set_group_by(vec!["team".to_string()]).unwrap();
    grid.set_expanded_group_ids(ids(&["red", "blue"]));
    grid.select_row(1, true, false).unwrap();
    grid.set_selected_rows(ids(&["1"]));
    grid.select_row(4, true, true).unwrap();
    assert_eq!(
        log.borrow().selected_rows.last(),
        Some(&ids(&["1", "3", "2"]))
    );
}

#[test]
fn select_all_rows_round_trip() {
    let (mut grid, log) = abc_grid(3);
    assert!(!grid.all_rows_selected().unwrap());
    grid.select_all_rows(true).unwrap();
    let all = log.borrow().selected_rows.last().cloned().unwrap();
    assert_eq!(all, ids(&["r0", "r1", "r2"]));

    grid.set_selected_rows(all);
    assert!(grid.all_rows_selected().unwrap());
    grid.select_all_rows(false).unwrap();
    assert!(log.borrow().selected_rows.last().unwrap().is_empty());

    let (empty, _log) = abc_grid(0);
    assert!(!empty.all_rows_selected().unwrap());
}

#[test]
fn row_selection_needs_a_row_key_getter() {
    let mut grid = GridController::new(abc_columns(), abc_rows(2), GridConfig::default());
    assert!(matches!(
        grid.select_row(0, true, false),
        Err(GridError::MissingRowKeyGetter {
            feature: "row selection"
        })
    ));
    assert!(grid.select_all_rows(true).is_err());
    assert!(grid.is_row_selected(0).is_err());
}

// ============================================================================
// Column resize
// ============================================================================

#[test]
fn resize_reports_clamped_widths() {
    let columns = vec![
        text_column("id", 100.0),
        text_column("a", 100.0).resizable(true),
    ];
    let (mut grid, log) = grid_with(columns, abc_rows(1));

    assert!(!grid.begin_resize(0));
    assert!(grid.begin_resize(1));
    assert!(grid.is_resizing());

    grid.resize_to(50.0);
    assert_eq!(grid.layout().columns[1].width, 150.0);
    assert_eq!(grid.column_widths().get("a"), Some(&150.0));

    grid.resize_to(-70.0);
    grid.resize_to(-500.0);
    assert_eq!(log.borrow().resizes, vec![(1, 150.0), (1, 54.0)]);

    grid.end_resize();
    grid.resize_to(10.0);
    assert_eq!(log.borrow().resizes.len(), 2);
}

#[test]
fn resized_width_survives_column_updates() {
    let (mut grid, _log) = abc_grid(1);
    let mut config = GridConfig::default();
    config.default_column_options.resizable = true;
    grid.set_config(config);
    grid.begin_resize(2);
    grid.resize_to(20.0);
    grid.end_resize();

    grid.set_columns(abc_columns());
    assert_eq!(grid.layout().columns[2].width, 120.0);
    assert_eq!(grid.layout().columns[3].left, 320.0);
}

// ============================================================================
// Grouping setters
// ============================================================================

#[test]
fn group_by_validates_inputs() {
    let mut grid = GridController::new(team_columns(), team_rows(), GridConfig::default());
    assert!(matches!(
        grid.set_group_by(vec!["team".to_string()]),
        Err(GridError::MissingRowGrouper)
    ));
    assert!(grid.set_group_by(Vec::new()).is_ok());

    let (mut grid, _log) = grid_with(team_columns(), team_rows());
    match grid.set_group_by(vec!["nope".to_string()]) {
        Err(GridError::ColumnNotFound(key)) => assert_eq!(key, "nope"),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(grid.group_by().is_empty());
}

#[test]
fn grouping_needs_row_keys() {
    let callbacks = GridCallbacks::new().row_grouper(GroupByCell);
    let mut grid = GridController::new(team_columns(), team_rows(), GridConfig::default())
        .with_callbacks(callbacks);
    assert!(matches!(
        grid.set_group_by(vec!["team".to_string()]),
        Err(GridError::MissingRowKeyGetter { feature: "grouping" })
    ));
    assert!(grid.group_by().is_empty());
    assert_eq!(grid.row_model().len(), team_rows().len());
}

#[test]
fn toggling_a_group_is_reported_to_host() {
    let (mut grid, log) = grid_with(team_columns(), team_rows());
    grid.set_group_by(vec!["team".to_string()]).unwrap();
    assert_eq!(grid.row_model().len(), 2);

    grid.toggle_group("red");
    assert_eq!(log.borrow().expanded.last(), Some(&ids(&["red"])));
    assert_eq!(grid.row_model().len(), 2);

    grid.set_expanded_group_ids(ids(&["red"]));
    assert_eq!(grid.row_model().len(), 4);
    grid.toggle_group("red");
    assert!(log.borrow().expanded.last().unwrap().is_empty());
}

#[test]
fn group_columns_are_frozen_and_first() {
    let (mut grid, _log) = grid_with(team_columns(), team_rows());
    grid.set_group_by(vec!["team".to_string()]).unwrap();
    let layout = grid.layout();
    assert_eq!(layout.columns[0].key(), "team");
    assert!(layout.columns[0].frozen);
    assert!(grid.has_groups());
}

// ============================================================================
// Clicks and formatter updates
// ============================================================================

#[test]
fn clicks_on_leaf_cells_are_reported() {
    let (mut grid, log) = grid_with(team_columns(), team_rows());
    grid.cell_click(Position::new(1, 2));
    assert_eq!(log.borrow().clicks, vec![(2, "team".to_string())]);

    grid.set_group_by(vec!["team".to_string()]).unwrap();
    grid.cell_click(Position::new(1, 0));
    assert_eq!(log.borrow().clicks.len(), 1);
}

#[test]
fn formatter_row_change_replaces_one_row() {
    let (mut grid, log) = abc_grid(3);
    let updated = grid.rows()[1].clone().with("a", "formatted");
    grid.apply_formatter_row_change(1, updated.clone());
    grid.apply_formatter_row_change(9, updated.clone());

    let log = log.borrow();
    assert_eq!(log.rows_changes.len(), 1);
    let event = &log.rows_changes[0];
    assert_eq!(event.new_rows[1], updated);
    assert_eq!(event.new_rows[0], grid.rows()[0]);
    assert_eq!(event.cause, ChangeCause::RowUpdate { row_idx: 1 });
}

// ============================================================================
// Hit testing and viewport
// ============================================================================

#[test]
fn position_at_maps_points_to_cells() {
    let (mut grid, _log) = abc_grid(50);
    assert_eq!(grid.position_at(150.0, 35.0 + 70.0 + 1.0), Some(Position::new(1, 2)));
    assert_eq!(grid.position_at(150.0, 10.0), None);
    assert_eq!(grid.position_at(-1.0, 100.0), None);

    grid.handle_scroll(350.0, 0.0);
    assert_eq!(grid.position_at(50.0, 36.0), Some(Position::new(0, 10)));
}

#[test]
fn frozen_columns_hit_test_without_scroll() {
    let columns = vec![
        text_column("id", 100.0).frozen(),
        text_column("a", 200.0),
        text_column("b", 200.0),
        text_column("c", 200.0),
    ];
    let (mut grid, _log) = grid_with(columns, abc_rows(3));
    grid.handle_scroll(0.0, 150.0);
    assert_eq!(grid.position_at(50.0, 40.0), Some(Position::new(0, 0)));
    // 120px on screen is 270px in content: column a.
    assert_eq!(grid.position_at(120.0, 40.0), Some(Position::new(1, 0)));

    let rendered: Vec<&str> = grid.viewport_columns().iter().map(|c| c.key()).collect();
    assert_eq!(rendered.first(), Some(&"id"));
}

#[test]
fn same_viewport_size_is_a_no_op() {
    let (mut grid, _log) = abc_grid(3);
    assert!(!grid.set_viewport_size(400.0, 400.0));
    assert!(grid.set_viewport_size(600.0, 400.0));
    assert_eq!(grid.layout().viewport_width(), 600.0);
}

#[test]
fn shrinking_columns_resets_the_selection() {
    let (mut grid, _log) = abc_grid(3);
    grid.select_cell(Position::new(3, 0), false);
    grid.set_columns(vec![text_column("id", 100.0), text_column("a", 100.0)]);
    assert_eq!(grid.selected_position(), Position::NONE);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_parses_camel_case_json() {
    let config = GridConfig::from_json(
        r#"{
            "rowHeight": 24,
            "enableFilterRow": true,
            "cellNavigationMode": "LOOP_OVER_ROW",
            "defaultColumnOptions": { "minWidth": 40, "resizable": true }
        }"#,
    )
    .unwrap();
    assert_eq!(config.row_height, 24.0);
    assert_eq!(config.cell_navigation_mode, CellNavigationMode::LoopOverRow);
    assert_eq!(config.total_header_height(), 24.0 + 45.0);
    assert_eq!(config.default_column_options.min_width, 40.0);
    assert!(!config.default_column_options.sortable);

    assert!(matches!(
        GridConfig::from_json("{ not json"),
        Err(GridError::Serialization(_))
    ));
}

#[test]
fn percent_columns_follow_viewport_width() {
    let columns = vec![
        Column::<Record>::new("id", "ID").width(ColumnWidth::Percent(50.0)),
        text_column("a", 100.0),
    ];
    let (mut grid, _log) = grid_with(columns, abc_rows(1));
    assert_eq!(grid.layout().columns[0].width, 200.0);
    grid.set_viewport_size(800.0, 400.0);
    assert_eq!(grid.layout().columns[0].width, 400.0);
}
