//! Column layout tests
//!
//! Widths, frozen partition, row-group columns and the horizontally visible
//! window.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::HashMap;
use std::rc::Rc;

use test_case::test_case;
use vgrid::config::{DefaultColumnOptions, SELECT_COLUMN_KEY};
use vgrid::layout::{ColumnLayout, ColumnWindow};
use vgrid::{Column, ColumnWidth, Record};

fn px(key: &str, width: f32) -> Rc<Column<Record>> {
    Rc::new(Column::new(key, key).width(ColumnWidth::Pixels(width)))
}

fn compute(columns: &[Rc<Column<Record>>], viewport: f32, group_by: &[&str]) -> ColumnLayout<Record> {
    let group_by: Vec<String> = group_by.iter().map(|k| (*k).to_string()).collect();
    ColumnLayout::compute(
        columns,
        &HashMap::new(),
        viewport,
        &group_by,
        &DefaultColumnOptions::default(),
    )
}

fn keys(layout: &ColumnLayout<Record>) -> Vec<&str> {
    layout.columns.iter().map(|c| c.key()).collect()
}

/// Ten 100px columns.
fn ten_columns() -> Vec<Rc<Column<Record>>> {
    (0..10).map(|i| px(&format!("c{i}"), 100.0)).collect()
}

// ============================================================================
// Widths
// ============================================================================

#[test]
fn percent_width_resolves_against_viewport() {
    let columns = vec![Rc::new(
        Column::<Record>::new("p", "P").width(ColumnWidth::Percent(25.0)),
    )];
    let layout = compute(&columns, 1000.0, &[]);
    assert_eq!(layout.columns[0].width, 250.0);
}

#[test]
fn auto_share_is_floored_and_clamped_per_column() {
    let columns = vec![
        px("fixed", 100.0),
        Rc::new(Column::<Record>::new("narrow", "N").max_width(80.0)),
        Rc::new(Column::<Record>::new("wide", "W").min_width(300.0)),
    ];
    // (401 - 100) / 2 = 150.5, floored to 150.
    let layout = compute(&columns, 401.0, &[]);
    assert_eq!(layout.columns[1].width, 80.0);
    assert_eq!(layout.columns[2].width, 300.0);
    assert_eq!(layout.columns[2].left, 180.0);
    assert_eq!(layout.total_width, 480.0);
}

#[test]
fn auto_share_never_drops_below_global_minimum() {
    let columns = vec![px("fixed", 900.0), Rc::new(Column::<Record>::new("auto", "A"))];
    let layout = compute(&columns, 500.0, &[]);
    assert_eq!(layout.columns[1].width, 54.0);
}

#[test]
fn resized_width_overrides_declaration() {
    let columns = vec![px("a", 100.0), px("b", 100.0)];
    let mut overrides = HashMap::new();
    overrides.insert("b".to_string(), 240.0);
    let layout = ColumnLayout::compute(
        &columns,
        &overrides,
        800.0,
        &[],
        &DefaultColumnOptions::default(),
    );
    assert_eq!(layout.columns[1].width, 240.0);
    assert_eq!(layout.total_width, 340.0);
}

#[test_case("120", ColumnWidth::Pixels(120.0); "bare number")]
#[test_case(" 75px ", ColumnWidth::Pixels(75.0); "pixels with suffix")]
#[test_case("30%", ColumnWidth::Percent(30.0); "percent")]
#[test_case("auto", ColumnWidth::Auto; "auto")]
fn width_declarations_parse(text: &str, expected: ColumnWidth) {
    assert_eq!(text.parse::<ColumnWidth>().unwrap(), expected);
}

#[test_case("-5"; "negative")]
#[test_case("wide"; "not a number")]
#[test_case("x%"; "bad percent")]
fn invalid_width_declarations_are_rejected(text: &str) {
    assert!(text.parse::<ColumnWidth>().is_err());
}

// ============================================================================
// Frozen partition and row-group columns
// ============================================================================

#[test]
fn select_column_and_group_columns_move_to_front() {
    let columns = vec![
        px("name", 100.0),
        px("city", 100.0),
        Rc::new(
            Column::new(SELECT_COLUMN_KEY, "")
                .width(ColumnWidth::Pixels(35.0))
                .frozen(),
        ),
        px("country", 100.0),
    ];
    let layout = compute(&columns, 800.0, &["country", "city"]);
    assert_eq!(keys(&layout), vec![SELECT_COLUMN_KEY, "country", "city", "name"]);
    assert_eq!(layout.group_by, vec!["country".to_string(), "city".to_string()]);
    assert!(layout.columns[1].row_group && layout.columns[1].frozen);
    assert_eq!(layout.last_frozen_idx, Some(2));
    assert!(layout.columns[2].is_last_frozen_column);
    assert_eq!(layout.total_frozen_width, 235.0);
}

#[test]
fn frozen_columns_move_ahead_of_scrollable_ones() {
    let frozen = |key: &str| {
        Rc::new(
            Column::<Record>::new(key, key)
                .width(ColumnWidth::Pixels(50.0))
                .frozen(),
        )
    };
    let columns = vec![px("a", 100.0), frozen("f"), px("b", 100.0), frozen("g")];
    let layout = compute(&columns, 800.0, &[]);

    assert_eq!(keys(&layout), vec!["f", "g", "a", "b"]);
    assert_eq!(layout.last_frozen_idx, Some(1));
    assert!(layout.columns[1].is_last_frozen_column);
    assert!(!layout.columns[2].is_last_frozen_column);
    assert_eq!(layout.total_frozen_width, 100.0);
    assert_eq!(layout.columns[2].left, 100.0);

    let window = layout.viewport_window(0.0).unwrap();
    assert!(window.overscan_start >= 2);
}

#[test]
fn indices_follow_layout_order() {
    let columns = vec![px("b", 100.0), px("a", 100.0)];
    let layout = compute(&columns, 800.0, &["a"]);
    for (i, column) in layout.columns.iter().enumerate() {
        assert_eq!(column.idx, i);
    }
    assert_eq!(layout.index_of("a"), Some(0));
}

#[test]
fn right_frozen_column_pins_to_viewport_edge() {
    let columns = vec![
        px("a", 100.0),
        Rc::new(
            Column::<Record>::new("actions", "Actions")
                .width(ColumnWidth::Pixels(80.0))
                .frozen_right(),
        ),
    ];
    let layout = compute(&columns, 500.0, &[]);
    assert_eq!(layout.columns[1].left, 420.0);
    assert!(layout.columns[1].is_frozen_right());
    // Right-frozen columns are not part of the left frozen block.
    assert_eq!(layout.last_frozen_idx, None);
}

// ============================================================================
// Horizontal window
// ============================================================================

#[test]
fn window_adds_one_column_of_overscan() {
    let layout = compute(&ten_columns(), 300.0, &[]);
    assert_eq!(
        layout.viewport_window(250.0),
        Some(ColumnWindow {
            overscan_start: 1,
            overscan_end: 6,
        })
    );
}

#[test]
fn window_at_origin_starts_at_first_column() {
    let layout = compute(&ten_columns(), 300.0, &[]);
    let window = layout.viewport_window(0.0).unwrap();
    assert_eq!(window.overscan_start, 0);
    assert_eq!(window.overscan_end, 3);
}

#[test]
fn window_clamps_to_last_column() {
    let layout = compute(&ten_columns(), 300.0, &[]);
    let window = layout.viewport_window(700.0).unwrap();
    assert_eq!(window.overscan_end, 9);
}

#[test]
fn window_never_includes_frozen_columns() {
    let mut columns = ten_columns();
    columns[0] = Rc::new(
        Column::new("c0", "c0")
            .width(ColumnWidth::Pixels(100.0))
            .frozen(),
    );
    let layout = compute(&columns, 300.0, &[]);
    let window = layout.viewport_window(0.0).unwrap();
    assert_eq!(window.overscan_start, 1);

    let rendered: Vec<usize> = layout.viewport_columns(window).map(|c| c.idx).collect();
    assert_eq!(rendered.first(), Some(&0));
    assert!(rendered.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn viewport_narrower_than_frozen_block_collapses_window() {
    let columns = vec![
        Rc::new(
            Column::<Record>::new("f", "F")
                .width(ColumnWidth::Pixels(300.0))
                .frozen(),
        ),
        px("a", 100.0),
        px("b", 100.0),
    ];
    let layout = compute(&columns, 200.0, &[]);
    assert_eq!(
        layout.viewport_window(0.0),
        Some(ColumnWindow {
            overscan_start: 1,
            overscan_end: 1,
        })
    );
}

#[test]
fn no_columns_means_no_window() {
    let layout = compute(&[], 300.0, &[]);
    assert!(layout.viewport_window(0.0).is_none());
    assert!(layout.is_empty());
}
