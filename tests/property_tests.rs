//! Property tests for the layout and interaction invariants.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

mod common;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use proptest::prelude::*;
use vgrid::config::{DefaultColumnOptions, DEFAULT_MIN_COLUMN_WIDTH, RENDER_BATCH_SIZE};
use vgrid::fill::DragOverState;
use vgrid::layout::{ColumnLayout, GroupByCell, RowModel, RowWindow};
use vgrid::{CellValue, Column, ColumnWidth, GridRow, Position, Record};

fn arb_width() -> impl Strategy<Value = ColumnWidth> {
    prop_oneof![
        Just(ColumnWidth::Auto),
        (0.0_f32..400.0).prop_map(ColumnWidth::Pixels),
        (1.0_f32..60.0).prop_map(ColumnWidth::Percent),
    ]
}

fn arb_columns() -> impl Strategy<Value = Vec<Rc<Column<Record>>>> {
    prop::collection::vec((arb_width(), any::<bool>()), 1..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (width, frozen))| {
                let column = Column::new(format!("c{i}"), format!("C{i}")).width(width);
                Rc::new(if frozen { column.frozen() } else { column })
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn row_window_is_ordered_and_batched(
        len in 1_usize..5000,
        row_height in 1.0_f32..80.0,
        scroll_fraction in 0.0_f32..1.2,
        client_height in 0.0_f32..2000.0,
    ) {
        let scroll_top = scroll_fraction * len as f32 * row_height;
        let w = RowWindow::compute(len, row_height, scroll_top, client_height).unwrap();
        let last = len - 1;

        prop_assert!(w.overscan_start <= w.visible_start);
        prop_assert!(w.visible_start <= w.visible_end);
        prop_assert!(w.visible_end <= w.overscan_end);
        prop_assert!(w.overscan_end <= last);
        prop_assert_eq!(w.overscan_start % RENDER_BATCH_SIZE, 0);
        prop_assert!(w.overscan_end == last || w.overscan_end % RENDER_BATCH_SIZE == 0);
        prop_assert!(w.contains(w.visible_start) && w.contains(w.visible_end));
    }

    #[test]
    fn column_layout_is_contiguous(columns in arb_columns(), viewport in 0.0_f32..2000.0) {
        let layout = ColumnLayout::compute(
            &columns,
            &HashMap::new(),
            viewport,
            &[],
            &DefaultColumnOptions::default(),
        );

        prop_assert_eq!(layout.len(), columns.len());
        let mut left = 0.0_f32;
        let mut total = 0.0_f32;
        for (i, column) in layout.columns.iter().enumerate() {
            prop_assert_eq!(column.idx, i);
            prop_assert!(column.width >= DEFAULT_MIN_COLUMN_WIDTH);
            prop_assert_eq!(column.left, left);
            left += column.width;
            total += column.width;
        }
        prop_assert_eq!(layout.total_width, total);

        // Unsized columns share what is left of the viewport. Each share is
        // floored to whole pixels, so the row can end up to one pixel short
        // per unsized column.
        let unsized_count = columns.iter().filter(|c| c.width == ColumnWidth::Auto).count();
        if unsized_count > 0 {
            prop_assert!(layout.total_width + 0.01 >= viewport - unsized_count as f32);
        }

        if let Some(window) = layout.viewport_window(0.0) {
            prop_assert!(window.overscan_start <= window.overscan_end);
            prop_assert!(window.overscan_end < layout.len());
        }
    }

    #[test]
    fn expanded_groups_list_every_row_once(
        teams in prop::collection::vec(0_u8..4, 0..40),
        roles in prop::collection::vec(0_u8..3, 40),
    ) {
        let rows: Vec<Record> = teams
            .iter()
            .zip(&roles)
            .enumerate()
            .map(|(i, (team, role))| {
                common::row(&i.to_string(), &[("team", &format!("t{team}")), ("role", &format!("r{role}"))])
            })
            .collect();
        let group_by = vec!["team".to_string(), "role".to_string()];
        let all = RowModel::build(&rows, &group_by, Some(&GroupByCell), &HashSet::new());
        let expanded: HashSet<String> = all.group_ids().map(str::to_string).collect();
        // Nested ids only show up once their parent is expanded, so expand
        // level by level.
        let first = RowModel::build(&rows, &group_by, Some(&GroupByCell), &expanded);
        let expanded: HashSet<String> = first.group_ids().map(str::to_string).collect();
        let model = RowModel::build(&rows, &group_by, Some(&GroupByCell), &expanded);

        let mut leaves: Vec<usize> = model.flat_rows.iter().filter_map(|r| r.raw_idx()).collect();
        leaves.sort_unstable();
        prop_assert_eq!(leaves, (0..rows.len()).collect::<Vec<_>>());
        prop_assert_eq!(model.row_count, model.len());
    }

    #[test]
    fn dragged_over_block_is_symmetric(
        anchor in 0_usize..6,
        selected_row in 0_usize..30,
        over_row in 0_usize..30,
        over_col in 0_usize..8,
        row in 0_usize..30,
        col in 0_usize..8,
    ) {
        let mut drag = DragOverState {
            anchor_col: Some(anchor),
            ..DragOverState::default()
        };
        drag.set_over_row(Some(over_row));
        drag.set_over_col(Some(over_col));

        let rows_hit = row >= selected_row.min(over_row) && row <= selected_row.max(over_row);
        let cols_hit = col >= anchor && col <= over_col.max(anchor);
        prop_assert_eq!(drag.is_dragged_over(selected_row, row, col), rows_hit && cols_hit);

        // Swapping the selected and over rows covers the same block.
        let mut flipped = drag;
        flipped.set_over_row(Some(selected_row));
        prop_assert_eq!(
            flipped.is_dragged_over(over_row, row, col),
            drag.is_dragged_over(selected_row, row, col)
        );
    }

    #[test]
    fn paste_never_writes_disabled_cells(
        locked in prop::collection::vec(any::<bool>(), 12),
        start_col in 1_isize..4,
        start_row in 0_isize..4,
        block in prop::collection::vec(prop::collection::vec("[a-z]{0,3}", 1..4), 1..4),
    ) {
        let mut rows = common::abc_rows(4);
        for (i, lock) in locked.iter().enumerate() {
            let key = ["a", "b", "c"][i % 3];
            if *lock {
                let r = i / 3;
                rows[r] = rows[r].clone().with(key, CellValue::disabled("locked"));
            }
        }
        let (mut grid, log) = common::grid_with(common::abc_columns(), rows.clone());
        grid.select_cell(Position::new(start_col, start_row), false);

        let text = block.iter().map(|r| r.join("\t")).collect::<Vec<_>>().join("\n");
        grid.paste(&text);

        let log = log.borrow();
        if let Some(event) = log.rows_changes.last() {
            prop_assert_eq!(event.new_rows.len(), rows.len());
            for (old, new) in rows.iter().zip(&event.new_rows) {
                prop_assert_eq!(old.cell_text("id"), new.cell_text("id"));
                for key in ["a", "b", "c"] {
                    if old.is_cell_disabled(key) {
                        prop_assert_eq!(old.cell(key), new.cell(key));
                    }
                }
            }
        }
    }
}
