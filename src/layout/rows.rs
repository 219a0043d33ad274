//! Row model: recursive grouping, depth-first flattening and the vertically
//! visible row window.

use std::collections::HashSet;

use crate::config::{OVERSCAN_THRESHOLD, RENDER_BATCH_SIZE};
use crate::types::GridRow;

/// Partitions rows into labelled buckets for one grouping level.
///
/// Returns `(label, members)` pairs in display order. Members are positions
/// into the `rows` slice the grouper was given.
pub trait RowGrouper<R> {
    fn group(&self, rows: &[&R], column_key: &str) -> Vec<(String, Vec<usize>)>;
}

impl<R, F> RowGrouper<R> for F
where
    F: Fn(&[&R], &str) -> Vec<(String, Vec<usize>)>,
{
    fn group(&self, rows: &[&R], column_key: &str) -> Vec<(String, Vec<usize>)> {
        self(rows, column_key)
    }
}

/// Groups rows by the display text of the grouping column, labels in
/// first-seen order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupByCell;

impl<R: GridRow> RowGrouper<R> for GroupByCell {
    fn group(&self, rows: &[&R], column_key: &str) -> Vec<(String, Vec<usize>)> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let label = row.cell_text(column_key);
            match groups.iter_mut().find(|(l, _)| l == label) {
                Some((_, members)) => members.push(i),
                None => groups.push((label.to_string(), vec![i])),
            }
        }
        groups
    }
}

/// A synthetic row heading a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    /// `parent_id__group_key`, or the bare key at the root.
    pub id: String,
    pub parent_id: Option<String>,
    pub group_key: String,
    /// Depth, 0 at the root.
    pub level: usize,
    /// 1-based position among siblings.
    pub pos_in_set: usize,
    pub set_size: usize,
    /// Logical index of this group row as if every group were expanded.
    pub start_row_index: usize,
    /// Raw indices of every row under this group.
    pub child_rows: Vec<usize>,
    pub is_expanded: bool,
}

/// One entry of the flattened row sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatRow {
    Leaf { raw_idx: usize },
    Group(GroupRow),
}

impl FlatRow {
    pub fn raw_idx(&self) -> Option<usize> {
        match self {
            Self::Leaf { raw_idx } => Some(*raw_idx),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupRow> {
        match self {
            Self::Leaf { .. } => None,
            Self::Group(group) => Some(group),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

struct GroupNode {
    key: String,
    child_rows: Vec<usize>,
    children: Option<Vec<GroupNode>>,
    start_row_index: usize,
}

fn group_rows<R, G: RowGrouper<R> + ?Sized>(
    rows: &[R],
    members: &[usize],
    keys: &[String],
    grouper: &G,
    start_row_index: usize,
) -> (Vec<GroupNode>, usize) {
    let Some((key, remaining)) = keys.split_first() else {
        return (Vec::new(), members.len());
    };
    let refs: Vec<&R> = members.iter().filter_map(|&i| rows.get(i)).collect();
    let mut nodes = Vec::new();
    let mut count = 0;
    for (label, positions) in grouper.group(&refs, key) {
        let child_rows: Vec<usize> = positions
            .iter()
            .filter_map(|&p| members.get(p).copied())
            .collect();
        let node_start = start_row_index + count;
        let (children, child_count) = if remaining.is_empty() {
            (None, child_rows.len())
        } else {
            let (nested, nested_count) =
                group_rows(rows, &child_rows, remaining, grouper, node_start + 1);
            (Some(nested), nested_count)
        };
        nodes.push(GroupNode {
            key: label,
            child_rows,
            children,
            start_row_index: node_start,
        });
        count += child_count + 1;
    }
    (nodes, count)
}

fn flatten(
    nodes: Vec<GroupNode>,
    parent_id: Option<&str>,
    level: usize,
    expanded: &HashSet<String>,
    out: &mut Vec<FlatRow>,
) {
    let set_size = nodes.len();
    for (i, node) in nodes.into_iter().enumerate() {
        let id = match parent_id {
            Some(parent) => format!("{parent}__{}", node.key),
            None => node.key.clone(),
        };
        let is_expanded = expanded.contains(&id);
        let leaves = node.child_rows.clone();
        out.push(FlatRow::Group(GroupRow {
            id: id.clone(),
            parent_id: parent_id.map(str::to_string),
            group_key: node.key,
            level,
            pos_in_set: i + 1,
            set_size,
            start_row_index: node.start_row_index,
            child_rows: node.child_rows,
            is_expanded,
        }));
        if is_expanded {
            match node.children {
                Some(children) => flatten(children, Some(&id), level + 1, expanded, out),
                None => out.extend(leaves.into_iter().map(|raw_idx| FlatRow::Leaf { raw_idx })),
            }
        }
    }
}

/// Flattened view of the caller's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowModel {
    pub flat_rows: Vec<FlatRow>,
    /// Logical row count with every group expanded, group rows included.
    pub row_count: usize,
    grouped: bool,
}

impl RowModel {
    /// Ungrouped model: every raw row in order.
    pub fn ungrouped(len: usize) -> Self {
        Self {
            flat_rows: (0..len).map(|raw_idx| FlatRow::Leaf { raw_idx }).collect(),
            row_count: len,
            grouped: false,
        }
    }

    /// Group `rows` by `group_by` keys and flatten the result, expanding only
    /// the groups whose id is in `expanded`.
    pub fn build<R, G: RowGrouper<R> + ?Sized>(
        rows: &[R],
        group_by: &[String],
        grouper: Option<&G>,
        expanded: &HashSet<String>,
    ) -> Self {
        let Some(grouper) = grouper.filter(|_| !group_by.is_empty()) else {
            return Self::ungrouped(rows.len());
        };
        let members: Vec<usize> = (0..rows.len()).collect();
        let (nodes, row_count) = group_rows(rows, &members, group_by, grouper, 0);
        let mut flat_rows = Vec::new();
        flatten(nodes, None, 0, expanded, &mut flat_rows);
        tracing::debug!(
            raw = rows.len(),
            flat = flat_rows.len(),
            row_count,
            levels = group_by.len(),
            "row model grouped"
        );
        Self {
            flat_rows,
            row_count,
            grouped: true,
        }
    }

    pub fn len(&self) -> usize {
        self.flat_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat_rows.is_empty()
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn get(&self, flat_idx: usize) -> Option<&FlatRow> {
        self.flat_rows.get(flat_idx)
    }

    /// Raw row index behind a flat index. Group rows have none.
    pub fn raw_index(&self, flat_idx: usize) -> Option<usize> {
        self.flat_rows.get(flat_idx).and_then(FlatRow::raw_idx)
    }

    pub fn is_group_row(&self, flat_idx: usize) -> bool {
        self.flat_rows.get(flat_idx).is_some_and(FlatRow::is_group)
    }

    /// Flat index of the group row heading `flat_idx`'s group.
    pub fn parent_row_idx(&self, flat_idx: usize) -> Option<usize> {
        let parent_id = self.flat_rows.get(flat_idx)?.as_group()?.parent_id.as_deref()?;
        (0..flat_idx).rev().find(|&i| {
            self.flat_rows
                .get(i)
                .and_then(FlatRow::as_group)
                .is_some_and(|g| g.id == parent_id)
        })
    }

    /// Flat index of the leaf row for a raw index.
    pub fn flat_index_of_raw(&self, raw_idx: usize) -> Option<usize> {
        self.flat_rows
            .iter()
            .position(|r| r.raw_idx() == Some(raw_idx))
    }

    /// Number of group rows currently in the flat sequence.
    pub fn group_row_count(&self) -> usize {
        self.flat_rows.iter().filter(|r| r.is_group()).count()
    }

    /// Ids of every group row currently in the flat sequence.
    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.flat_rows
            .iter()
            .filter_map(FlatRow::as_group)
            .map(|g| g.id.as_str())
    }
}

/// Visible and overscanned row ranges, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub visible_start: usize,
    pub visible_end: usize,
    pub overscan_start: usize,
    pub overscan_end: usize,
}

impl RowWindow {
    /// Rows to render for `len` rows of `row_height` scrolled to `scroll_top`.
    ///
    /// The overscan range keeps [`OVERSCAN_THRESHOLD`] rows on each side and
    /// is rounded outward to multiples of [`RENDER_BATCH_SIZE`], so small
    /// scroll movements keep the same window.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn compute(len: usize, row_height: f32, scroll_top: f32, client_height: f32) -> Option<Self> {
        let last = len.checked_sub(1)?;
        let row_at = |y: f32| -> usize {
            if row_height > 0.0 {
                (y.max(0.0) / row_height).floor() as usize
            } else {
                0
            }
        };
        let visible_end = row_at(scroll_top + client_height.max(0.0)).min(last);
        let visible_start = row_at(scroll_top).min(visible_end);

        let overscan_start =
            visible_start.saturating_sub(OVERSCAN_THRESHOLD) / RENDER_BATCH_SIZE * RENDER_BATCH_SIZE;
        let overscan_end = ((visible_end + OVERSCAN_THRESHOLD).div_ceil(RENDER_BATCH_SIZE)
            * RENDER_BATCH_SIZE)
            .min(last);

        tracing::trace!(
            scroll_top,
            visible_start,
            visible_end,
            overscan_start,
            overscan_end,
            "row window"
        );
        Some(Self {
            visible_start,
            visible_end,
            overscan_start,
            overscan_end,
        })
    }

    pub fn contains(&self, row_idx: usize) -> bool {
        (self.overscan_start..=self.overscan_end).contains(&row_idx)
    }
}
