//! Host collaborators and notification hooks.
//!
//! Everything is optional. Features whose collaborator is missing are
//! disabled rather than failing, except for row keys: features that need
//! them report [`GridError::MissingRowKeyGetter`](crate::GridError) when used.

use std::collections::{BTreeMap, HashSet};

use crate::clipboard::RowKeyFn;
use crate::fill::FillFn;
use crate::layout::RowGrouper;
use crate::types::{PasteEvent, Position, RowsChangeEvent, ScrollEvent, SortColumn};

/// Hooks and collaborators supplied by the host.
pub struct GridCallbacks<R> {
    /// Stable identity for rows.
    pub row_key: Option<Box<RowKeyFn<R>>>,
    /// Splits rows into groups for each group-by level.
    pub row_grouper: Option<Box<dyn RowGrouper<R>>>,
    /// Receives every new row array. The grid itself never stores it; the
    /// host passes it back through `set_rows`.
    pub on_rows_change: Option<Box<dyn FnMut(RowsChangeEvent<R>)>>,
    /// Computes filled rows. Fill drags are disabled without it.
    pub on_fill: Option<Box<FillFn<'static, R>>>,
    /// Told about each paste. Pasting is disabled without it.
    pub on_paste: Option<Box<dyn FnMut(&PasteEvent<'_>)>>,
    /// Receives clipboard text produced by copies.
    pub clipboard: Option<Box<dyn FnMut(&str)>>,
    pub on_selected_cell_change: Option<Box<dyn FnMut(Position)>>,
    /// `(column idx, new width)` for each resize step.
    pub on_column_resize: Option<Box<dyn FnMut(usize, f32)>>,
    pub on_scroll: Option<Box<dyn FnMut(&ScrollEvent)>>,
    pub on_sort: Option<Box<dyn FnMut(&SortColumn)>>,
    pub on_filters_change: Option<Box<dyn FnMut(&BTreeMap<String, String>)>>,
    pub on_expanded_group_ids_change: Option<Box<dyn FnMut(&HashSet<String>)>>,
    pub on_selected_rows_change: Option<Box<dyn FnMut(&HashSet<String>)>>,
    /// `(flat row idx, row, column key)` for clicks on leaf cells.
    pub on_row_click: Option<Box<dyn FnMut(usize, &R, &str)>>,
}

impl<R> Default for GridCallbacks<R> {
    fn default() -> Self {
        Self {
            row_key: None,
            row_grouper: None,
            on_rows_change: None,
            on_fill: None,
            on_paste: None,
            clipboard: None,
            on_selected_cell_change: None,
            on_column_resize: None,
            on_scroll: None,
            on_sort: None,
            on_filters_change: None,
            on_expanded_group_ids_change: None,
            on_selected_rows_change: None,
            on_row_click: None,
        }
    }
}

impl<R> std::fmt::Debug for GridCallbacks<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridCallbacks")
            .field("row_key", &self.row_key.is_some())
            .field("row_grouper", &self.row_grouper.is_some())
            .field("on_rows_change", &self.on_rows_change.is_some())
            .field("on_fill", &self.on_fill.is_some())
            .field("on_paste", &self.on_paste.is_some())
            .finish_non_exhaustive()
    }
}

impl<R> GridCallbacks<R> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn row_key(mut self, f: impl Fn(&R) -> String + 'static) -> Self {
        self.row_key = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn row_grouper(mut self, grouper: impl RowGrouper<R> + 'static) -> Self {
        self.row_grouper = Some(Box::new(grouper));
        self
    }

    #[must_use]
    pub fn on_rows_change(mut self, f: impl FnMut(RowsChangeEvent<R>) + 'static) -> Self {
        self.on_rows_change = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_fill(
        mut self,
        f: impl FnMut(&crate::types::FillEvent<'_, R>) -> Vec<R> + 'static,
    ) -> Self {
        self.on_fill = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_paste(mut self, f: impl FnMut(&PasteEvent<'_>) + 'static) -> Self {
        self.on_paste = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn clipboard(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.clipboard = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_selected_cell_change(mut self, f: impl FnMut(Position) + 'static) -> Self {
        self.on_selected_cell_change = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_column_resize(mut self, f: impl FnMut(usize, f32) + 'static) -> Self {
        self.on_column_resize = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_scroll(mut self, f: impl FnMut(&ScrollEvent) + 'static) -> Self {
        self.on_scroll = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_sort(mut self, f: impl FnMut(&SortColumn) + 'static) -> Self {
        self.on_sort = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_filters_change(mut self, f: impl FnMut(&BTreeMap<String, String>) + 'static) -> Self {
        self.on_filters_change = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_expanded_group_ids_change(mut self, f: impl FnMut(&HashSet<String>) + 'static) -> Self {
        self.on_expanded_group_ids_change = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_selected_rows_change(mut self, f: impl FnMut(&HashSet<String>) + 'static) -> Self {
        self.on_selected_rows_change = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_row_click(mut self, f: impl FnMut(usize, &R, &str) + 'static) -> Self {
        self.on_row_click = Some(Box::new(f));
        self
    }

    pub(crate) fn emit_rows_change(&mut self, event: RowsChangeEvent<R>) {
        if let Some(f) = self.on_rows_change.as_mut() {
            f(event);
        }
    }

    pub(crate) fn emit_selected_cell_change(&mut self, position: Position) {
        if let Some(f) = self.on_selected_cell_change.as_mut() {
            f(position);
        }
    }

    pub(crate) fn write_clipboard(&mut self, text: &str) {
        if let Some(f) = self.clipboard.as_mut() {
            f(text);
        }
    }
}
