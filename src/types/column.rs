use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{GridRow, KeyInput};
use crate::error::GridError;
use crate::format::CostFormat;
use crate::render::{CellEditor, CellFormatter, GroupFormatter, SummaryFormatter, TextEditor};

/// Declared width of a column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawWidth")]
pub enum ColumnWidth {
    /// Share the space left over by sized columns.
    #[default]
    Auto,
    Pixels(f32),
    /// Percentage of the viewport width.
    Percent(f32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWidth {
    Number(f32),
    Text(String),
}

impl TryFrom<RawWidth> for ColumnWidth {
    type Error = GridError;

    fn try_from(raw: RawWidth) -> Result<Self, Self::Error> {
        match raw {
            RawWidth::Number(px) => Self::pixels(px),
            RawWidth::Text(text) => text.parse(),
        }
    }
}

impl FromStr for ColumnWidth {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let invalid = || GridError::InvalidColumnWidth(s.to_string());
        if let Some(pct) = trimmed.strip_suffix('%') {
            let value: f32 = pct.trim().parse().map_err(|_| invalid())?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid());
            }
            return Ok(Self::Percent(value));
        }
        let px = trimmed.strip_suffix("px").unwrap_or(trimmed);
        let value: f32 = px.trim().parse().map_err(|_| invalid())?;
        Self::pixels(value)
    }
}

impl ColumnWidth {
    /// Fixed pixel width. Negative or non-finite widths are rejected.
    pub fn pixels(px: f32) -> Result<Self, GridError> {
        if px.is_finite() && px >= 0.0 {
            Ok(Self::Pixels(px))
        } else {
            Err(GridError::InvalidColumnWidth(px.to_string()))
        }
    }

    /// Width in pixels for the given viewport, or `None` for auto columns.
    pub fn resolve(self, viewport_width: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Pixels(px) => Some(px),
            Self::Percent(pct) => Some((viewport_width * pct / 100.0).floor()),
        }
    }
}

/// Edge a frozen column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrozenAlignment {
    #[default]
    Left,
    Right,
}

/// Horizontal text alignment hint for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

/// Whether a column's cells accept edits.
pub enum Editable<R> {
    Always,
    Never,
    /// Decided per row.
    Predicate(Rc<dyn Fn(&R) -> bool>),
}

impl<R> Editable<R> {
    pub fn allows(&self, row: &R) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Predicate(f) => f(row),
        }
    }
}

impl<R> Clone for Editable<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Always => Self::Always,
            Self::Never => Self::Never,
            Self::Predicate(f) => Self::Predicate(Rc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for Editable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Never => f.write_str("Never"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Decides whether a key pressed inside an open editor leaves it.
pub type NavigationHook = Rc<dyn Fn(&KeyInput) -> bool>;

/// Editor behaviour options.
#[derive(Clone, Default)]
pub struct EditorOptions {
    /// When unset only Tab leaves the editor.
    pub on_navigation: Option<NavigationHook>,
}

impl EditorOptions {
    pub fn allows_navigation(&self, key: &KeyInput) -> bool {
        match &self.on_navigation {
            Some(hook) => hook(key),
            None => key.key == "Tab",
        }
    }
}

/// A raw column declaration.
pub struct Column<R> {
    pub key: String,
    pub name: String,
    pub width: ColumnWidth,
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub frozen: bool,
    pub frozen_alignment: FrozenAlignment,
    pub alignment: Alignment,
    /// Falls back to the grid's default column options.
    pub sortable: Option<bool>,
    pub sort_descending_first: bool,
    /// Falls back to the grid's default column options.
    pub resizable: Option<bool>,
    pub editable: Editable<R>,
    pub formatter: Option<Rc<dyn CellFormatter<R>>>,
    pub group_formatter: Option<Rc<dyn GroupFormatter>>,
    pub summary_formatter: Option<Rc<dyn SummaryFormatter<R>>>,
    pub editor: Option<Rc<dyn CellEditor<R>>>,
    pub editor_options: EditorOptions,
    /// Transform applied to each pasted string before it is written.
    pub format_value: Option<Rc<dyn Fn(&str) -> String>>,
}

impl<R> Column<R> {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            width: ColumnWidth::Auto,
            min_width: None,
            max_width: None,
            frozen: false,
            frozen_alignment: FrozenAlignment::Left,
            alignment: Alignment::Start,
            sortable: None,
            sort_descending_first: false,
            resizable: None,
            editable: Editable::Always,
            formatter: None,
            group_formatter: None,
            summary_formatter: None,
            editor: None,
            editor_options: EditorOptions::default(),
            format_value: None,
        }
    }

    #[must_use]
    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn min_width(mut self, px: f32) -> Self {
        self.min_width = Some(px);
        self
    }

    #[must_use]
    pub fn max_width(mut self, px: f32) -> Self {
        self.max_width = Some(px);
        self
    }

    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Pin to the right edge of the viewport.
    #[must_use]
    pub fn frozen_right(mut self) -> Self {
        self.frozen = true;
        self.frozen_alignment = FrozenAlignment::Right;
        self
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    #[must_use]
    pub fn sort_descending_first(mut self) -> Self {
        self.sort_descending_first = true;
        self
    }

    #[must_use]
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    #[must_use]
    pub fn editable(mut self, editable: Editable<R>) -> Self {
        self.editable = editable;
        self
    }

    #[must_use]
    pub fn editable_if(mut self, predicate: impl Fn(&R) -> bool + 'static) -> Self {
        self.editable = Editable::Predicate(Rc::new(predicate));
        self
    }

    #[must_use]
    pub fn with_editor(mut self, editor: Rc<dyn CellEditor<R>>) -> Self {
        self.editor = Some(editor);
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Rc<dyn CellFormatter<R>>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn with_group_formatter(mut self, formatter: Rc<dyn GroupFormatter>) -> Self {
        self.group_formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn with_summary_formatter(mut self, formatter: Rc<dyn SummaryFormatter<R>>) -> Self {
        self.summary_formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn on_navigation(mut self, hook: impl Fn(&KeyInput) -> bool + 'static) -> Self {
        self.editor_options.on_navigation = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn format_value(mut self, transform: impl Fn(&str) -> String + 'static) -> Self {
        self.format_value = Some(Rc::new(transform));
        self
    }

    /// Apply the paste transform, if any.
    pub fn formatted_paste_value(&self, text: &str) -> String {
        match &self.format_value {
            Some(f) => f(text),
            None => text.to_string(),
        }
    }

    pub fn is_frozen_right(&self) -> bool {
        self.frozen && self.frozen_alignment == FrozenAlignment::Right
    }
}

impl<R: GridRow + 'static> Column<R> {
    /// Attach the built-in text editor.
    #[must_use]
    pub fn text_editor(self) -> Self {
        self.with_editor(Rc::new(TextEditor))
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("frozen", &self.frozen)
            .field("frozen_alignment", &self.frozen_alignment)
            .field("editable", &self.editable)
            .field("has_editor", &self.editor.is_some())
            .finish_non_exhaustive()
    }
}

/// A column after layout.
pub struct CalculatedColumn<R> {
    pub column: Rc<Column<R>>,
    /// Position in the laid-out order.
    pub idx: usize,
    /// Offset from the grid's left edge. Right-frozen columns are placed at
    /// `viewport_width - width`.
    pub left: f32,
    pub width: f32,
    /// Explicitly frozen or a row-group column.
    pub frozen: bool,
    /// Column key is part of the active group-by list.
    pub row_group: bool,
    pub is_last_frozen_column: bool,
    pub sortable: bool,
    pub resizable: bool,
}

impl<R> CalculatedColumn<R> {
    pub fn key(&self) -> &str {
        &self.column.key
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn is_frozen_right(&self) -> bool {
        self.frozen && self.column.frozen_alignment == FrozenAlignment::Right
    }
}

impl<R> Clone for CalculatedColumn<R> {
    fn clone(&self) -> Self {
        Self {
            column: Rc::clone(&self.column),
            ..*self
        }
    }
}

impl<R> fmt::Debug for CalculatedColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatedColumn")
            .field("key", &self.column.key)
            .field("idx", &self.idx)
            .field("left", &self.left)
            .field("width", &self.width)
            .field("frozen", &self.frozen)
            .field("row_group", &self.row_group)
            .field("is_last_frozen_column", &self.is_last_frozen_column)
            .finish()
    }
}

/// JSON column declaration accepted by the facade.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: ColumnWidth,
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub frozen_alignment: FrozenAlignment,
    #[serde(default)]
    pub alignment: Alignment,
    pub sortable: Option<bool>,
    #[serde(default)]
    pub sort_descending_first: bool,
    pub resizable: Option<bool>,
    /// Editable columns get the built-in text editor.
    #[serde(default)]
    pub editable: bool,
    /// Format pasted and edited values as a cost.
    pub format_cost: Option<CostFormat>,
}

impl ColumnSpec {
    pub fn into_column<R: GridRow + 'static>(self) -> Column<R> {
        let mut column = Column::new(self.key, self.name).width(self.width);
        column.min_width = self.min_width;
        column.max_width = self.max_width;
        column.frozen = self.frozen;
        column.frozen_alignment = self.frozen_alignment;
        column.alignment = self.alignment;
        column.sortable = self.sortable;
        column.sort_descending_first = self.sort_descending_first;
        column.resizable = self.resizable;
        if let Some(format) = self.format_cost {
            column = column.format_value(format.into_formatter());
        }
        if self.editable {
            column.text_editor()
        } else {
            column.editable(Editable::Never)
        }
    }
}
