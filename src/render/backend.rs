//! Rendering boundary.
//!
//! The grid never draws by itself. It hands rectangles and content to a
//! [`RenderSurface`], and asks column-provided formatters and editors for
//! text. Any of those collaborators may fail; failures stay inside the cell
//! that caused them.

use crate::error::GridError;
use crate::layout::GroupRow;
use crate::types::{CellValue, GridRow, SortDirection};

/// Screen rectangle in CSS pixels, relative to the grid's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Per-cell presentation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CellDecorations {
    pub selected: bool,
    pub editing: bool,
    /// Part of the copied range (never set on disabled cells).
    pub copied: bool,
    /// First row of the copied range.
    pub copied_top: bool,
    /// Last row of the copied range.
    pub copied_bottom: bool,
    /// Inside the live drag-over block (never set on disabled or frozen cells).
    pub dragged_over: bool,
    pub disabled: bool,
    pub error: bool,
    pub alert: bool,
    pub warning: bool,
    pub frozen: bool,
    /// Last left-frozen column while the grid is scrolled horizontally.
    pub frozen_shadow: bool,
}

/// What to draw in a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawContent<'a> {
    HeaderCell {
        name: &'a str,
        sort: Option<SortDirection>,
    },
    FilterCell {
        value: &'a str,
    },
    Cell {
        text: String,
        decorations: CellDecorations,
    },
    GroupRow {
        label: String,
        level: usize,
        expanded: bool,
        selected: bool,
    },
    SummaryCell {
        text: String,
    },
    /// Small square at the selected cell's bottom-right corner.
    FillHandle,
}

/// A target that can draw grid content.
pub trait RenderSurface {
    /// Called once per paint pass before any `draw`.
    fn begin(&mut self, _width: f32, _height: f32) {}

    fn draw(&mut self, rect: Rect, content: &DrawContent<'_>);
}

/// Turns a cell value into display text.
pub trait CellFormatter<R> {
    fn format(&self, value: &CellValue, row: &R) -> Result<String, GridError>;
}

impl<R, F> CellFormatter<R> for F
where
    F: Fn(&CellValue, &R) -> Result<String, GridError>,
{
    fn format(&self, value: &CellValue, row: &R) -> Result<String, GridError> {
        self(value, row)
    }
}

/// Label for a group row.
pub trait GroupFormatter {
    fn format(&self, group: &GroupRow) -> Result<String, GridError>;
}

impl<F> GroupFormatter for F
where
    F: Fn(&GroupRow) -> Result<String, GridError>,
{
    fn format(&self, group: &GroupRow) -> Result<String, GridError> {
        self(group)
    }
}

/// Text for one pinned summary row.
pub trait SummaryFormatter<R> {
    fn format(&self, summary_idx: usize, rows: &[R]) -> Result<String, GridError>;
}

impl<R, F> SummaryFormatter<R> for F
where
    F: Fn(usize, &[R]) -> Result<String, GridError>,
{
    fn format(&self, summary_idx: usize, rows: &[R]) -> Result<String, GridError> {
        self(summary_idx, rows)
    }
}

/// In-place editor for one column.
pub trait CellEditor<R> {
    /// Text shown when the editor opens on `row`.
    fn render(&self, row: &R, column_key: &str) -> Result<String, GridError>;

    /// Row with the editor's input applied.
    fn apply(&self, row: &R, column_key: &str, input: &str) -> Result<R, GridError>;
}

/// Plain text editor. Keeps the cell's flags and replaces its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEditor;

impl<R: GridRow> CellEditor<R> for TextEditor {
    fn render(&self, row: &R, column_key: &str) -> Result<String, GridError> {
        Ok(row.cell_text(column_key).to_string())
    }

    fn apply(&self, row: &R, column_key: &str, input: &str) -> Result<R, GridError> {
        let mut updated = row.clone();
        let cell = row
            .cell(column_key)
            .map_or_else(|| CellValue::from(input), |c| c.with_text(input));
        updated.set_cell(column_key, cell);
        Ok(updated)
    }
}

/// Default group label: `key (count)`.
pub fn default_group_label(group: &GroupRow) -> String {
    format!("{} ({})", group.group_key, group.child_rows.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Record;

    #[test]
    fn text_editor_keeps_flags() {
        let row = Record::new().with(
            "v",
            CellValue::Rich(crate::types::RichCell {
                value: "old".into(),
                alert: true,
                ..Default::default()
            }),
        );
        let editor = TextEditor;
        assert_eq!(CellEditor::<Record>::render(&editor, &row, "v").unwrap(), "old");
        let updated = editor.apply(&row, "v", "new").unwrap();
        assert_eq!(updated.cell_text("v"), "new");
        assert!(updated.cell("v").unwrap().has_alert());
    }

    #[test]
    fn closures_are_formatters() {
        let upper = |v: &CellValue, _: &Record| Ok::<_, GridError>(v.text().to_uppercase());
        let formatter: &dyn CellFormatter<Record> = &upper;
        assert_eq!(formatter.format(&"abc".into(), &Record::new()).unwrap(), "ABC");
    }
}
