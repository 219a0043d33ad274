//! Canvas 2D surface.
//!
//! Draws grid content with the HTML Canvas 2D API via web-sys. Coordinates
//! arrive in CSS pixels and are scaled by the device pixel ratio once per
//! paint pass.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::backend::{CellDecorations, DrawContent, Rect, RenderSurface};
use crate::error::{GridError, Result};
use crate::types::SortDirection;

/// Grid palette.
mod colors {
    pub const BACKGROUND: &str = "#FFFFFF";
    pub const GRID_LINE: &str = "#DDDDDD";
    pub const HEADER_BG: &str = "#F9F9F9";
    pub const TEXT: &str = "#000000";
    pub const SELECTED: &str = "#66AFE9";
    pub const COPIED_BG: &str = "#CCCCEE";
    pub const COPIED_BORDER: &str = "#0066CC";
    pub const DRAGGED_OVER_BG: &str = "#E8F0FE";
    pub const DISABLED_BG: &str = "#F2F2F2";
    pub const DISABLED_TEXT: &str = "#8A8A8A";
    pub const ERROR_BG: &str = "#FDECEA";
    pub const ALERT_BG: &str = "#FFF4E5";
    pub const WARNING_BG: &str = "#FFFBE6";
    pub const GROUP_BG: &str = "#F3F3F3";
    pub const FROZEN_SHADOW: &str = "rgba(0, 0, 0, 0.18)";
}

const CELL_PADDING: f64 = 8.0;
const GROUP_INDENT: f64 = 16.0;
const FONT: &str = "14px -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";
const HEADER_FONT: &str = "600 14px -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";

/// [`RenderSurface`] backed by a `<canvas>` element.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, dpr: f32) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| GridError::Dom("failed to get 2d context".into()))?
            .ok_or_else(|| GridError::Dom("no 2d context available".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GridError::Dom("failed to cast to CanvasRenderingContext2d".into()))?;
        Ok(Self {
            canvas,
            ctx,
            dpr: f64::from(dpr),
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn set_dpr(&mut self, dpr: f32) {
        self.dpr = f64::from(dpr);
    }

    fn fill(&self, rect: &Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
    }

    /// Right and bottom grid lines of a cell.
    fn grid_lines(&self, rect: &Rect) {
        let (right, bottom) = (f64::from(rect.right()) - 0.5, f64::from(rect.bottom()) - 0.5);
        self.ctx.set_stroke_style_str(colors::GRID_LINE);
        self.ctx.set_line_width(1.0);
        self.ctx.begin_path();
        self.ctx.move_to(right, f64::from(rect.y));
        self.ctx.line_to(right, bottom);
        self.ctx.line_to(f64::from(rect.x), bottom);
        self.ctx.stroke();
    }

    /// Left-aligned, vertically centred text clipped to the cell.
    fn text(&self, rect: &Rect, text: &str, indent: f64, color: &str) {
        if text.is_empty() {
            return;
        }
        self.ctx.save();
        self.ctx.begin_path();
        self.ctx.rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
        self.ctx.clip();
        self.ctx.set_fill_style_str(color);
        self.ctx.set_text_align("left");
        self.ctx.set_text_baseline("middle");
        let _ = self.ctx.fill_text(
            text,
            f64::from(rect.x) + CELL_PADDING + indent,
            f64::from(rect.y) + f64::from(rect.height) / 2.0,
        );
        self.ctx.restore();
    }

    fn outline(&self, rect: &Rect, color: &str, width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        let inset = width / 2.0;
        self.ctx.stroke_rect(
            f64::from(rect.x) + inset,
            f64::from(rect.y) + inset,
            f64::from(rect.width) - width,
            f64::from(rect.height) - width,
        );
    }

    fn draw_cell(&self, rect: &Rect, text: &str, d: &CellDecorations) {
        let background = if d.copied {
            colors::COPIED_BG
        } else if d.dragged_over {
            colors::DRAGGED_OVER_BG
        } else if d.disabled {
            colors::DISABLED_BG
        } else if d.error {
            colors::ERROR_BG
        } else if d.alert {
            colors::ALERT_BG
        } else if d.warning {
            colors::WARNING_BG
        } else {
            colors::BACKGROUND
        };
        self.fill(rect, background);
        self.grid_lines(rect);
        let color = if d.disabled { colors::DISABLED_TEXT } else { colors::TEXT };
        self.ctx.set_font(FONT);
        self.text(rect, text, 0.0, color);

        if d.copied {
            self.copied_edges(rect, d);
        }
        if d.selected {
            self.outline(rect, colors::SELECTED, 2.0);
        }
        if d.frozen_shadow {
            self.ctx.set_fill_style_str(colors::FROZEN_SHADOW);
            self.ctx.fill_rect(
                f64::from(rect.right()),
                f64::from(rect.y),
                2.0,
                f64::from(rect.height),
            );
        }
    }

    /// Dashed side borders, plus top and bottom on the range's first and
    /// last rows.
    fn copied_edges(&self, rect: &Rect, d: &CellDecorations) {
        let (x, y) = (f64::from(rect.x) + 0.5, f64::from(rect.y) + 0.5);
        let (right, bottom) = (f64::from(rect.right()) - 0.5, f64::from(rect.bottom()) - 0.5);
        let dash = js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(2.0));
        let _ = self.ctx.set_line_dash(&dash);
        self.ctx.set_stroke_style_str(colors::COPIED_BORDER);
        self.ctx.set_line_width(1.0);
        self.ctx.begin_path();
        self.ctx.move_to(x, y);
        self.ctx.line_to(x, bottom);
        self.ctx.move_to(right, y);
        self.ctx.line_to(right, bottom);
        if d.copied_top {
            self.ctx.move_to(x, y);
            self.ctx.line_to(right, y);
        }
        if d.copied_bottom {
            self.ctx.move_to(x, bottom);
            self.ctx.line_to(right, bottom);
        }
        self.ctx.stroke();
        let _ = self.ctx.set_line_dash(&js_sys::Array::new());
    }
}

impl RenderSurface for CanvasSurface {
    fn begin(&mut self, width: f32, height: f32) {
        let _ = self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
        self.ctx.set_fill_style_str(colors::BACKGROUND);
        self.ctx
            .fill_rect(0.0, 0.0, f64::from(width), f64::from(height));
    }

    fn draw(&mut self, rect: Rect, content: &DrawContent<'_>) {
        match content {
            DrawContent::HeaderCell { name, sort } => {
                self.fill(&rect, colors::HEADER_BG);
                self.grid_lines(&rect);
                self.ctx.set_font(HEADER_FONT);
                let label = match sort {
                    Some(SortDirection::Asc) => format!("{name} \u{25B2}"),
                    Some(SortDirection::Desc) => format!("{name} \u{25BC}"),
                    None => (*name).to_string(),
                };
                self.text(&rect, &label, 0.0, colors::TEXT);
            }
            DrawContent::FilterCell { value } => {
                self.fill(&rect, colors::BACKGROUND);
                self.grid_lines(&rect);
                self.ctx.set_font(FONT);
                self.text(&rect, value, 0.0, colors::TEXT);
            }
            DrawContent::Cell { text, decorations } => self.draw_cell(&rect, text, decorations),
            DrawContent::GroupRow {
                label,
                level,
                expanded,
                selected,
            } => {
                self.fill(&rect, colors::GROUP_BG);
                self.grid_lines(&rect);
                self.ctx.set_font(HEADER_FONT);
                let caret = if *expanded { '\u{25BE}' } else { '\u{25B8}' };
                #[allow(clippy::cast_precision_loss)]
                let indent = *level as f64 * GROUP_INDENT;
                self.text(&rect, &format!("{caret} {label}"), indent, colors::TEXT);
                if *selected {
                    self.outline(&rect, colors::SELECTED, 2.0);
                }
            }
            DrawContent::SummaryCell { text } => {
                self.fill(&rect, colors::HEADER_BG);
                self.grid_lines(&rect);
                self.ctx.set_font(HEADER_FONT);
                self.text(&rect, text, 0.0, colors::TEXT);
            }
            DrawContent::FillHandle => {
                self.fill(&rect, colors::SELECTED);
                self.outline(&rect, colors::BACKGROUND, 1.0);
            }
        }
    }
}
