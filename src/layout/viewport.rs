//! Viewport state and scroll-into-view math.

use super::ColumnLayout;

/// The visible area of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Horizontal scroll offset in pixels
    pub scroll_left: f32,
    /// Vertical scroll offset in pixels
    pub scroll_top: f32,
    /// Outer width of the grid
    pub width: f32,
    /// Outer height of the grid, header and summary rows included
    pub height: f32,
}

fn differs(a: f32, b: f32) -> bool {
    (a - b).abs() > f32::EPSILON
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Apply a measured size. Returns `false` when nothing changed, which
    /// lets resize observers fire repeatedly without forcing recomputation.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !differs(self.width, width) && !differs(self.height, height) {
            return false;
        }
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        true
    }

    /// Apply a scroll position. Returns `false` when unchanged.
    pub fn scroll_to(&mut self, scroll_top: f32, scroll_left: f32) -> bool {
        let top = scroll_top.max(0.0);
        let left = scroll_left.max(0.0);
        if !differs(self.scroll_top, top) && !differs(self.scroll_left, left) {
            return false;
        }
        self.scroll_top = top;
        self.scroll_left = left;
        true
    }

    /// Scroll offset that brings column `idx` fully into view, or `None` if
    /// it is already visible or frozen.
    pub fn scroll_left_for_column<R>(&self, layout: &ColumnLayout<R>, idx: usize) -> Option<f32> {
        if !layout.is_scrollable(idx) {
            return None;
        }
        let column = layout.get(idx)?;
        if column.frozen {
            return None;
        }
        let visible_left = self.scroll_left + layout.total_frozen_width;
        let visible_right = self.scroll_left + self.width;
        if column.left < visible_left {
            Some((column.left - layout.total_frozen_width).max(0.0))
        } else if column.right() > visible_right {
            Some((column.right() - self.width).max(0.0))
        } else {
            None
        }
    }

    /// Scroll offset that brings row `row_idx` fully into view, or `None` if
    /// it is already visible.
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll_top_for_row(&self, row_idx: usize, row_height: f32, client_height: f32) -> Option<f32> {
        let top = row_idx as f32 * row_height;
        let bottom = top + row_height;
        if top < self.scroll_top {
            Some(top)
        } else if bottom > self.scroll_top + client_height {
            Some((bottom - client_height).max(0.0))
        } else {
            None
        }
    }
}
