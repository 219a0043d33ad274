//! Rendering boundary and paint pass.
//!
//! This module provides:
//! - The backend-agnostic [`RenderSurface`] trait and draw content types
//! - Formatter and editor traits supplied per column
//! - [`paint`], which walks the visible window of a [`GridController`](crate::GridController)
//! - A Canvas 2D surface (wasm32 only)

pub mod backend;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
mod paint;

pub use backend::{
    default_group_label, CellDecorations, CellEditor, CellFormatter, DrawContent, GroupFormatter,
    Rect, RenderSurface, SummaryFormatter, TextEditor,
};
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use paint::{fill_handle_rect, paint};
