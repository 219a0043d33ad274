//! Structured error types for vgrid.
//!
//! Only integration mistakes surface as errors. Out-of-bounds navigation and
//! malformed paste input are handled as silent no-ops by the controllers.

/// All errors that can occur while driving the grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A feature that needs stable row identity was used without a key getter.
    #[error("a row key getter is required to use {feature}")]
    MissingRowKeyGetter {
        /// The feature that asked for row keys.
        feature: &'static str,
    },

    /// Grouping was requested but no row grouper was supplied.
    #[error("group_by is set but no row grouper was supplied")]
    MissingRowGrouper,

    /// A column key did not match any declared column.
    #[error("unknown column: {0}")]
    ColumnNotFound(String),

    /// A width declaration could not be parsed.
    #[error("invalid column width: {0}")]
    InvalidColumnWidth(String),

    /// A caller-supplied formatter or editor failed for one cell.
    #[error("formatter for column {column} failed: {message}")]
    Formatter {
        /// Key of the column whose formatter failed.
        column: String,
        /// Message reported by the formatter.
        message: String,
    },

    /// A browser API call failed (canvas context, DOM lookup).
    #[error("dom: {0}")]
    Dom(String),

    /// JSON / JS value conversion error in the facade.
    #[error("serialization: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
