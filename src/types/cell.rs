use serde::{Deserialize, Serialize};

/// A single cell value.
///
/// Plain cells carry only text. Rich cells add per-cell flags that drive
/// presentation and block editing, pasting and copying for disabled cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Plain(String),
    Rich(RichCell),
}

/// Cell object with presentation flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichCell {
    pub value: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub alert: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub warning: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl CellValue {
    /// Effective display text.
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(s) => s,
            Self::Rich(cell) => &cell.value,
        }
    }

    /// Effective disabled-ness. Plain cells are never disabled.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Rich(cell) if cell.disabled)
    }

    pub fn has_error(&self) -> bool {
        matches!(self, Self::Rich(cell) if cell.error)
    }

    pub fn has_alert(&self) -> bool {
        matches!(self, Self::Rich(cell) if cell.alert)
    }

    pub fn has_warning(&self) -> bool {
        matches!(self, Self::Rich(cell) if cell.warning)
    }

    /// Same cell with new text. Flags on rich cells are kept.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        match self {
            Self::Plain(_) => Self::Plain(text.into()),
            Self::Rich(cell) => Self::Rich(RichCell {
                value: text.into(),
                ..cell.clone()
            }),
        }
    }

    /// A rich cell that refuses edits.
    pub fn disabled(text: impl Into<String>) -> Self {
        Self::Rich(RichCell {
            value: text.into(),
            disabled: true,
            ..RichCell::default()
        })
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Plain(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Plain(s)
    }
}

impl From<RichCell> for CellValue {
    fn from(cell: RichCell) -> Self {
        Self::Rich(cell)
    }
}
