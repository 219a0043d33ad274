use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CellValue;

/// A caller-owned record the grid can read and write cells on.
///
/// The grid never mutates rows in place. Every mutation clones the row,
/// writes through [`GridRow::set_cell`] and hands the new row array back to
/// the caller. `PartialEq` is the dirty check for edits and the identity check
/// for rows replaced underneath an open editor.
pub trait GridRow: Clone + PartialEq {
    /// Cell stored under `key`, if any.
    fn cell(&self, key: &str) -> Option<&CellValue>;

    /// Replace the cell stored under `key`.
    fn set_cell(&mut self, key: &str, value: CellValue);

    /// Display text of the cell under `key`, empty when missing.
    fn cell_text(&self, key: &str) -> &str {
        self.cell(key).map_or("", CellValue::text)
    }

    /// Whether the cell under `key` is disabled.
    fn is_cell_disabled(&self, key: &str) -> bool {
        self.cell(key).is_some_and(CellValue::is_disabled)
    }
}

/// Map-backed row used by the JavaScript facade and by tests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

impl GridRow for Record {
    fn cell(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }

    fn set_cell(&mut self, key: &str, value: CellValue) {
        self.cells.insert(key.to_string(), value);
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
