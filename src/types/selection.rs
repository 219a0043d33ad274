use serde::{Deserialize, Serialize};

/// A cell address in the flattened row sequence.
///
/// `idx == -1` selects a whole row (only valid on group rows) and
/// `row_idx == -1` means nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub idx: isize,
    pub row_idx: isize,
}

impl Position {
    /// The initial "nothing selected" position.
    pub const NONE: Self = Self {
        idx: -1,
        row_idx: -1,
    };

    pub const fn new(idx: isize, row_idx: isize) -> Self {
        Self { idx, row_idx }
    }

    /// Column index when a concrete column is selected.
    pub fn col(self) -> Option<usize> {
        usize::try_from(self.idx).ok()
    }

    /// Row index when a row is selected.
    pub fn row(self) -> Option<usize> {
        usize::try_from(self.row_idx).ok()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::NONE
    }
}

/// An open editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState<R> {
    pub position: Position,
    /// Key that opened the editor, when it was opened by typing.
    pub key: Option<String>,
    /// Row as currently edited.
    pub row: R,
    /// Row as it was when the editor opened.
    pub original_row: R,
}

impl<R: PartialEq> EditState<R> {
    /// Whether the edited row differs from the pristine copy.
    pub fn is_dirty(&self) -> bool {
        self.row != self.original_row
    }
}

/// The single selection state of a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState<R> {
    Select(Position),
    Edit(EditState<R>),
}

impl<R> SelectionState<R> {
    pub fn position(&self) -> Position {
        match self {
            Self::Select(pos) => *pos,
            Self::Edit(edit) => edit.position,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Edit(_))
    }

    pub fn edit_state(&self) -> Option<&EditState<R>> {
        match self {
            Self::Select(_) => None,
            Self::Edit(edit) => Some(edit),
        }
    }
}

impl<R> Default for SelectionState<R> {
    fn default() -> Self {
        Self::Select(Position::NONE)
    }
}
