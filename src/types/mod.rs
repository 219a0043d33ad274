//! Data types shared by the grid controllers.

mod cell;
mod column;
mod events;
mod row;
mod selection;

pub use cell::*;
pub use column::*;
pub use events::*;
pub use row::*;
pub use selection::*;
