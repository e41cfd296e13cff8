pub mod escape;
pub mod row;

pub use row::{Cell, CellClass, CellContent, HEADERS, RenderedRow, render_row};
