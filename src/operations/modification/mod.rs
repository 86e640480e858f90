mod number_cells;
mod split_cells;

pub use number_cells::{NumberCells, COL_FIELD, CX_FIELD, CY_FIELD, ROW_FIELD};
pub use split_cells::{SplitCell, SplitCells};
