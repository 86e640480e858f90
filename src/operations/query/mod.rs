mod count_overlapping;
mod find_neighbors;
mod grid_shape;

pub use count_overlapping::CountOverlapping;
pub use find_neighbors::{FindNeighbors, Neighbor};
pub use grid_shape::{GridShape, RegularGridShape};
