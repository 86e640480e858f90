pub mod aabb;
pub mod adjacency;
pub mod rect;

pub use aabb::Aabb2;
pub use adjacency::{classify_adjacency, Adjacency, CornerTouch, Side};
pub use rect::{Rect, RectSize, MAX_SUBDIVISION_CELLS};
