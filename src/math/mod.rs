pub mod tolerance;

pub use tolerance::{Tolerance, DEFAULT_TOLERANCE};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Returns the vector from `from` to `to`.
#[must_use]
pub fn vector_between(from: &Point2, to: &Point2) -> Vector2 {
    to - from
}
