use super::{Point2, Vector2};

/// Default relative tolerance for floating-point comparisons on grid coordinates.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Relative tolerance used by every floating-point comparison of the refinement engine.
///
/// A single value is threaded through geometry, adjacency classification,
/// boundary checks and overlap counting so that they all agree on what
/// "equal" means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance(f64);

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

impl Tolerance {
    /// Creates a tolerance with the given relative error.
    #[must_use]
    pub fn new(relative_error: f64) -> Self {
        Self(relative_error.abs())
    }

    /// Returns the raw tolerance value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` if `a` and `b` are equal within the relative tolerance.
    ///
    /// Values whose magnitudes are both below the tolerance compare equal.
    #[must_use]
    pub fn nearly_equal(self, a: f64, b: f64) -> bool {
        let norm = a.abs().max(b.abs());
        norm < self.0 || (a - b).abs() < self.0 * norm
    }

    /// Returns `true` if `a` is smaller than `b` or nearly equal to it.
    #[must_use]
    pub fn less_or_equal(self, a: f64, b: f64) -> bool {
        a < b || self.nearly_equal(a, b)
    }

    /// Returns `true` if both coordinates of `p` and `q` are nearly equal.
    #[must_use]
    pub fn points_coincide(self, p: &Point2, q: &Point2) -> bool {
        self.nearly_equal(p.x, q.x) && self.nearly_equal(p.y, q.y)
    }

    /// Returns `true` if `v1` and `v2` are colinear (null cross product).
    ///
    /// A zero vector is colinear with every vector.
    #[must_use]
    pub fn colinear(self, v1: &Vector2, v2: &Vector2) -> bool {
        self.nearly_equal(v1.y * v2.x - v1.x * v2.y, 0.0)
    }
}
