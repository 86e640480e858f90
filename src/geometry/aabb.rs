use crate::math::Point2;

/// An axis-aligned bounding box in the grid plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner (lower-left).
    pub min: Point2,
    /// Maximum corner (upper-right).
    pub max: Point2,
}

impl Aabb2 {
    /// Creates a bounding box from its lower-left and upper-right corners.
    #[must_use]
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Width along x.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height along y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns `true` if the two boxes share at least one point (touching counts).
    #[must_use]
    pub fn intersects(&self, other: &Aabb2) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Returns this box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Returns this box reduced by `margin` on every side.
    ///
    /// Used to exclude cells that merely touch the box from overlap queries.
    #[must_use]
    pub fn shrunk(&self, margin: f64) -> Self {
        self.expanded(-margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x0: f64, y0: f64, x1: f64, y1: f64) -> Aabb2 {
        Aabb2::new(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = bbox(0.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&bbox(1.0, 0.0, 2.0, 1.0)));
        assert!(a.intersects(&bbox(1.0, 1.0, 2.0, 2.0)));
        assert!(!a.intersects(&bbox(1.5, 0.0, 2.0, 1.0)));
    }

    #[test]
    fn shrunk_box_no_longer_touches() {
        let a = bbox(0.0, 0.0, 1.0, 1.0).shrunk(1e-6);
        assert!(!a.intersects(&bbox(1.0, 0.0, 2.0, 1.0)));
        assert!(a.intersects(&bbox(0.5, 0.5, 2.0, 2.0)));
    }

    #[test]
    fn expanded_dimensions() {
        let a = bbox(0.0, 0.0, 2.0, 1.0).expanded(0.5);
        assert!((a.width() - 3.0).abs() < 1e-12);
        assert!((a.height() - 2.0).abs() < 1e-12);
    }
}
