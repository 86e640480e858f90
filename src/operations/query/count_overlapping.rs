use crate::geometry::Aabb2;
use crate::index::SpatialIndex;
use crate::math::Tolerance;

/// Counts the cells of another layer that overlap a bounding box.
///
/// The box is shrunk by the tolerance on every side first, so cells that
/// only touch its border are not counted.
pub struct CountOverlapping {
    bounds: Aabb2,
    tolerance: Tolerance,
}

impl CountOverlapping {
    /// Creates a new `CountOverlapping` query.
    #[must_use]
    pub fn new(bounds: Aabb2) -> Self {
        Self {
            bounds,
            tolerance: Tolerance::default(),
        }
    }

    /// Sets the shrink margin.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the query against the index of the other layer.
    #[must_use]
    pub fn execute<I: SpatialIndex>(&self, index: &I) -> usize {
        index
            .query(&self.bounds.shrunk(self.tolerance.value()))
            .len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::index::RTreeIndex;
    use crate::operations::creation::MakeGrid;
    use crate::topology::GridLayer;

    #[test]
    fn counts_covered_cells_only() {
        let mut fine = GridLayer::new();
        MakeGrid::new(Rect::from_bounds(0.0, 0.0, 4.0, 4.0).unwrap(), 4, 4)
            .execute(&mut fine)
            .unwrap();
        let index = RTreeIndex::from_store(&fine);

        let block = Rect::from_bounds(1.0, 1.0, 3.0, 3.0).unwrap().bounds();
        assert_eq!(CountOverlapping::new(block).execute(&index), 4);

        let whole = Rect::from_bounds(0.0, 0.0, 4.0, 4.0).unwrap().bounds();
        assert_eq!(CountOverlapping::new(whole).execute(&index), 16);
    }

    #[test]
    fn touching_only_is_zero() {
        let mut layer = GridLayer::new();
        MakeGrid::new(Rect::from_bounds(0.0, 0.0, 1.0, 1.0).unwrap(), 1, 1)
            .execute(&mut layer)
            .unwrap();
        let index = RTreeIndex::from_store(&layer);
        let beside = Rect::from_bounds(1.0, 0.0, 2.0, 1.0).unwrap().bounds();
        assert_eq!(CountOverlapping::new(beside).execute(&index), 0);
    }
}
