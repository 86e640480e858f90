use crate::error::Result;
use crate::geometry::{classify_adjacency, Adjacency};
use crate::index::SpatialIndex;
use crate::math::Tolerance;
use crate::topology::{CellId, FeatureStore};

/// A candidate neighbor and where it lies relative to the queried cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// The neighbor cell.
    pub id: CellId,
    /// Position of the neighbor as seen from the queried cell.
    pub adjacency: Adjacency,
}

/// Finds the cells whose bounding box touches a cell and classifies each one.
///
/// Every candidate is reported, including the cell itself (`Overlap`),
/// corner touches and detached cells; callers filter on
/// [`Adjacency::side`] to keep edge neighbors.
pub struct FindNeighbors {
    cell: CellId,
    tolerance: Tolerance,
}

impl FindNeighbors {
    /// Creates a new `FindNeighbors` query.
    #[must_use]
    pub fn new(cell: CellId) -> Self {
        Self {
            cell,
            tolerance: Tolerance::default(),
        }
    }

    /// Sets the comparison tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the query against `index`, which must cover the current store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CellNotFound` if the cell or an indexed candidate is
    /// missing from the store (a stale index).
    pub fn execute<S, I>(&self, store: &S, index: &I) -> Result<Vec<Neighbor>>
    where
        S: FeatureStore + ?Sized,
        I: SpatialIndex,
    {
        let rect = store.cell(self.cell)?.rect;
        let bounds = rect.bounds();
        // Grow the query by the tolerance so rounding noise on a shared grid
        // line cannot hide a neighbor.
        let scale = [bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y]
            .iter()
            .fold(1.0_f64, |acc, v| acc.max(v.abs()));
        let query = bounds.expanded(self.tolerance.value() * scale);

        index
            .query(&query)
            .into_iter()
            .map(|id| {
                let other = store.cell(id)?.rect;
                Ok(Neighbor {
                    id,
                    adjacency: classify_adjacency(&rect, &other, self.tolerance),
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{CornerTouch, Rect, Side};
    use crate::index::RTreeIndex;
    use crate::operations::creation::MakeGrid;
    use crate::topology::GridLayer;

    #[test]
    fn center_of_3x3_sees_all_eight_positions() {
        let mut layer = GridLayer::new();
        let ids = MakeGrid::new(Rect::from_bounds(0.0, 0.0, 3.0, 3.0).unwrap(), 3, 3)
            .execute(&mut layer)
            .unwrap();
        let index = RTreeIndex::from_store(&layer);
        let neighbors = FindNeighbors::new(ids[4]).execute(&layer, &index).unwrap();
        assert_eq!(neighbors.len(), 9);

        let at = |id: CellId| {
            neighbors
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.adjacency)
                .unwrap()
        };
        assert_eq!(at(ids[4]), Adjacency::Overlap);
        assert_eq!(at(ids[1]), Adjacency::Edge(Side::Above));
        assert_eq!(at(ids[5]), Adjacency::Edge(Side::Right));
        assert_eq!(at(ids[7]), Adjacency::Edge(Side::Below));
        assert_eq!(at(ids[3]), Adjacency::Edge(Side::Left));
        assert_eq!(at(ids[2]), Adjacency::Corner(CornerTouch::TopRight));
        assert_eq!(at(ids[8]), Adjacency::Corner(CornerTouch::BottomRight));
        assert_eq!(at(ids[6]), Adjacency::Corner(CornerTouch::BottomLeft));
        assert_eq!(at(ids[0]), Adjacency::Corner(CornerTouch::TopLeft));
    }

    #[test]
    fn edge_neighbors_of_corner_cell() {
        let mut layer = GridLayer::new();
        let ids = MakeGrid::new(Rect::from_bounds(0.0, 0.0, 2.0, 2.0).unwrap(), 2, 2)
            .execute(&mut layer)
            .unwrap();
        let index = RTreeIndex::from_store(&layer);
        let edges: Vec<CellId> = FindNeighbors::new(ids[0])
            .execute(&layer, &index)
            .unwrap()
            .into_iter()
            .filter(|n| n.adjacency.side().is_some())
            .map(|n| n.id)
            .collect();
        assert_eq!(edges.len(), 2);
        assert!(edges.contains(&ids[1]));
        assert!(edges.contains(&ids[2]));
    }
}
