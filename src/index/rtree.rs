use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::geometry::Aabb2;
use crate::topology::CellId;

use super::SpatialIndex;

type IndexedCell = GeomWithData<Rectangle<[f64; 2]>, CellId>;

/// R-tree backed [`SpatialIndex`], bulk loaded from a cell snapshot.
#[derive(Debug)]
pub struct RTreeIndex {
    tree: RTree<IndexedCell>,
}

impl SpatialIndex for RTreeIndex {
    fn build<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (CellId, Aabb2)>,
    {
        let entries = cells
            .into_iter()
            .map(|(id, bounds)| {
                let rect = Rectangle::from_corners(
                    [bounds.min.x, bounds.min.y],
                    [bounds.max.x, bounds.max.y],
                );
                GeomWithData::new(rect, id)
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    fn query(&self, bbox: &Aabb2) -> Vec<CellId> {
        let envelope = AABB::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect()
    }
}

impl RTreeIndex {
    /// Number of indexed cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::math::Point2;
    use crate::topology::{CellData, GridLayer};

    fn layer_3x3() -> (GridLayer, Vec<CellId>) {
        let mut layer = GridLayer::new();
        let mut ids = Vec::new();
        for row in 0..3_i32 {
            for col in 0..3_i32 {
                let (x, y) = (f64::from(col), f64::from(row));
                let rect = Rect::from_bounds(x, y, x + 1.0, y + 1.0).unwrap();
                ids.push(layer.add_cell(CellData::new(rect)));
            }
        }
        (layer, ids)
    }

    #[test]
    fn touching_cells_are_candidates() {
        let (layer, ids) = layer_3x3();
        let index = RTreeIndex::from_store(&layer);
        assert_eq!(index.len(), 9);

        // The center cell touches every other cell of the 3x3 block.
        let center = Aabb2::new(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0));
        let mut found = index.query(&center);
        found.sort();
        let mut all = ids.clone();
        all.sort();
        assert_eq!(found, all);
    }

    #[test]
    fn shrunk_query_only_hits_interior() {
        let (layer, ids) = layer_3x3();
        let index = RTreeIndex::from_store(&layer);
        let center = Aabb2::new(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)).shrunk(1e-6);
        assert_eq!(index.query(&center), vec![ids[4]]);
    }

    #[test]
    fn empty_index() {
        let index = RTreeIndex::build(std::iter::empty());
        assert!(index.is_empty());
        let anywhere = Aabb2::new(Point2::new(-1.0, -1.0), Point2::new(1.0, 1.0));
        assert!(index.query(&anywhere).is_empty());
    }
}
