mod rtree;

pub use rtree::RTreeIndex;

use crate::geometry::Aabb2;
use crate::topology::{CellId, FeatureStore};

/// Bounding-box index over the cells of one layer.
///
/// Indexes are built from a snapshot and never updated in place: callers
/// rebuild them after every batch of splits.
pub trait SpatialIndex: Sized {
    /// Builds an index over `(id, bounds)` pairs.
    fn build<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (CellId, Aabb2)>;

    /// Returns the ids of all cells whose bounds intersect `bbox`.
    ///
    /// May return false positives, never false negatives.
    fn query(&self, bbox: &Aabb2) -> Vec<CellId>;

    /// Builds an index over every cell of a store.
    fn from_store<S: FeatureStore + ?Sized>(store: &S) -> Self {
        Self::build(
            store
                .all_cells()
                .into_iter()
                .map(|(id, data)| (id, data.rect.bounds())),
        )
    }
}
