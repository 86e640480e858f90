use std::collections::btree_map::{self, BTreeMap};

use crate::topology::CellId;

/// Number of rows and columns a cell is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitFactors {
    /// Rows (`n`).
    pub nrows: usize,
    /// Columns (`m`).
    pub ncols: usize,
}

impl SplitFactors {
    /// Creates split factors for `nrows` × `ncols` sub-cells.
    #[must_use]
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols }
    }

    /// Element-wise maximum of two requests.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            nrows: self.nrows.max(other.nrows),
            ncols: self.ncols.max(other.ncols),
        }
    }

    /// Number of sub-cells produced.
    #[must_use]
    pub fn cell_count(self) -> usize {
        self.nrows * self.ncols
    }
}

/// Pending split requests, at most one per cell.
///
/// Requests for a cell that is already present are merged by taking the
/// element-wise maximum, so a cell asked to split 2×1 by one neighbor and
/// 1×2 by another ends up split 2×2. Iteration follows cell id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixSet {
    requests: BTreeMap<CellId, SplitFactors>,
}

impl FixSet {
    /// Creates an empty fix set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fix set requesting the same split for every seed cell.
    #[must_use]
    pub fn from_seeds(seeds: &[CellId], factors: SplitFactors) -> Self {
        let mut set = Self::new();
        for &id in seeds {
            set.request(id, factors);
        }
        set
    }

    /// Adds a request, merging it with any existing request for the same cell.
    pub fn request(&mut self, cell: CellId, factors: SplitFactors) {
        self.requests
            .entry(cell)
            .and_modify(|existing| *existing = existing.max(factors))
            .or_insert(factors);
    }

    /// Merges every request of `other` into this set.
    pub fn merge(&mut self, other: FixSet) {
        for (cell, factors) in other {
            self.request(cell, factors);
        }
    }

    /// Returns the request for `cell`, if any.
    #[must_use]
    pub fn get(&self, cell: CellId) -> Option<SplitFactors> {
        self.requests.get(&cell).copied()
    }

    /// Number of cells with a pending request.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` if no request is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Iterates over `(cell, factors)` in cell id order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, SplitFactors)> + '_ {
        self.requests.iter().map(|(&cell, &factors)| (cell, factors))
    }

    /// Ids of the cells with a pending request.
    #[must_use]
    pub fn cells(&self) -> Vec<CellId> {
        self.requests.keys().copied().collect()
    }
}

impl IntoIterator for FixSet {
    type Item = (CellId, SplitFactors);
    type IntoIter = btree_map::IntoIter<CellId, SplitFactors>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<CellId> {
        let mut map: SlotMap<CellId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn merge_takes_elementwise_max() {
        let id = ids(1)[0];
        let mut set = FixSet::new();
        set.request(id, SplitFactors::new(2, 1));
        set.request(id, SplitFactors::new(1, 2));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(id), Some(SplitFactors::new(2, 2)));
    }

    #[test]
    fn merge_is_idempotent_and_commutative() {
        let id = ids(1)[0];
        let mut a = FixSet::new();
        a.request(id, SplitFactors::new(2, 2));
        a.request(id, SplitFactors::new(1, 1));

        let mut b = FixSet::new();
        b.request(id, SplitFactors::new(1, 1));
        b.request(id, SplitFactors::new(2, 2));

        assert_eq!(a, b);
        assert_eq!(a.get(id), Some(SplitFactors::new(2, 2)));

        let snapshot = a.clone();
        a.merge(snapshot.clone());
        assert_eq!(a, snapshot);
    }

    #[test]
    fn merge_sets_keeps_one_request_per_cell() {
        let cells = ids(3);
        let mut left = FixSet::new();
        left.request(cells[0], SplitFactors::new(3, 1));
        left.request(cells[1], SplitFactors::new(1, 1));

        let mut right = FixSet::new();
        right.request(cells[1], SplitFactors::new(1, 4));
        right.request(cells[2], SplitFactors::new(2, 2));

        left.merge(right);
        assert_eq!(left.len(), 3);
        assert_eq!(left.get(cells[1]), Some(SplitFactors::new(1, 4)));
        assert_eq!(left.cells(), cells);
    }

    #[test]
    fn seeds_are_deduplicated() {
        let cells = ids(2);
        let set = FixSet::from_seeds(&[cells[0], cells[1], cells[0]], SplitFactors::new(2, 3));
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|(_, f)| f == SplitFactors::new(2, 3)));
        assert_eq!(SplitFactors::new(2, 3).cell_count(), 6);
    }
}
