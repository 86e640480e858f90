use std::collections::BTreeSet;

use crate::error::{OperationError, Result};
use crate::refinement::{FixSet, SplitFactors};
use crate::topology::{CellData, CellId, FeatureStore};

/// Splits one cell into a regular `nrows` × `ncols` sub-grid.
pub struct SplitCell {
    cell: CellId,
    factors: SplitFactors,
}

impl SplitCell {
    /// Creates a new `SplitCell` operation.
    #[must_use]
    pub fn new(cell: CellId, nrows: usize, ncols: usize) -> Self {
        Self {
            cell,
            factors: SplitFactors::new(nrows, ncols),
        }
    }

    /// Executes the split, returning the new cell ids row-major, top row first.
    ///
    /// # Errors
    ///
    /// See [`SplitCells::execute`].
    pub fn execute<S: FeatureStore + ?Sized>(&self, store: &mut S) -> Result<Vec<CellId>> {
        SplitCells::new(vec![(self.cell, self.factors)]).execute(store)
    }
}

/// Splits a batch of cells, each with its own factors.
///
/// Every sub-cell inherits its parent's attributes. All parents are removed
/// from the store before any sub-cell is added.
pub struct SplitCells {
    requests: Vec<(CellId, SplitFactors)>,
}

impl SplitCells {
    /// Creates a batch split from explicit requests.
    #[must_use]
    pub fn new(requests: Vec<(CellId, SplitFactors)>) -> Self {
        Self { requests }
    }

    /// Creates a batch split from pending fix requests, in fix-set order.
    #[must_use]
    pub fn from_fix_set(fixes: &FixSet) -> Self {
        Self::new(fixes.iter().collect())
    }

    /// Executes the batch.
    ///
    /// Returns the new cell ids grouped by request, each group row-major with
    /// the top row first.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for a zero factor or a cell
    /// requested twice, and `StoreError::CellNotFound` for an unknown cell. These
    /// are detected before the store is touched. Store write failures are
    /// propagated as-is.
    pub fn execute<S: FeatureStore + ?Sized>(&self, store: &mut S) -> Result<Vec<CellId>> {
        let mut seen = BTreeSet::new();
        let mut parents = Vec::with_capacity(self.requests.len());
        let mut sub_cells = Vec::new();
        for &(cell, factors) in &self.requests {
            if !seen.insert(cell) {
                return Err(OperationError::InvalidInput(format!(
                    "cell {cell:?} requested twice in one split batch"
                ))
                .into());
            }
            let parent = store.cell(cell)?;
            let rects = parent.rect.subdivide(factors.nrows, factors.ncols)?;
            sub_cells.extend(
                rects
                    .into_iter()
                    .map(|rect| CellData::with_attributes(rect, parent.attributes.clone())),
            );
            parents.push(cell);
        }
        if parents.is_empty() {
            return Ok(Vec::new());
        }

        store.delete_cells(&parents)?;
        Ok(store.add_cells(sub_cells)?)
    }
}
