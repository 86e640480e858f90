use crate::error::{OperationError, Result};
use crate::index::{RTreeIndex, SpatialIndex};
use crate::math::Tolerance;
use crate::operations::modification::SplitCells;
use crate::operations::query::FindNeighbors;
use crate::progress::{NoProgress, ProgressSink, ProgressTicker};
use crate::topology::{CellId, FeatureStore};

use super::{repeat_until_stable, FixSet, PassOutcome, RefineParams, SplitFactors, TopologyRule};

/// Checks the boundaries of one cell against its edge neighbors.
///
/// Each boundary is checked both ways. A neighbor that is too large for the
/// cell is flagged, and so is the cell when it is too large for the neighbor.
pub struct CheckTopology {
    cell: CellId,
    factors: SplitFactors,
    rule: TopologyRule,
    tolerance: Tolerance,
}

impl CheckTopology {
    /// Creates a new `CheckTopology` query.
    ///
    /// `nrows` and `ncols` are the factors of the refinement that produced the
    /// cell; fixes derive their own factors from them.
    #[must_use]
    pub fn new(cell: CellId, nrows: usize, ncols: usize, rule: TopologyRule) -> Self {
        Self {
            cell,
            factors: SplitFactors::new(nrows, ncols),
            rule,
            tolerance: Tolerance::default(),
        }
    }

    /// Sets the comparison tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the check against `index`, which must cover the current store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CellNotFound` if the cell or an indexed neighbor is
    /// missing from the store.
    pub fn execute<S, I>(&self, store: &S, index: &I) -> Result<FixSet>
    where
        S: FeatureStore + ?Sized,
        I: SpatialIndex,
    {
        let mut fixes = FixSet::new();
        let rect = store.cell(self.cell)?.rect;
        let neighbors = FindNeighbors::new(self.cell)
            .with_tolerance(self.tolerance)
            .execute(store, index)?;

        for neighbor in neighbors {
            let Some(side) = neighbor.adjacency.side() else {
                continue;
            };
            let other = store.cell(neighbor.id)?.rect;
            let factors =
                self.rule
                    .resolve_split_factors(side, self.factors.nrows, self.factors.ncols);
            if !self.rule.is_valid_boundary(&rect, &other, side, self.tolerance) {
                fixes.request(neighbor.id, factors);
            }
            if !self
                .rule
                .is_valid_boundary(&other, &rect, side.opposite(), self.tolerance)
            {
                fixes.request(self.cell, factors);
            }
        }
        Ok(fixes)
    }
}

/// Terminal state of a refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStatus {
    /// No cell violates the rule.
    Converged,
    /// The progress sink asked to stop. The grid is valid geometry but may
    /// still violate the rule.
    Aborted,
}

/// Summary of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefineReport {
    /// Number of split-and-check passes.
    pub iterations: usize,
    /// Number of cells that were replaced by sub-grids.
    pub cells_split: usize,
    /// How the run ended.
    pub status: RefineStatus,
}

impl RefineReport {
    fn nothing_to_do() -> Self {
        Self {
            iterations: 0,
            cells_split: 0,
            status: RefineStatus::Converged,
        }
    }
}

/// Splits seed cells and cascades fixes until the topology rule holds.
///
/// Each pass splits every pending cell, rebuilds the spatial index over the
/// whole layer, then checks the cells just created. The flagged neighbors
/// become the next pass's work. Nothing is rolled back on failure: every
/// completed pass leaves a consistent partition of the starting extent.
///
/// # Example
///
/// ```
/// use rectgrid::geometry::Rect;
/// use rectgrid::operations::creation::MakeGrid;
/// use rectgrid::refinement::{RefineBySplit, RefineStatus, TopologyRule};
/// use rectgrid::topology::GridLayer;
///
/// let mut layer = GridLayer::new();
/// let extent = Rect::from_bounds(0.0, 0.0, 4.0, 4.0)?;
/// let ids = MakeGrid::new(extent, 4, 4).execute(&mut layer)?;
///
/// let report = RefineBySplit::new(vec![ids[5]], 2, 2, TopologyRule::modflow())
///     .execute(&mut layer)?;
/// assert_eq!(report.status, RefineStatus::Converged);
/// assert_eq!(layer.len(), 25);
/// # Ok::<(), rectgrid::GridError>(())
/// ```
pub struct RefineBySplit {
    seeds: Vec<CellId>,
    factors: SplitFactors,
    rule: TopologyRule,
    params: RefineParams,
}

impl RefineBySplit {
    /// Creates a new `RefineBySplit` operation splitting each seed
    /// `nrows` × `ncols`.
    #[must_use]
    pub fn new(seeds: Vec<CellId>, nrows: usize, ncols: usize, rule: TopologyRule) -> Self {
        Self {
            seeds,
            factors: SplitFactors::new(nrows, ncols),
            rule,
            params: RefineParams::default(),
        }
    }

    /// Sets the tolerance and iteration cap.
    #[must_use]
    pub fn with_params(mut self, params: RefineParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the refinement with an R-tree index and no progress reporting.
    ///
    /// # Errors
    ///
    /// See [`execute_with`](Self::execute_with).
    pub fn execute<S: FeatureStore + ?Sized>(&self, store: &mut S) -> Result<RefineReport> {
        self.execute_with::<RTreeIndex, S>(store, &mut NoProgress)
    }

    /// Executes the refinement with the given index type and progress sink.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for a zero split factor and
    /// `StoreError::CellNotFound` for an unknown seed, both before the store is
    /// touched. Returns `OperationError::RefinementDiverged` if fixes are still
    /// pending after `max_iterations` passes, and propagates store write
    /// failures.
    pub fn execute_with<I, S>(
        &self,
        store: &mut S,
        progress: &mut dyn ProgressSink,
    ) -> Result<RefineReport>
    where
        I: SpatialIndex,
        S: FeatureStore + ?Sized,
    {
        if self.seeds.is_empty() {
            return Ok(RefineReport::nothing_to_do());
        }
        let SplitFactors { nrows, ncols } = self.factors;
        if nrows == 0 || ncols == 0 {
            return Err(OperationError::InvalidInput(format!(
                "cannot refine cells into {nrows} x {ncols} parts"
            ))
            .into());
        }
        for &seed in &self.seeds {
            store.cell(seed)?;
        }

        let tol = self.params.tolerance;
        let mut fixes = FixSet::from_seeds(&self.seeds, self.factors);
        let mut cells_split = 0;

        let convergence = repeat_until_stable(
            "refine_by_split",
            self.params.max_iterations,
            progress,
            |_, progress| {
                let new_cells = SplitCells::from_fix_set(&fixes).execute(store)?;
                cells_split += fixes.len();
                let index = I::from_store(&*store);

                let mut next = FixSet::new();
                let mut ticker = ProgressTicker::new(new_cells.len(), progress);
                for &cell in &new_cells {
                    next.merge(
                        CheckTopology::new(cell, nrows, ncols, self.rule)
                            .with_tolerance(tol)
                            .execute(&*store, &index)?,
                    );
                    if !ticker.tick(progress) {
                        return Ok(PassOutcome::Aborted);
                    }
                }
                ticker.finish(progress);

                fixes = next;
                Ok(if fixes.is_empty() {
                    PassOutcome::Stable
                } else {
                    PassOutcome::Continue {
                        pending: fixes.len(),
                    }
                })
            },
        )?;

        Ok(RefineReport {
            iterations: convergence.iterations,
            cells_split,
            status: if convergence.aborted {
                RefineStatus::Aborted
            } else {
                RefineStatus::Converged
            },
        })
    }
}
