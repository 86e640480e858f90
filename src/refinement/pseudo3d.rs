//! Overlap correction across the layers of a pseudo-3D grid.
//!
//! Each layer of a pseudo-3D grid is refined on its own. A cell may then sit
//! under or over many finer cells of the closest layer, which breaks
//! multilayer models. The corrector splits such cells until no cell overlaps
//! more than `pmax` cells of its nearest non-empty layer, above or below.

use crate::error::{OperationError, Result};
use crate::geometry::Aabb2;
use crate::index::{RTreeIndex, SpatialIndex};
use crate::operations::query::CountOverlapping;
use crate::progress::{NoProgress, ProgressSink, ProgressTicker};
use crate::topology::{CellId, FeatureStore};

use super::{
    repeat_until_stable, PassOutcome, RefineBySplit, RefineParams, RefineStatus, TopologyRule,
};

/// Largest number of overlapped cells allowed by default.
pub const DEFAULT_PMAX: usize = 4;

/// One layer of a pseudo-3D grid and the rule that governs its own refinement.
#[derive(Debug, Clone)]
pub struct PseudoLayer<S> {
    /// Cells of the layer.
    pub store: S,
    /// Rule applied when cells of this layer are split.
    pub rule: TopologyRule,
}

impl<S: FeatureStore> PseudoLayer<S> {
    /// Creates a new layer.
    #[must_use]
    pub fn new(store: S, rule: TopologyRule) -> Self {
        Self { store, rule }
    }
}

/// Summary of a pseudo-3D correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionReport {
    /// Number of sweeps over all layers.
    pub sweeps: usize,
    /// Number of cells flagged for splitting, over all sweeps.
    pub cells_flagged: usize,
    /// How the run ended.
    pub status: RefineStatus,
}

/// Splits cells that overlap too many cells of an adjacent layer.
///
/// A sweep visits the layers top to bottom. For each layer, all spatial
/// indexes are rebuilt, every cell is compared with the first layer below and
/// the first layer above in which it overlaps anything, and the cells that
/// overlap more than `pmax` cells there are refined 2×2 under the layer's
/// rule. Sweeps repeat until one flags nothing.
pub struct CorrectPseudo3d {
    pmax: usize,
    params: RefineParams,
}

impl Default for CorrectPseudo3d {
    fn default() -> Self {
        Self::new(DEFAULT_PMAX)
    }
}

impl CorrectPseudo3d {
    /// Creates a new `CorrectPseudo3d` operation.
    #[must_use]
    pub fn new(pmax: usize) -> Self {
        Self {
            pmax,
            params: RefineParams::default(),
        }
    }

    /// Sets the tolerance and sweep cap.
    #[must_use]
    pub fn with_params(mut self, params: RefineParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the correction with R-tree indexes and no progress reporting.
    ///
    /// # Errors
    ///
    /// See [`execute_with`](Self::execute_with).
    pub fn execute<S: FeatureStore>(
        &self,
        layers: &mut [PseudoLayer<S>],
    ) -> Result<CorrectionReport> {
        self.execute_with::<RTreeIndex, S>(layers, &mut NoProgress)
    }

    /// Executes the correction with the given index type and progress sink.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if `pmax` is zero,
    /// `OperationError::RefinementDiverged` if the sweep cap is reached while
    /// cells are still flagged, and any error of the per-layer refinement.
    pub fn execute_with<I, S>(
        &self,
        layers: &mut [PseudoLayer<S>],
        progress: &mut dyn ProgressSink,
    ) -> Result<CorrectionReport>
    where
        I: SpatialIndex,
        S: FeatureStore,
    {
        if self.pmax == 0 {
            return Err(OperationError::InvalidInput(
                "a cell must be allowed to overlap at least one cell".into(),
            )
            .into());
        }

        let mut cells_flagged = 0;
        let convergence = repeat_until_stable(
            "correct_pseudo3d",
            self.params.max_iterations,
            progress,
            |_, progress| {
                let mut sweep_fixes = 0;
                for layer in 0..layers.len() {
                    let indexes: Vec<I> = layers
                        .iter()
                        .map(|l| I::from_store(&l.store))
                        .collect();
                    let Some(flagged) = self.flag_layer(&*layers, &indexes, layer, progress)
                    else {
                        return Ok(PassOutcome::Aborted);
                    };
                    if flagged.is_empty() {
                        continue;
                    }
                    tracing::debug!(
                        layer,
                        flagged = flagged.len(),
                        "splitting overlapping cells"
                    );
                    sweep_fixes += flagged.len();

                    let target = &mut layers[layer];
                    let report = RefineBySplit::new(flagged, 2, 2, target.rule)
                        .with_params(self.params)
                        .execute_with::<I, S>(
                            &mut target.store,
                            &mut Nested(&mut *progress),
                        )?;
                    if report.status == RefineStatus::Aborted {
                        return Ok(PassOutcome::Aborted);
                    }
                }

                cells_flagged += sweep_fixes;
                Ok(if sweep_fixes == 0 {
                    PassOutcome::Stable
                } else {
                    PassOutcome::Continue {
                        pending: sweep_fixes,
                    }
                })
            },
        )?;

        Ok(CorrectionReport {
            sweeps: convergence.iterations,
            cells_flagged,
            status: if convergence.aborted {
                RefineStatus::Aborted
            } else {
                RefineStatus::Converged
            },
        })
    }

    /// Cells of `layer` that overlap more than `pmax` cells of a neighboring
    /// layer, or `None` on abort.
    fn flag_layer<I, S>(
        &self,
        layers: &[PseudoLayer<S>],
        indexes: &[I],
        layer: usize,
        progress: &mut dyn ProgressSink,
    ) -> Option<Vec<CellId>>
    where
        I: SpatialIndex,
        S: FeatureStore,
    {
        let cells: Vec<(CellId, Aabb2)> = layers[layer]
            .store
            .all_cells()
            .into_iter()
            .map(|(id, data)| (id, data.rect.bounds()))
            .collect();

        let mut flagged = Vec::new();
        let mut ticker = ProgressTicker::new(cells.len(), progress);
        for (id, bounds) in cells {
            let query = CountOverlapping::new(bounds).with_tolerance(self.params.tolerance);
            let below = nearest_overlap(&query, indexes, layer + 1..indexes.len());
            let above = nearest_overlap(&query, indexes, (0..layer).rev());
            if below > self.pmax || above > self.pmax {
                flagged.push(id);
            }
            if !ticker.tick(progress) {
                return None;
            }
        }
        ticker.finish(progress);
        Some(flagged)
    }
}

/// Overlap count in the first of `layers` where the cell overlaps anything.
fn nearest_overlap<I: SpatialIndex>(
    query: &CountOverlapping,
    indexes: &[I],
    layers: impl Iterator<Item = usize>,
) -> usize {
    layers
        .map(|k| query.execute(&indexes[k]))
        .find(|&count| count > 0)
        .unwrap_or(0)
}

/// Forwards progress and abort requests of a nested refinement, but not its
/// pass count.
struct Nested<'a>(&'a mut dyn ProgressSink);

impl ProgressSink for Nested<'_> {
    fn on_progress(&mut self, percent: u8) {
        self.0.on_progress(percent);
    }

    fn is_aborted(&self) -> bool {
        self.0.is_aborted()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::operations::creation::MakeGrid;
    use crate::topology::GridLayer;
    use crate::GridError;

    fn uniform(x0: f64, y0: f64, x1: f64, y1: f64, n: usize) -> PseudoLayer<GridLayer> {
        let mut layer = GridLayer::new();
        MakeGrid::new(Rect::from_bounds(x0, y0, x1, y1).unwrap(), n, n)
            .execute(&mut layer)
            .unwrap();
        PseudoLayer::new(layer, TopologyRule::modflow())
    }

    #[test]
    fn coarse_lower_layer_is_split() {
        let mut layers = vec![
            uniform(0.0, 0.0, 10.0, 10.0, 2),
            uniform(0.0, 0.0, 10.0, 10.0, 1),
        ];
        let report = CorrectPseudo3d::new(2).execute(&mut layers).unwrap();
        assert_eq!(report.status, RefineStatus::Converged);
        assert_eq!(report.sweeps, 2);
        assert_eq!(report.cells_flagged, 1);
        assert_eq!(layers[0].store.len(), 4);
        assert_eq!(layers[1].store.len(), 4);
    }

    #[test]
    fn compatible_layers_need_one_sweep() {
        let mut layers = vec![
            uniform(0.0, 0.0, 10.0, 10.0, 2),
            uniform(0.0, 0.0, 10.0, 10.0, 1),
        ];
        let report = CorrectPseudo3d::default().execute(&mut layers).unwrap();
        assert_eq!(report.sweeps, 1);
        assert_eq!(report.cells_flagged, 0);
        assert_eq!(layers[1].store.len(), 1);
    }

    #[test]
    fn layers_without_overlap_are_skipped() {
        let mut layers = vec![
            uniform(0.0, 0.0, 4.0, 4.0, 4),
            uniform(10.0, 10.0, 11.0, 11.0, 1),
            uniform(0.0, 0.0, 4.0, 4.0, 1),
        ];
        let report = CorrectPseudo3d::new(4).execute(&mut layers).unwrap();
        assert_eq!(report.sweeps, 2);
        assert_eq!(layers[1].store.len(), 1);
        assert_eq!(layers[2].store.len(), 4);
    }

    #[test]
    fn zero_pmax_is_rejected() {
        let mut layers = vec![uniform(0.0, 0.0, 1.0, 1.0, 1)];
        let err = CorrectPseudo3d::new(0).execute(&mut layers).unwrap_err();
        assert!(matches!(err, GridError::Operation(OperationError::InvalidInput(_))));
    }

    struct AbortNow;

    impl ProgressSink for AbortNow {
        fn is_aborted(&self) -> bool {
            true
        }
    }

    #[test]
    fn abort_leaves_layers_untouched() {
        let mut layers = vec![
            uniform(0.0, 0.0, 10.0, 10.0, 2),
            uniform(0.0, 0.0, 10.0, 10.0, 1),
        ];
        let report = CorrectPseudo3d::new(2)
            .execute_with::<RTreeIndex, _>(&mut layers, &mut AbortNow)
            .unwrap();
        assert_eq!(report.status, RefineStatus::Aborted);
        assert_eq!(report.sweeps, 0);
        assert_eq!(layers[1].store.len(), 1);
    }
}
