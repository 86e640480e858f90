use crate::error::{OperationError, Result};
use crate::math::{Point2, Tolerance};
use crate::topology::{CellId, FeatureStore};

/// Row/column structure of a regular (tensor-product) grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridShape {
    /// Number of rows.
    pub nrow: usize,
    /// Number of columns.
    pub ncol: usize,
    /// Column widths, left to right.
    pub delr: Vec<f64>,
    /// Row heights, top to bottom.
    pub delc: Vec<f64>,
}

impl GridShape {
    /// Returns the common column width if all columns have the same width.
    #[must_use]
    pub fn uniform_delr(&self, tol: Tolerance) -> Option<f64> {
        uniform(&self.delr, tol)
    }

    /// Returns the common row height if all rows have the same height.
    #[must_use]
    pub fn uniform_delc(&self, tol: Tolerance) -> Option<f64> {
        uniform(&self.delc, tol)
    }
}

fn uniform(values: &[f64], tol: Tolerance) -> Option<f64> {
    let first = *values.first()?;
    values
        .iter()
        .all(|&v| tol.nearly_equal(v, first))
        .then_some(first)
}

/// A cell placed in a regular grid (0-based row from the top, column from the left).
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlacedCell {
    pub id: CellId,
    pub row: usize,
    pub col: usize,
    pub centroid: Point2,
}

/// Computes the shape of a regular grid layer.
///
/// A layer refined under the Modflow rule is regular: every row and every
/// column runs through the whole grid.
pub struct RegularGridShape {
    tolerance: Tolerance,
}

impl Default for RegularGridShape {
    fn default() -> Self {
        Self::new()
    }
}

impl RegularGridShape {
    /// Creates a new `RegularGridShape` query.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: Tolerance::default(),
        }
    }

    /// Sets the comparison tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::IrregularGrid` if the layer is empty or its
    /// cells do not form a tensor-product grid.
    pub fn execute<S: FeatureStore + ?Sized>(&self, store: &S) -> Result<GridShape> {
        self.place_cells(store).map(|(shape, _)| shape)
    }

    pub(crate) fn place_cells<S: FeatureStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<(GridShape, Vec<PlacedCell>)> {
        let tol = self.tolerance;
        let cells = store.all_cells();
        if cells.is_empty() {
            return Err(OperationError::IrregularGrid("layer has no cells".into()).into());
        }

        let centroids: Vec<Point2> = cells.iter().map(|(_, c)| c.rect.centroid()).collect();
        let xs = distinct_sorted(centroids.iter().map(|p| p.x), tol);
        let ys = distinct_sorted(centroids.iter().map(|p| p.y), tol);
        let (nrow, ncol) = (ys.len(), xs.len());
        if nrow * ncol != cells.len() {
            return Err(OperationError::IrregularGrid(format!(
                "{} cells cannot fill {nrow} rows x {ncol} columns",
                cells.len()
            ))
            .into());
        }

        let mut delr: Vec<Option<f64>> = vec![None; ncol];
        let mut delc: Vec<Option<f64>> = vec![None; nrow];
        let mut occupied = vec![false; nrow * ncol];
        let mut placed = Vec::with_capacity(cells.len());

        for ((id, data), centroid) in cells.iter().zip(&centroids) {
            let col = position(&xs, centroid.x, tol);
            // Rows are numbered from the top.
            let row = nrow - 1 - position(&ys, centroid.y, tol);
            if std::mem::replace(&mut occupied[row * ncol + col], true) {
                return Err(OperationError::IrregularGrid(format!(
                    "two cells share row {} column {}",
                    row + 1,
                    col + 1
                ))
                .into());
            }
            let size = data.rect.size();
            check_spacing(&mut delr[col], size.dx, tol, "column", col)?;
            check_spacing(&mut delc[row], size.dy, tol, "row", row)?;
            placed.push(PlacedCell {
                id: *id,
                row,
                col,
                centroid: *centroid,
            });
        }

        let shape = GridShape {
            nrow,
            ncol,
            delr: delr.into_iter().flatten().collect(),
            delc: delc.into_iter().flatten().collect(),
        };
        Ok((shape, placed))
    }
}

/// Sorted values with near-duplicates removed.
fn distinct_sorted(values: impl Iterator<Item = f64>, tol: Tolerance) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|b, a| tol.nearly_equal(*a, *b));
    sorted
}

/// Index of the entry of `axis` nearly equal to `value`.
fn position(axis: &[f64], value: f64, tol: Tolerance) -> usize {
    axis.partition_point(|&a| a < value && !tol.nearly_equal(a, value))
        .min(axis.len() - 1)
}

fn check_spacing(
    slot: &mut Option<f64>,
    size: f64,
    tol: Tolerance,
    kind: &str,
    index: usize,
) -> Result<()> {
    match *slot {
        None => *slot = Some(size),
        Some(expected) if tol.nearly_equal(expected, size) => {}
        Some(expected) => {
            return Err(OperationError::IrregularGrid(format!(
                "{kind} {} mixes sizes {expected} and {size}",
                index + 1
            ))
            .into());
        }
    }
    Ok(())
}
