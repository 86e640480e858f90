use crate::error::{OperationError, Result};
use crate::geometry::{Rect, MAX_SUBDIVISION_CELLS};
use crate::topology::{Attributes, CellData, CellId, FeatureStore};

/// Creates a uniform grid of `nrows` × `ncols` cells over an extent.
pub struct MakeGrid {
    extent: Rect,
    nrows: usize,
    ncols: usize,
    attributes: Attributes,
}

impl MakeGrid {
    /// Creates a new `MakeGrid` operation.
    #[must_use]
    pub fn new(extent: Rect, nrows: usize, ncols: usize) -> Self {
        Self {
            extent,
            nrows,
            ncols,
            attributes: Attributes::new(),
        }
    }

    /// Creates a grid with cells of `xres` × `yres` starting at `(xmin, ymin)`.
    ///
    /// The number of rows and columns is rounded from the extent, and the
    /// upper bounds are moved so that the resolution divides the extent exactly.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if a resolution is not positive,
    /// the extent holds no full cell, or the grid would exceed
    /// [`MAX_SUBDIVISION_CELLS`].
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn with_resolution(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        xres: f64,
        yres: f64,
    ) -> Result<Self> {
        if !(xres > 0.0 && yres > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "grid resolution must be positive, got {xres} x {yres}"
            ))
            .into());
        }
        let nrows = ((ymax - ymin) / yres).round();
        let ncols = ((xmax - xmin) / xres).round();
        if !(nrows >= 1.0 && ncols >= 1.0) {
            return Err(OperationError::InvalidInput(format!(
                "extent ({xmin}, {ymin}) - ({xmax}, {ymax}) holds no {xres} x {yres} cell"
            ))
            .into());
        }
        if !(nrows * ncols <= MAX_SUBDIVISION_CELLS as f64) {
            return Err(OperationError::InvalidInput(format!(
                "a {xres} x {yres} resolution gives {nrows} x {ncols} cells, too many for one grid"
            ))
            .into());
        }
        let (nrows, ncols) = (nrows as usize, ncols as usize);
        let extent = Rect::from_bounds(
            xmin,
            ymin,
            xmin + ncols as f64 * xres,
            ymin + nrows as f64 * yres,
        )?;
        Ok(Self::new(extent, nrows, ncols))
    }

    /// Sets the attributes given to every cell.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Executes the operation, returning the cell ids row-major, top row first.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if a dimension is zero, or the
    /// store error if writing fails.
    pub fn execute<S: FeatureStore + ?Sized>(&self, store: &mut S) -> Result<Vec<CellId>> {
        let cells = self
            .extent
            .subdivide(self.nrows, self.ncols)?
            .into_iter()
            .map(|rect| CellData::with_attributes(rect, self.attributes.clone()))
            .collect();
        Ok(store.add_cells(cells)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{AttributeValue, GridLayer};
    use crate::GridError;
    use approx::assert_relative_eq;

    #[test]
    fn uniform_grid() {
        let mut layer = GridLayer::new();
        let extent = Rect::from_bounds(0.0, 0.0, 4.0, 4.0).unwrap();
        let ids = MakeGrid::new(extent, 4, 4).execute(&mut layer).unwrap();
        assert_eq!(ids.len(), 16);
        for id in ids {
            let size = layer.cell(id).unwrap().rect.size();
            assert_relative_eq!(size.dx, 1.0);
            assert_relative_eq!(size.dy, 1.0);
        }
    }

    #[test]
    fn resolution_snaps_extent() {
        let mut layer = GridLayer::new();
        let mut attrs = Attributes::new();
        attrs.insert("ID".into(), AttributeValue::Int(0));
        let ids = MakeGrid::with_resolution(100.0, 200.0, 352.0, 298.0, 50.0, 50.0)
            .unwrap()
            .with_attributes(attrs.clone())
            .execute(&mut layer)
            .unwrap();
        // 252 / 50 rounds to 5 columns, 98 / 50 rounds to 2 rows.
        assert_eq!(ids.len(), 10);
        let last = layer.cell(ids[9]).unwrap();
        assert_relative_eq!(last.rect.bounds().max.x, 350.0);
        assert_relative_eq!(last.rect.bounds().min.y, 200.0);
        assert_eq!(last.attributes, attrs);
    }

    #[test]
    fn resolution_larger_than_extent_fails() {
        assert!(MakeGrid::with_resolution(0.0, 0.0, 1.0, 1.0, 5.0, 5.0).is_err());
        assert!(MakeGrid::with_resolution(0.0, 0.0, 1.0, 1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn tiny_resolution_is_rejected() {
        let mut layer = GridLayer::new();
        let result = MakeGrid::with_resolution(0.0, 0.0, 1e6, 1e6, 1e-13, 1e-13)
            .and_then(|op| op.execute(&mut layer));
        assert!(matches!(
            result,
            Err(GridError::Operation(OperationError::InvalidInput(_)))
        ));
        assert!(layer.is_empty());

        let extent = Rect::from_bounds(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(MakeGrid::new(extent, usize::MAX, usize::MAX)
            .execute(&mut layer)
            .is_err());
    }
}
