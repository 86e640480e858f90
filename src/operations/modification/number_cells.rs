use crate::error::Result;
use crate::math::Tolerance;
use crate::operations::query::{GridShape, RegularGridShape};
use crate::topology::{AttributeValue, FeatureStore};

/// Attribute holding the 1-based row number, counted from the top.
pub const ROW_FIELD: &str = "ROW";
/// Attribute holding the 1-based column number, counted from the left.
pub const COL_FIELD: &str = "COL";
/// Attribute holding the centroid x coordinate.
pub const CX_FIELD: &str = "CX";
/// Attribute holding the centroid y coordinate.
pub const CY_FIELD: &str = "CY";

/// Numbers the cells of a regular grid.
///
/// Writes `ROW`, `COL`, `CX` and `CY` on every cell. Other attributes are
/// preserved.
pub struct NumberCells {
    tolerance: Tolerance,
}

impl Default for NumberCells {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberCells {
    /// Creates a new `NumberCells` operation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: Tolerance::default(),
        }
    }

    /// Sets the comparison tolerance used to detect rows and columns.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the operation and returns the grid shape.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::IrregularGrid` if the layer is not a
    /// tensor-product grid (nothing is written then), or the store error if an
    /// attribute write fails.
    #[allow(clippy::cast_possible_wrap)]
    pub fn execute<S: FeatureStore + ?Sized>(&self, store: &mut S) -> Result<GridShape> {
        let (shape, placed) = RegularGridShape::new()
            .with_tolerance(self.tolerance)
            .place_cells(store)?;

        for cell in placed {
            let mut attributes = store.attributes_of(cell.id)?.clone();
            attributes.insert(ROW_FIELD.into(), AttributeValue::Int(cell.row as i64 + 1));
            attributes.insert(COL_FIELD.into(), AttributeValue::Int(cell.col as i64 + 1));
            attributes.insert(CX_FIELD.into(), AttributeValue::Real(cell.centroid.x));
            attributes.insert(CY_FIELD.into(), AttributeValue::Real(cell.centroid.y));
            store.set_attributes(cell.id, attributes)?;
        }
        tracing::debug!(nrow = shape.nrow, ncol = shape.ncol, "numbered grid cells");
        Ok(shape)
    }
}
