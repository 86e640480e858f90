pub mod cell;

pub use cell::{AttributeValue, Attributes, CellData, CellId};

use crate::error::StoreError;
use slotmap::SlotMap;

/// Storage of the cells of one grid layer.
///
/// The refinement engine only talks to storage through this trait, so a host
/// application can back a layer with its own feature storage.
pub trait FeatureStore {
    /// Returns every cell of the layer.
    fn all_cells(&self) -> Vec<(CellId, &CellData)>;

    /// Returns one cell.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CellNotFound` if the cell does not exist.
    fn cell(&self, id: CellId) -> Result<&CellData, StoreError>;

    /// Removes cells from the layer.
    ///
    /// Deletion must take effect before any later [`add_cells`](Self::add_cells)
    /// call, since a store may recycle identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if a cell does not exist or the write fails.
    fn delete_cells(&mut self, ids: &[CellId]) -> Result<(), StoreError>;

    /// Adds cells to the layer and returns their new ids, in input order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the write fails.
    fn add_cells(&mut self, cells: Vec<CellData>) -> Result<Vec<CellId>, StoreError>;

    /// Replaces the attributes of one cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist or the write fails.
    fn set_attributes(&mut self, id: CellId, attributes: Attributes) -> Result<(), StoreError>;

    /// Returns the attributes of one cell.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CellNotFound` if the cell does not exist.
    fn attributes_of(&self, id: CellId) -> Result<&Attributes, StoreError> {
        Ok(&self.cell(id)?.attributes)
    }

    /// Returns the ids of every cell of the layer.
    fn cell_ids(&self) -> Vec<CellId> {
        self.all_cells().into_iter().map(|(id, _)| id).collect()
    }
}

/// In-memory grid layer.
///
/// Cells are referenced via typed ids (generational indices): a slot freed by
/// a split may be reused by a new cell, but never under the old id.
#[derive(Debug, Default, Clone)]
pub struct GridLayer {
    cells: SlotMap<CellId, CellData>,
}

impl GridLayer {
    /// Creates a new, empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a cell and returns its ID.
    pub fn add_cell(&mut self, data: CellData) -> CellId {
        self.cells.insert(data)
    }

    /// Number of cells in the layer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the layer has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if the cell exists.
    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(id)
    }
}

impl FeatureStore for GridLayer {
    fn all_cells(&self) -> Vec<(CellId, &CellData)> {
        self.cells.iter().collect()
    }

    fn cell(&self, id: CellId) -> Result<&CellData, StoreError> {
        self.cells.get(id).ok_or(StoreError::CellNotFound(id))
    }

    fn delete_cells(&mut self, ids: &[CellId]) -> Result<(), StoreError> {
        if let Some(&missing) = ids.iter().find(|id| !self.cells.contains_key(**id)) {
            return Err(StoreError::CellNotFound(missing));
        }
        for &id in ids {
            self.cells.remove(id);
        }
        Ok(())
    }

    fn add_cells(&mut self, cells: Vec<CellData>) -> Result<Vec<CellId>, StoreError> {
        Ok(cells.into_iter().map(|data| self.cells.insert(data)).collect())
    }

    fn set_attributes(&mut self, id: CellId, attributes: Attributes) -> Result<(), StoreError> {
        let cell = self.cells.get_mut(id).ok_or(StoreError::CellNotFound(id))?;
        cell.attributes = attributes;
        Ok(())
    }
}
