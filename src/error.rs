use thiserror::Error;

use crate::topology::CellId;

/// Top-level error type for grid refinement.
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to cell geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised by a [`FeatureStore`](crate::topology::FeatureStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cell not found: {0:?}")]
    CellNotFound(CellId),

    #[error("store write failed: {0}")]
    WriteFailed(String),
}

/// Errors related to grid operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown topology model: {0}")]
    UnknownTopologyModel(String),

    #[error("refinement did not converge after {iterations} iterations")]
    RefinementDiverged { iterations: usize },

    #[error("grid is not regular: {0}")]
    IrregularGrid(String),
}

/// Convenience type alias for results using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;
