use std::collections::BTreeMap;

use crate::geometry::Rect;

slotmap::new_key_type! {
    /// Unique identifier for a cell in a grid layer.
    pub struct CellId;
}

/// Value of a cell attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Real(f64),
    Text(String),
    Null,
}

/// Named attributes attached to a cell.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Data associated with a grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    /// The cell rectangle.
    pub rect: Rect,
    /// Attributes carried over verbatim when the cell is split.
    pub attributes: Attributes,
}

impl CellData {
    /// Creates a cell without attributes.
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            attributes: Attributes::new(),
        }
    }

    /// Creates a cell with the given attributes.
    #[must_use]
    pub fn with_attributes(rect: Rect, attributes: Attributes) -> Self {
        Self { rect, attributes }
    }
}
