use std::fmt;
use std::str::FromStr;

use crate::error::{GridError, OperationError};
use crate::geometry::{Rect, Side};
use crate::math::Tolerance;

use super::SplitFactors;

/// Family of grids a topology rule enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyModel {
    /// No constraint between neighbors.
    None,
    /// Regular Modflow grid: neighbors across an edge share its full length.
    Modflow,
    /// Newsam grid: a neighbor may be at most twice as long, fixes are 2×2.
    Newsam,
    /// Modflow-like grid with a configurable ratio.
    Nested,
}

impl TopologyModel {
    /// Lower-case model name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Modflow => "modflow",
            Self::Newsam => "newsam",
            Self::Nested => "nested",
        }
    }
}

impl fmt::Display for TopologyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TopologyModel {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "modflow" => Ok(Self::Modflow),
            "newsam" => Ok(Self::Newsam),
            "nested" => Ok(Self::Nested),
            _ => Err(OperationError::UnknownTopologyModel(s.to_owned()).into()),
        }
    }
}

/// Maximum size ratio allowed across a shared cell boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyRule {
    /// Grid family.
    pub model: TopologyModel,
    /// Largest allowed ratio of neighbor size to cell size, if checked.
    pub nmax: Option<f64>,
}

/// Ratio used by the nested model unless told otherwise.
pub const DEFAULT_NESTED_NMAX: f64 = 2.0;

impl TopologyRule {
    /// A rule that accepts every boundary.
    #[must_use]
    pub fn none() -> Self {
        Self {
            model: TopologyModel::None,
            nmax: None,
        }
    }

    /// Modflow rule (`nmax = 1`).
    #[must_use]
    pub fn modflow() -> Self {
        Self {
            model: TopologyModel::Modflow,
            nmax: Some(1.0),
        }
    }

    /// Newsam rule (`nmax = 2`, fixes always 2×2).
    #[must_use]
    pub fn newsam() -> Self {
        Self {
            model: TopologyModel::Newsam,
            nmax: Some(2.0),
        }
    }

    /// Nested rule with the given ratio.
    #[must_use]
    pub fn nested(nmax: f64) -> Self {
        Self {
            model: TopologyModel::Nested,
            nmax: Some(nmax),
        }
    }

    /// Builds the default rule of a model.
    #[must_use]
    pub fn for_model(model: TopologyModel) -> Self {
        match model {
            TopologyModel::None => Self::none(),
            TopologyModel::Modflow => Self::modflow(),
            TopologyModel::Newsam => Self::newsam(),
            TopologyModel::Nested => Self::nested(DEFAULT_NESTED_NMAX),
        }
    }

    /// Builds the default rule of a model given by name.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::UnknownTopologyModel` for an unrecognized name.
    pub fn from_model_name(name: &str) -> crate::error::Result<Self> {
        Ok(Self::for_model(name.parse()?))
    }

    /// Checks the boundary between cell `a` and its edge neighbor `b`.
    ///
    /// `side` is where `b` lies as seen from `a`. Across a left/right edge the
    /// heights are compared, across a top/bottom edge the widths.
    #[must_use]
    pub fn is_valid_boundary(&self, a: &Rect, b: &Rect, side: Side, tol: Tolerance) -> bool {
        let Some(nmax) = self.nmax else {
            return true;
        };
        if self.model == TopologyModel::None {
            return true;
        }
        let (sa, sb) = (a.size(), b.size());
        let ratio = if side.is_horizontal() {
            sb.dy / sa.dy
        } else {
            sb.dx / sa.dx
        };
        tol.less_or_equal(ratio, 1.0) || tol.less_or_equal(ratio, nmax)
    }

    /// Split factors for a cell that violates the rule across `side`.
    ///
    /// Newsam always splits 2×2. Other models reuse the requested factors,
    /// restricted to the direction perpendicular to the shared edge.
    #[must_use]
    pub fn resolve_split_factors(&self, side: Side, nrows: usize, ncols: usize) -> SplitFactors {
        if self.model == TopologyModel::Newsam {
            return SplitFactors::new(2, 2);
        }
        if side.is_horizontal() {
            SplitFactors::new(nrows, 1)
        } else {
            SplitFactors::new(1, ncols)
        }
    }
}

impl Default for TopologyRule {
    fn default() -> Self {
        Self::modflow()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect::from_bounds(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn modflow_rejects_bigger_neighbor() {
        let tol = Tolerance::default();
        let small = rect(0.0, 0.0, 1.0, 1.0);
        let big = rect(1.0, 0.0, 3.0, 2.0);
        let rule = TopologyRule::modflow();
        assert!(!rule.is_valid_boundary(&small, &big, Side::Right, tol));
        assert!(rule.is_valid_boundary(&big, &small, Side::Left, tol));
    }

    #[test]
    fn ratio_equal_to_nmax_passes_with_noise() {
        let tol = Tolerance::default();
        let small = rect(0.0, 0.0, 1.0, 1.0);
        let double = rect(1.0, 0.0, 2.0, 2.0 + 1e-9);
        assert!(TopologyRule::newsam().is_valid_boundary(&small, &double, Side::Right, tol));
        assert!(!TopologyRule::modflow().is_valid_boundary(&small, &double, Side::Right, tol));

        let triple = rect(1.0, 0.0, 2.0, 3.0);
        assert!(!TopologyRule::newsam().is_valid_boundary(&small, &triple, Side::Right, tol));
    }

    #[test]
    fn vertical_sides_compare_widths() {
        let tol = Tolerance::default();
        let cell = rect(0.0, 0.0, 1.0, 1.0);
        // Taller but not wider: fine across a top edge under Modflow.
        let above = rect(0.0, 1.0, 1.0, 5.0);
        assert!(TopologyRule::modflow().is_valid_boundary(&cell, &above, Side::Above, tol));
        let wide = rect(0.0, 1.0, 2.0, 2.0);
        assert!(!TopologyRule::modflow().is_valid_boundary(&cell, &wide, Side::Above, tol));
    }

    #[test]
    fn none_accepts_everything() {
        let tol = Tolerance::default();
        let small = rect(0.0, 0.0, 1.0, 1.0);
        let huge = rect(1.0, 0.0, 100.0, 100.0);
        assert!(TopologyRule::none().is_valid_boundary(&small, &huge, Side::Right, tol));
    }

    #[test]
    fn split_factors_follow_the_shared_edge() {
        let modflow = TopologyRule::modflow();
        assert_eq!(
            modflow.resolve_split_factors(Side::Right, 3, 4),
            SplitFactors::new(3, 1)
        );
        assert_eq!(
            modflow.resolve_split_factors(Side::Below, 3, 4),
            SplitFactors::new(1, 4)
        );
        assert_eq!(
            TopologyRule::newsam().resolve_split_factors(Side::Left, 3, 3),
            SplitFactors::new(2, 2)
        );
    }

    #[test]
    fn model_names() {
        assert_eq!(
            TopologyRule::from_model_name("NewSam").unwrap(),
            TopologyRule::newsam()
        );
        assert_eq!(
            TopologyRule::from_model_name("nested").unwrap().nmax,
            Some(DEFAULT_NESTED_NMAX)
        );
        assert_eq!(TopologyModel::Modflow.to_string(), "modflow");
        let err = TopologyRule::from_model_name("voronoi").unwrap_err();
        assert!(matches!(
            err,
            GridError::Operation(OperationError::UnknownTopologyModel(name)) if name == "voronoi"
        ));
    }
}
