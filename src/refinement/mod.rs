//! Cascading refinement: split cells, then split whatever neighbors the
//! active topology rule rejects, until the grid is stable.

pub mod fix_set;
pub mod fixed_point;
pub mod pseudo3d;
pub mod refine;
pub mod rule;

pub use fix_set::{FixSet, SplitFactors};
pub use fixed_point::{repeat_until_stable, Convergence, PassOutcome};
pub use pseudo3d::{CorrectPseudo3d, CorrectionReport, PseudoLayer, DEFAULT_PMAX};
pub use refine::{CheckTopology, RefineBySplit, RefineReport, RefineStatus};
pub use rule::{TopologyModel, TopologyRule, DEFAULT_NESTED_NMAX};

use crate::math::Tolerance;

/// Number of passes after which a refinement that still has fixes pending is
/// reported as diverged.
pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// Parameters shared by the refinement engine and the pseudo-3D corrector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineParams {
    /// Tolerance for every geometric comparison.
    pub tolerance: Tolerance,
    /// Pass cap, or `None` to run until stable.
    pub max_iterations: Option<usize>,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
        }
    }
}
