use crate::error::{OperationError, Result};
use crate::progress::ProgressSink;

/// What a single pass of a fixed-point loop reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass changed the grid and left `pending` units of work for the next one.
    Continue { pending: usize },
    /// The pass found nothing to do.
    Stable,
    /// The progress sink asked to stop during the pass.
    Aborted,
}

/// How a fixed-point loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convergence {
    /// Number of passes run.
    pub iterations: usize,
    /// `true` if the loop stopped on request rather than by reaching a fixed point.
    pub aborted: bool,
}

/// Runs `pass` until it reports [`PassOutcome::Stable`].
///
/// The sink is polled for abort before every pass and told the pass count
/// after it. Hitting `max_iterations` while work is still pending is an error.
///
/// # Errors
///
/// Returns `OperationError::RefinementDiverged` when the cap is reached, or the
/// first error returned by `pass`.
pub fn repeat_until_stable<F>(
    label: &str,
    max_iterations: Option<usize>,
    progress: &mut dyn ProgressSink,
    mut pass: F,
) -> Result<Convergence>
where
    F: FnMut(usize, &mut dyn ProgressSink) -> Result<PassOutcome>,
{
    let mut iterations = 0;
    loop {
        if progress.is_aborted() {
            tracing::warn!(label, iterations, "aborted before pass");
            return Ok(Convergence {
                iterations,
                aborted: true,
            });
        }
        if max_iterations.is_some_and(|cap| iterations >= cap) {
            tracing::warn!(label, iterations, "no fixed point within iteration cap");
            return Err(OperationError::RefinementDiverged { iterations }.into());
        }

        let outcome = pass(iterations, &mut *progress)?;
        iterations += 1;
        progress.on_iteration_changed(iterations);

        match outcome {
            PassOutcome::Continue { pending } => {
                tracing::debug!(label, iterations, pending, "pass done");
            }
            PassOutcome::Stable => {
                tracing::info!(label, iterations, "converged");
                return Ok(Convergence {
                    iterations,
                    aborted: false,
                });
            }
            PassOutcome::Aborted => {
                tracing::warn!(label, iterations, "aborted during pass");
                return Ok(Convergence {
                    iterations,
                    aborted: true,
                });
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::GridError;

    #[derive(Default)]
    struct Counter {
        iterations: Vec<usize>,
        abort_after: Option<usize>,
    }

    impl ProgressSink for Counter {
        fn on_iteration_changed(&mut self, count: usize) {
            self.iterations.push(count);
        }

        fn is_aborted(&self) -> bool {
            self.abort_after
                .is_some_and(|limit| self.iterations.len() >= limit)
        }
    }

    #[test]
    fn stops_on_first_stable_pass() {
        let mut sink = Counter::default();
        let result = repeat_until_stable("test", Some(10), &mut sink, |i, _| {
            Ok(if i < 2 {
                PassOutcome::Continue { pending: 1 }
            } else {
                PassOutcome::Stable
            })
        })
        .unwrap();
        assert_eq!(result.iterations, 3);
        assert!(!result.aborted);
        assert_eq!(sink.iterations, vec![1, 2, 3]);
    }

    #[test]
    fn cap_reached_with_pending_work_diverges() {
        let err = repeat_until_stable("test", Some(4), &mut NoProgress, |_, _| {
            Ok(PassOutcome::Continue { pending: 3 })
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GridError::Operation(OperationError::RefinementDiverged { iterations: 4 })
        ));
    }

    #[test]
    fn uncapped_loop_runs_to_stability() {
        let result = repeat_until_stable("test", None, &mut NoProgress, |i, _| {
            Ok(if i < 100 {
                PassOutcome::Continue { pending: 1 }
            } else {
                PassOutcome::Stable
            })
        })
        .unwrap();
        assert_eq!(result.iterations, 101);
    }

    #[test]
    fn abort_is_checked_before_each_pass() {
        let mut sink = Counter {
            abort_after: Some(1),
            ..Counter::default()
        };
        let mut calls = 0;
        let result = repeat_until_stable("test", None, &mut sink, |_, _| {
            calls += 1;
            Ok(PassOutcome::Continue { pending: 1 })
        })
        .unwrap();
        assert!(result.aborted);
        assert_eq!(result.iterations, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn pass_errors_propagate() {
        let err = repeat_until_stable("test", None, &mut NoProgress, |_, _| {
            Err(OperationError::InvalidInput("boom".into()).into())
        })
        .unwrap_err();
        assert!(matches!(err, GridError::Operation(OperationError::InvalidInput(_))));
    }
}
