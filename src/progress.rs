//! Progress reporting and cooperative cancellation.

/// Receives progress updates from long-running grid operations.
///
/// All methods default to no-ops, so implementors only override what they
/// display. `is_aborted` is polled at the same granularity as progress
/// updates and at the start of every refinement pass.
pub trait ProgressSink {
    /// Percentage (0 to 100) of the current pass that is done.
    fn on_progress(&mut self, _percent: u8) {}

    /// Number of completed refinement passes.
    fn on_iteration_changed(&mut self, _count: usize) {}

    /// Returns `true` once the host wants the operation to stop.
    fn is_aborted(&self) -> bool {
        false
    }
}

/// A sink that ignores every update and never aborts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Reports progress of a pass over `total` work units every 5 %.
pub(crate) struct ProgressTicker {
    done: usize,
    total: usize,
    step: usize,
}

impl ProgressTicker {
    pub(crate) fn new(total: usize, sink: &mut dyn ProgressSink) -> Self {
        sink.on_progress(0);
        Self {
            done: 0,
            total,
            step: (total / 20).max(1),
        }
    }

    /// Marks one unit done. Returns `false` if the sink asked to abort.
    pub(crate) fn tick(&mut self, sink: &mut dyn ProgressSink) -> bool {
        self.done += 1;
        if self.done % self.step == 0 || self.done == self.total {
            sink.on_progress(percent(self.done, self.total));
            return !sink.is_aborted();
        }
        true
    }

    pub(crate) fn finish(self, sink: &mut dyn ProgressSink) {
        sink.on_progress(100);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}
