//! Step observer trait for monitoring cloth simulation progress.

/// Trait for observing cloth steps.
///
/// Implement this trait to watch the solver (e.g., for debugging,
/// visualization, or profiling). All methods have default no-op
/// implementations.
pub trait StepObserver {
    /// Called after every node's new state has been computed, before commit.
    fn on_integrate(&mut self) {}

    /// Called when obstacle `obstacle` (attachment order) projects node `node`.
    fn on_collision(&mut self, _node: usize, _obstacle: usize) {}

    /// Called when a step is fully committed.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}

/// Observer that reports each step as a `tracing` event.
#[derive(Debug, Default)]
pub struct TracingStepObserver {
    steps: u64,
    collisions: usize,
}

impl TracingStepObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed steps seen so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl StepObserver for TracingStepObserver {
    fn on_collision(&mut self, node: usize, obstacle: usize) {
        self.collisions += 1;
        tracing::trace!(node, obstacle, "node projected out of obstacle");
    }

    fn on_step_complete(&mut self) {
        self.steps += 1;
        tracing::debug!(step = self.steps, collisions = self.collisions, "cloth step complete");
        self.collisions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_observer_counts_steps() {
        let mut obs = TracingStepObserver::new();
        obs.on_collision(3, 0);
        obs.on_step_complete();
        obs.on_step_complete();
        assert_eq!(obs.steps(), 2);
        assert_eq!(obs.collisions, 0);
    }
}
