//! Configuration for the pass pipeline.

/// Configuration for a [`Pipeline`](crate::pipeline::Pipeline) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How often the whole script is applied (default: 1).
    ///
    /// A value above one repeats the script until a round reports no change or the limit
    /// is reached. Zero runs nothing.
    pub max_iterations: usize,

    /// Log every step that changed the graph at `info` level (default: true).
    ///
    /// Steps without changes are always logged at `debug` level.
    pub log_changes: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1,
            log_changes: true,
        }
    }
}

impl PipelineConfig {
    /// Sets the iteration limit.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enables or disables change logging.
    #[must_use]
    pub fn with_log_changes(mut self, log_changes: bool) -> Self {
        self.log_changes = log_changes;
        self
    }
}
