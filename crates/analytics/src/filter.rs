//! Activity / exposure filter over contract summaries.

use optflow_core::{FilterConfig, OptionGroupSummary};

/// Keeps groups with enough volume and net bullish delta pressure.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    config: FilterConfig,
}

impl ActivityFilter {
    /// Create a new filter.
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// `total_volume >= min` (inclusive) and `delta_volume_diff > min` (exclusive).
    #[inline]
    pub fn keep(&self, summary: &OptionGroupSummary) -> bool {
        summary.total_volume >= self.config.min_total_volume
            && summary.delta_volume_diff > self.config.min_delta_volume_diff
    }

    /// Filter summaries, preserving their order.
    pub fn apply(&self, summaries: Vec<OptionGroupSummary>) -> Vec<OptionGroupSummary> {
        summaries.into_iter().filter(|s| self.keep(s)).collect()
    }
}
