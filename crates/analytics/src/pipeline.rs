//! Normalize, aggregate and filter in one call.

use crate::aggregator::Aggregator;
use crate::filter::ActivityFilter;
use chrono::NaiveDate;
use optflow_core::{Config, OptionGroupSummary, OptionQuote, RawTable, Result};
use optflow_ingestion::{NormalizeStats, Normalizer};
use tracing::info;

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Input rows normalized.
    pub input_rows: usize,
    /// Contract groups formed.
    pub groups: usize,
    /// Groups kept by the filter.
    pub kept_groups: usize,
    /// Null-coerced fields seen during normalization.
    pub normalize: NormalizeStats,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Filtered summaries, sorted by group key.
    pub summaries: Vec<OptionGroupSummary>,
    /// Run counters.
    pub stats: RunStats,
}

/// The option-chain transform: Normalizer -> Aggregator -> filter.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    normalizer: Normalizer,
    filter: ActivityFilter,
}

impl Pipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: Normalizer::new(config.parse.clone()),
            filter: ActivityFilter::new(config.filter.clone()),
        }
    }

    /// Run the full transform over a raw table.
    ///
    /// Normalization errors abort before any aggregation.
    pub fn run(&self, table: &RawTable, as_of: NaiveDate) -> Result<PipelineOutput> {
        let (quotes, normalize) = self.normalizer.normalize_with_stats(table, as_of)?;
        let mut output = self.run_quotes(&quotes, as_of);
        output.stats.normalize = normalize;

        info!(
            as_of = %as_of,
            rows = output.stats.input_rows,
            groups = output.stats.groups,
            kept = output.stats.kept_groups,
            null_key_fields = output.stats.normalize.null_key_fields(),
            "option chain processed"
        );

        Ok(output)
    }

    /// Aggregate and filter already-normalized quotes.
    pub fn run_quotes(&self, quotes: &[OptionQuote], as_of: NaiveDate) -> PipelineOutput {
        let summaries = Aggregator::aggregate(quotes, as_of);
        let groups = summaries.len();
        let summaries = self.filter.apply(summaries);

        PipelineOutput {
            stats: RunStats {
                input_rows: quotes.len(),
                groups,
                kept_groups: summaries.len(),
                normalize: NormalizeStats::default(),
            },
            summaries,
        }
    }
}
