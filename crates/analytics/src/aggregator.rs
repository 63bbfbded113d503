//! Contract group aggregation.
//!
//! Groups quotes by contract identity and accumulates volume, open interest
//! and the signed-split delta volume.

use chrono::NaiveDate;
use optflow_core::{DerivedFields, GroupKey, OptionGroupSummary, OptionQuote};
use std::collections::BTreeMap;

/// Accumulator for one contract group.
#[derive(Debug, Clone, Default)]
struct GroupAccumulator {
    total_volume: f64,
    total_open_interest: f64,
    positive_delta_volume: f64,
    negative_delta_volume: f64,
    rows: usize,
}

impl GroupAccumulator {
    fn add(&mut self, quote: &OptionQuote) {
        let dv = quote.delta_volume();
        self.total_volume += quote.volume;
        self.total_open_interest += quote.open_interest;
        // Clip per row, then sum.
        self.positive_delta_volume += dv.max(0.0);
        self.negative_delta_volume += (-dv).max(0.0);
        self.rows += 1;
    }

    fn to_summary(&self, key: GroupKey, as_of: NaiveDate) -> OptionGroupSummary {
        let strike = key.strike.map(|k| k.into_inner());
        let underlying_price = key.underlying_price.map(|p| p.into_inner());
        let derived = DerivedFields::compute(strike, underlying_price, key.expiration_date, as_of);

        OptionGroupSummary {
            symbol: key.symbol,
            underlying_price,
            option_type: key.option_type,
            strike,
            expiration_date: key.expiration_date,
            total_volume: self.total_volume,
            total_open_interest: self.total_open_interest,
            positive_delta_volume: self.positive_delta_volume,
            negative_delta_volume: self.negative_delta_volume,
            delta_volume_diff: self.positive_delta_volume - self.negative_delta_volume,
            days_to_expiration: derived.days_to_expiration,
            strike_price_diff: derived.strike_price_diff,
            strike_price_diff_pct: derived.strike_price_diff_pct,
        }
    }
}

/// Aggregator from quotes to per-contract summaries.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    groups: BTreeMap<GroupKey, GroupAccumulator>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quote to its group.
    pub fn add_quote(&mut self, quote: &OptionQuote) {
        self.groups.entry(quote.group_key()).or_default().add(quote);
    }

    /// Add multiple quotes.
    pub fn add_quotes(&mut self, quotes: &[OptionQuote]) {
        for quote in quotes {
            self.add_quote(quote);
        }
    }

    /// Number of groups seen so far.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of quotes in a group.
    pub fn rows_in(&self, key: &GroupKey) -> usize {
        self.groups.get(key).map_or(0, |acc| acc.rows)
    }

    /// Produce summaries sorted by group key, consuming the aggregator.
    pub fn finish(self, as_of: NaiveDate) -> Vec<OptionGroupSummary> {
        self.groups
            .into_iter()
            .map(|(key, acc)| acc.to_summary(key, as_of))
            .collect()
    }

    /// Aggregate a slice of quotes in one call.
    pub fn aggregate(quotes: &[OptionQuote], as_of: NaiveDate) -> Vec<OptionGroupSummary> {
        let mut aggregator = Self::new();
        aggregator.add_quotes(quotes);
        aggregator.finish(as_of)
    }
}
