//! Derived per-contract diagnostics.
//!
//! Shared by the row-level and group-level derivation so the two agree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round to two decimals, ties to even.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Whole days from `as_of` to `expiration` (negative once expired).
pub fn days_to_expiration(expiration: Option<NaiveDate>, as_of: NaiveDate) -> Option<i64> {
    expiration.map(|exp| (exp - as_of).num_days())
}

/// `strike - price`, rounded to two decimals.
pub fn strike_price_diff(strike: Option<f64>, price: Option<f64>) -> Option<f64> {
    match (strike, price) {
        (Some(k), Some(p)) => Some(round2(k - p)),
        _ => None,
    }
}

/// `100 * diff / price`, rounded to two decimals.
///
/// Null when either input is null or the price is zero.
pub fn strike_price_diff_pct(diff: Option<f64>, price: Option<f64>) -> Option<f64> {
    match (diff, price) {
        (Some(d), Some(p)) if p != 0.0 => {
            let pct = round2(100.0 * d / p);
            pct.is_finite().then_some(pct)
        }
        _ => None,
    }
}

/// The three derived diagnostics of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub days_to_expiration: Option<i64>,
    pub strike_price_diff: Option<f64>,
    pub strike_price_diff_pct: Option<f64>,
}

impl DerivedFields {
    /// Compute all derived fields for one contract.
    pub fn compute(
        strike: Option<f64>,
        price: Option<f64>,
        expiration: Option<NaiveDate>,
        as_of: NaiveDate,
    ) -> Self {
        let diff = strike_price_diff(strike, price);
        Self {
            days_to_expiration: days_to_expiration(expiration, as_of),
            strike_price_diff: diff,
            strike_price_diff_pct: strike_price_diff_pct(diff, price),
        }
    }
}
