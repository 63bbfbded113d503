//! Cell coercion policies.
//!
//! Required fields fail loudly, display-only fields fall back to null.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use optflow_core::Cell;

/// Datetime layouts always accepted for dates (only the date part is kept).
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a required numeric cell.
///
/// Empty, malformed, and non-finite values are rejected with a reason.
pub fn parse_required_f64(cell: &Cell) -> Result<f64, String> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Empty => return Err("value is required".to_string()),
        Cell::Text(_) => {
            let text = cell.as_text();
            if text.is_empty() {
                return Err("value is required".to_string());
            }
            text.parse::<f64>().map_err(|e| e.to_string())?
        }
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err("value is not finite".to_string())
    }
}

/// Parse a numeric cell, yielding `None` for anything unusable.
pub fn parse_lenient_f64(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Empty => return None,
        Cell::Text(_) => cell.as_text().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Parse a percentage-formatted cell such as `"45.2%"` or `"1,234%"`.
///
/// Every `%` and `,` is removed before parsing; an empty cell is `Ok(None)`.
pub fn parse_percent(cell: &Cell) -> Result<Option<f64>, String> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Empty => return Ok(None),
        Cell::Text(raw) => {
            let cleaned: String = raw.chars().filter(|c| *c != '%' && *c != ',').collect();
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned.parse::<f64>().map_err(|e| e.to_string())?
        }
    };
    if value.is_finite() {
        Ok(Some(value))
    } else {
        Err("value is not finite".to_string())
    }
}

/// Parse a date cell leniently, trying `formats` in order.
pub fn parse_lenient_date<S: AsRef<str>>(cell: &Cell, formats: &[S]) -> Option<NaiveDate> {
    let text = cell.as_text();
    if text.is_empty() {
        return None;
    }

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(&text, fmt.as_ref()) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(&text)
        .ok()
        .map(|dt| dt.date_naive())
}
