//! Core data types for the options-flow system.

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Float key component with total ordering.
pub type KeyFloat = OrderedFloat<f64>;

/// Column names of the raw option-chain export and of the result table.
pub mod columns {
    pub const SYMBOL: &str = "Symbol";
    pub const PRICE: &str = "Price~";
    pub const TYPE: &str = "Type";
    pub const STRIKE: &str = "Strike";
    pub const EXP_DATE: &str = "Exp Date";
    pub const BID: &str = "Bid";
    pub const ASK: &str = "Ask";
    pub const LAST: &str = "Last";
    pub const VOLUME: &str = "Volume";
    pub const OPEN_INT: &str = "Open Int";
    pub const IV: &str = "IV";
    pub const DELTA: &str = "Delta";

    /// Required input columns, in schema order.
    pub const INPUT: [&str; 12] = [
        SYMBOL, PRICE, TYPE, STRIKE, EXP_DATE, BID, ASK, LAST, VOLUME, OPEN_INT, IV, DELTA,
    ];

    /// Result table columns, in output order.
    pub const OUTPUT: [&str; 13] = [
        SYMBOL,
        PRICE,
        TYPE,
        STRIKE,
        EXP_DATE,
        "total_volume",
        "total_open_int",
        "positive_delta_volume",
        "negative_delta_volume",
        "delta_volume_diff",
        "Days_to_Expiration",
        "Strike_Price_Diff",
        "Strike_Price_Diff_%",
    ];
}

/// A single raw cell as handed over by the input collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric cell (e.g. from a JSON export).
    Number(f64),
    /// Textual cell (e.g. from CSV).
    Text(String),
    /// Missing value.
    Empty,
}

impl Cell {
    /// Build a cell from CSV text; blank text becomes `Empty`.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }

    /// Trimmed textual form of the cell.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Text(s) => Cow::Borrowed(s.trim()),
            Cell::Empty => Cow::Borrowed(""),
        }
    }

    /// Is the cell empty (or whitespace only)?
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::from_text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// An in-memory table of raw cells with a header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names.
    pub headers: Vec<String>,
    /// Data rows; a short row is padded with `Empty` on access.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row.
    pub fn push_row<I, C>(&mut self, row: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, col); missing trailing cells read as `Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One normalized option quote row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Underlying ticker.
    pub symbol: String,
    /// Underlying price (null if unparseable).
    pub underlying_price: Option<f64>,
    /// Option type as exported ("Call" / "Put").
    pub option_type: String,
    /// Strike (null if unparseable).
    pub strike: Option<f64>,
    /// Expiration date (null if unparseable).
    pub expiration_date: Option<NaiveDate>,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    /// Quote-level traded volume.
    pub volume: f64,
    pub open_interest: f64,
    /// Implied volatility in percent (45.2 means 45.2%).
    pub implied_volatility: Option<f64>,
    /// Signed option delta.
    pub delta: f64,
    /// Days from the run date to expiration.
    pub days_to_expiration: Option<i64>,
    /// `strike - underlying_price`, two decimals.
    pub strike_price_diff: Option<f64>,
    /// `strike_price_diff` as a percentage of the underlying price.
    pub strike_price_diff_pct: Option<f64>,
}

impl OptionQuote {
    /// Grouping identity of this quote.
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            symbol: self.symbol.clone(),
            underlying_price: self.underlying_price.map(OrderedFloat),
            option_type: self.option_type.clone(),
            strike: self.strike.map(OrderedFloat),
            expiration_date: self.expiration_date,
        }
    }

    /// Signed volume-delta product.
    #[inline]
    pub fn delta_volume(&self) -> f64 {
        self.volume * self.delta
    }
}

/// Identity of one option contract snapshot.
///
/// Null components compare equal to each other and sort before any value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub symbol: String,
    pub underlying_price: Option<KeyFloat>,
    pub option_type: String,
    pub strike: Option<KeyFloat>,
    pub expiration_date: Option<NaiveDate>,
}

/// One aggregated row per contract group, in result-table column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroupSummary {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Price~")]
    pub underlying_price: Option<f64>,
    #[serde(rename = "Type")]
    pub option_type: String,
    #[serde(rename = "Strike")]
    pub strike: Option<f64>,
    #[serde(rename = "Exp Date")]
    pub expiration_date: Option<NaiveDate>,
    pub total_volume: f64,
    #[serde(rename = "total_open_int")]
    pub total_open_interest: f64,
    /// Sum of `max(volume * delta, 0)`.
    pub positive_delta_volume: f64,
    /// Sum of `max(-volume * delta, 0)`.
    pub negative_delta_volume: f64,
    /// `positive_delta_volume - negative_delta_volume`.
    pub delta_volume_diff: f64,
    #[serde(rename = "Days_to_Expiration")]
    pub days_to_expiration: Option<i64>,
    #[serde(rename = "Strike_Price_Diff")]
    pub strike_price_diff: Option<f64>,
    #[serde(rename = "Strike_Price_Diff_%")]
    pub strike_price_diff_pct: Option<f64>,
}

impl OptionGroupSummary {
    /// Grouping identity of this summary.
    pub fn key(&self) -> GroupKey {
        GroupKey {
            symbol: self.symbol.clone(),
            underlying_price: self.underlying_price.map(OrderedFloat),
            option_type: self.option_type.clone(),
            strike: self.strike.map(OrderedFloat),
            expiration_date: self.expiration_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_forms() {
        assert_eq!(Cell::from_text("  12.5 ").as_text(), "12.5");
        assert_eq!(Cell::from_text("   "), Cell::Empty);
        assert_eq!(Cell::Number(100.0).as_text(), "100");
        assert!(Cell::Text(" ".to_string()).is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }

    #[test]
    fn test_cell_untagged_json() {
        let cells: Vec<Cell> = serde_json::from_str(r#"[1.5, "45.2%", null]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                Cell::Number(1.5),
                Cell::Text("45.2%".to_string()),
                Cell::Empty
            ]
        );
    }

    #[test]
    fn test_raw_table_short_row_reads_empty() {
        let mut table = RawTable::new(["A", "B", "C"]);
        table.push_row(["1", "2"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.column_index("C"), Some(2));
        assert_eq!(table.column_index("c"), None);
        assert_eq!(table.cell(0, 2), &Cell::Empty);
        assert_eq!(table.cell(5, 0), &Cell::Empty);
    }

    #[test]
    fn test_group_key_null_ordering() {
        let a = GroupKey {
            symbol: "AAPL".into(),
            underlying_price: None,
            option_type: "Call".into(),
            strike: None,
            expiration_date: None,
        };
        let mut b = a.clone();
        b.strike = Some(OrderedFloat(100.0));
        assert_eq!(a, a.clone());
        assert!(a < b);
    }
}
