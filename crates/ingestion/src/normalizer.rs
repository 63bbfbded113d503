//! Raw table normalization.
//!
//! Turns one raw option-chain export into typed `OptionQuote` rows with the
//! row-level derived diagnostics attached.

use crate::coerce::{parse_lenient_date, parse_lenient_f64, parse_percent, parse_required_f64};
use chrono::NaiveDate;
use optflow_core::{columns, DerivedFields, Error, OptionQuote, ParseConfig, RawTable, Result};
use tracing::debug;

/// Statistics about one normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeStats {
    /// Rows normalized.
    pub rows: usize,
    /// Rows whose strike was coerced to null.
    pub null_strike: usize,
    /// Rows whose underlying price was coerced to null.
    pub null_underlying_price: usize,
    /// Rows whose expiration date was coerced to null.
    pub null_expiration: usize,
    /// Rows with an empty implied volatility.
    pub null_implied_volatility: usize,
}

impl NormalizeStats {
    /// Total null-coerced key fields.
    pub fn null_key_fields(&self) -> usize {
        self.null_strike + self.null_underlying_price + self.null_expiration
    }
}

/// Column positions of the required input schema.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    symbol: usize,
    price: usize,
    option_type: usize,
    strike: usize,
    exp_date: usize,
    bid: usize,
    ask: usize,
    last: usize,
    volume: usize,
    open_int: usize,
    iv: usize,
    delta: usize,
}

impl ColumnMap {
    /// Resolve every required column; the first missing one is reported.
    fn resolve(table: &RawTable) -> Result<Self> {
        let find = |name: &str| table.column_index(name).ok_or_else(|| Error::schema(name));

        Ok(Self {
            symbol: find(columns::SYMBOL)?,
            price: find(columns::PRICE)?,
            option_type: find(columns::TYPE)?,
            strike: find(columns::STRIKE)?,
            exp_date: find(columns::EXP_DATE)?,
            bid: find(columns::BID)?,
            ask: find(columns::ASK)?,
            last: find(columns::LAST)?,
            volume: find(columns::VOLUME)?,
            open_int: find(columns::OPEN_INT)?,
            iv: find(columns::IV)?,
            delta: find(columns::DELTA)?,
        })
    }
}

/// Normalizer for raw option-chain tables.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: ParseConfig,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }

    /// Normalize a raw table into quotes.
    ///
    /// Fails on the first missing column or unparseable required field;
    /// no partial result is returned.
    pub fn normalize(&self, table: &RawTable, as_of: NaiveDate) -> Result<Vec<OptionQuote>> {
        self.normalize_with_stats(table, as_of).map(|(quotes, _)| quotes)
    }

    /// Normalize a raw table, also returning coercion statistics.
    pub fn normalize_with_stats(
        &self,
        table: &RawTable,
        as_of: NaiveDate,
    ) -> Result<(Vec<OptionQuote>, NormalizeStats)> {
        let cols = ColumnMap::resolve(table)?;
        let mut stats = NormalizeStats::default();
        let mut quotes = Vec::with_capacity(table.len());

        for row in 0..table.len() {
            let quote = self.normalize_row(table, &cols, row, as_of)?;

            stats.rows += 1;
            stats.null_strike += quote.strike.is_none() as usize;
            stats.null_underlying_price += quote.underlying_price.is_none() as usize;
            stats.null_expiration += quote.expiration_date.is_none() as usize;
            stats.null_implied_volatility += quote.implied_volatility.is_none() as usize;

            quotes.push(quote);
        }

        debug!(
            rows = stats.rows,
            null_strike = stats.null_strike,
            null_price = stats.null_underlying_price,
            null_expiration = stats.null_expiration,
            "normalized option quotes"
        );

        Ok((quotes, stats))
    }

    fn normalize_row(
        &self,
        table: &RawTable,
        cols: &ColumnMap,
        row: usize,
        as_of: NaiveDate,
    ) -> Result<OptionQuote> {
        let row_no = row + 1;
        let required = |col: usize, name: &str| {
            let cell = table.cell(row, col);
            parse_required_f64(cell)
                .map_err(|reason| Error::parse(row_no, name, cell.as_text(), reason))
        };

        let bid = required(cols.bid, columns::BID)?;
        let ask = required(cols.ask, columns::ASK)?;
        let last = required(cols.last, columns::LAST)?;
        let volume = required(cols.volume, columns::VOLUME)?;
        let open_interest = required(cols.open_int, columns::OPEN_INT)?;

        let iv_cell = table.cell(row, cols.iv);
        let implied_volatility = parse_percent(iv_cell)
            .map_err(|reason| Error::parse(row_no, columns::IV, iv_cell.as_text(), reason))?;

        let delta = required(cols.delta, columns::DELTA)?;

        let strike = parse_lenient_f64(table.cell(row, cols.strike));
        let underlying_price = parse_lenient_f64(table.cell(row, cols.price));
        let expiration_date =
            parse_lenient_date(table.cell(row, cols.exp_date), &self.config.date_formats);

        let derived = DerivedFields::compute(strike, underlying_price, expiration_date, as_of);

        Ok(OptionQuote {
            symbol: table.cell(row, cols.symbol).as_text().into_owned(),
            underlying_price,
            option_type: table.cell(row, cols.option_type).as_text().into_owned(),
            strike,
            expiration_date,
            bid,
            ask,
            last,
            volume,
            open_interest,
            implied_volatility,
            delta,
            days_to_expiration: derived.days_to_expiration,
            strike_price_diff: derived.strike_price_diff,
            strike_price_diff_pct: derived.strike_price_diff_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use optflow_core::Cell;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn table_with(rows: &[[&str; 12]]) -> RawTable {
        let mut table = RawTable::new(columns::INPUT);
        for row in rows {
            table.push_row(row.iter().copied());
        }
        table
    }

    fn row<'a>(strike: &'a str, price: &'a str, iv: &'a str, volume: &'a str) -> [&'a str; 12] {
        [
            "AAPL", price, "Call", strike, "2024-01-19", "1.10", "1.20", "1.15", volume, "300",
            iv, "0.45",
        ]
    }

    #[test]
    fn test_normalize_basic_row() {
        let table = table_with(&[row("190", "185.50", "45.2%", "1200")]);
        let quotes = Normalizer::default().normalize(&table, as_of()).unwrap();

        assert_eq!(quotes.len(), 1);
        let q = &quotes[0];
        assert_eq!(q.symbol, "AAPL");
        assert_eq!(q.option_type, "Call");
        assert_eq!(q.strike, Some(190.0));
        assert_eq!(q.underlying_price, Some(185.5));
        assert_eq!(q.expiration_date, NaiveDate::from_ymd_opt(2024, 1, 19));
        assert_relative_eq!(q.volume, 1200.0);
        assert_relative_eq!(q.open_interest, 300.0);
        assert_relative_eq!(q.implied_volatility.unwrap(), 45.2);
        assert_relative_eq!(q.delta, 0.45);
        assert_eq!(q.days_to_expiration, Some(18));
        assert_eq!(q.strike_price_diff, Some(4.5));
        assert_eq!(q.strike_price_diff_pct, Some(2.43));
    }

    #[test]
    fn test_iv_with_thousands_separator() {
        let table = table_with(&[row("190", "185.50", "1,234%", "10")]);
        let quotes = Normalizer::default().normalize(&table, as_of()).unwrap();
        assert_relative_eq!(quotes[0].implied_volatility.unwrap(), 1234.0);
    }

    #[test]
    fn test_unparseable_strike_becomes_null() {
        let table = table_with(&[row("ABC", "185.50", "", "10")]);
        let (quotes, stats) = Normalizer::default()
            .normalize_with_stats(&table, as_of())
            .unwrap();

        let q = &quotes[0];
        assert_eq!(q.strike, None);
        assert_eq!(q.strike_price_diff, None);
        assert_eq!(q.strike_price_diff_pct, None);
        assert_eq!(q.implied_volatility, None);
        assert_relative_eq!(q.volume, 10.0);
        assert_eq!(stats.null_strike, 1);
        assert_eq!(stats.null_implied_volatility, 1);
        assert_eq!(stats.null_key_fields(), 1);
    }

    #[test]
    fn test_zero_price_gives_null_pct() {
        let table = table_with(&[row("190", "0", "40%", "10")]);
        let quotes = Normalizer::default().normalize(&table, as_of()).unwrap();
        assert_eq!(quotes[0].strike_price_diff, Some(190.0));
        assert_eq!(quotes[0].strike_price_diff_pct, None);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let headers: Vec<&str> = columns::INPUT
            .iter()
            .copied()
            .filter(|c| *c != columns::OPEN_INT)
            .collect();
        let table = RawTable::new(headers);
        let err = Normalizer::default().normalize(&table, as_of()).unwrap_err();
        assert!(matches!(err, Error::Schema { ref column } if column == "Open Int"));
    }

    #[test]
    fn test_column_names_are_case_exact() {
        let mut headers: Vec<String> = columns::INPUT.iter().map(|c| c.to_string()).collect();
        headers[0] = "symbol".to_string();
        let table = RawTable::new(headers);
        let err = Normalizer::default().normalize(&table, as_of()).unwrap_err();
        assert!(matches!(err, Error::Schema { ref column } if column == "Symbol"));
    }

    #[test]
    fn test_bad_required_field_fails_run() {
        let table = table_with(&[
            row("190", "185.50", "40%", "10"),
            row("195", "185.50", "40%", "lots"),
        ]);
        let err = Normalizer::default().normalize(&table, as_of()).unwrap_err();
        match err {
            Error::Parse { row, column, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Volume");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_iv_fails_run() {
        let table = table_with(&[row("190", "185.50", "high", "10")]);
        let err = Normalizer::default().normalize(&table, as_of()).unwrap_err();
        assert!(matches!(err, Error::Parse { ref column, .. } if column == "IV"));
    }

    #[test]
    fn test_numeric_cells_and_extra_columns() {
        let mut headers: Vec<&str> = columns::INPUT.to_vec();
        headers.push("Theta");
        let mut table = RawTable::new(headers);
        table.rows.push(vec![
            Cell::from("SPY"),
            Cell::Number(470.0),
            Cell::from("Put"),
            Cell::Number(465.0),
            Cell::from("01/19/2024"),
            Cell::Number(1.0),
            Cell::Number(1.1),
            Cell::Number(1.05),
            Cell::Number(-50.0),
            Cell::Number(10.0),
            Cell::Number(18.5),
            Cell::Number(-0.3),
            Cell::Number(-0.05),
        ]);

        let quotes = Normalizer::default().normalize(&table, as_of()).unwrap();
        let q = &quotes[0];
        assert_relative_eq!(q.volume, -50.0);
        assert_eq!(q.strike_price_diff, Some(-5.0));
        assert_eq!(q.strike_price_diff_pct, Some(-1.06));
        assert_eq!(q.implied_volatility, Some(18.5));
    }

    #[test]
    fn test_empty_table_normalizes_to_nothing() {
        let table = RawTable::new(columns::INPUT);
        let quotes = Normalizer::default().normalize(&table, as_of()).unwrap();
        assert!(quotes.is_empty());
    }
}
