//! CSV bytes to raw table.

use optflow_core::{Cell, RawTable, Result};
use std::path::Path;
use tracing::debug;

/// Parse CSV bytes (header row required) into a raw table.
///
/// Record lengths may vary; header names are whitespace-trimmed.
pub fn read_csv_table(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader.headers()?.iter().map(str::to_string).collect::<Vec<_>>();
    let mut table = RawTable::new(headers);

    for record in reader.records() {
        let record = record?;
        table.rows.push(record.iter().map(Cell::from_text).collect());
    }

    debug!(columns = table.headers.len(), rows = table.len(), "read csv table");
    Ok(table)
}

/// Read and parse a CSV file into a raw table.
pub fn read_csv_path(path: impl AsRef<Path>) -> Result<RawTable> {
    let bytes = std::fs::read(path.as_ref())?;
    read_csv_table(&bytes)
}
