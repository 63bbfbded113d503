//! Result table CSV encoding.

use optflow_core::{columns, Error, OptionGroupSummary, Result};

/// A persisted result table.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedReport {
    /// File name of the result.
    pub name: String,
    /// Where the sink put it (path, database locator, ...).
    pub location: String,
    /// Encoded CSV bytes, for attaching to notifications.
    pub bytes: Vec<u8>,
    /// Number of result rows.
    pub rows: usize,
}

/// Encode summaries as CSV with the result-table header.
///
/// The header is written even when there are no rows; nulls are empty fields.
pub fn encode_csv(summaries: &[OptionGroupSummary]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(columns::OUTPUT)?;
    for summary in summaries {
        writer.serialize(summary)?;
    }

    writer.into_inner().map_err(|e| Error::sink(e.to_string()))
}

/// Decode a result CSV produced by [`encode_csv`].
pub fn decode_csv(bytes: &[u8]) -> Result<Vec<OptionGroupSummary>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<OptionGroupSummary>, _>>()?;
    Ok(rows)
}

/// Build a report from summaries under the given name and location.
pub fn build_report(
    name: &str,
    location: impl Into<String>,
    summaries: &[OptionGroupSummary],
) -> Result<PersistedReport> {
    Ok(PersistedReport {
        name: name.to_string(),
        location: location.into(),
        bytes: encode_csv(summaries)?,
        rows: summaries.len(),
    })
}
