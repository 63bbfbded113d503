//! Error types for the options-flow system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the options-flow system.
#[derive(Error, Debug)]
pub enum Error {
    /// A required input column is missing.
    #[error("Schema error: missing required column '{column}'")]
    Schema { column: String },

    /// A required field could not be coerced.
    ///
    /// `row` is the 1-based data row number (the header is not counted).
    #[error("Parse error at row {row}, column '{column}': cannot parse {value:?} ({reason})")]
    Parse {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input source error (file not found, empty container, ...).
    #[error("Source error: {0}")]
    Source(String),

    /// Output sink error.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Notification delivery error.
    #[error("Notify error: {0}")]
    Notify(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// CSV encoding/decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a schema error for a missing column.
    pub fn schema(column: impl Into<String>) -> Self {
        Error::Schema {
            column: column.into(),
        }
    }

    /// Create a parse error for a required field.
    pub fn parse(
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Parse {
            row,
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a source error.
    pub fn source_err(msg: impl Into<String>) -> Self {
        Error::Source(msg.into())
    }

    /// Create a sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Error::Sink(msg.into())
    }

    /// Create a notify error.
    pub fn notify(msg: impl Into<String>) -> Self {
        Error::Notify(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Is this a schema or parse failure of the input table?
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Schema { .. } | Error::Parse { .. })
    }
}
