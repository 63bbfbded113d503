//! Delivery boundary for the options-flow system.
//!
//! This crate provides:
//! - Input sources (named file, latest file in a directory, in-memory bytes)
//! - Result sinks (CSV file, SQLite, in-memory)
//! - Notifiers (log, no-op, recording)
//! - The job runner wiring them around the analytics pipeline

pub mod job;
pub mod notifier;
pub mod report;
pub mod sink;
pub mod source;

pub use job::{JobReport, OptionsJob};
pub use notifier::{LogNotifier, NoopNotifier, Notifier, RecordingNotifier};
pub use report::{encode_csv, PersistedReport};
pub use sink::{CsvFileSink, MemorySink, SqliteSink, TableSink};
pub use source::{BytesSource, CsvFileSource, LatestFileSource, TableSource};
