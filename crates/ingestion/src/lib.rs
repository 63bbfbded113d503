//! Data ingestion and normalization for the options-flow system.
//!
//! This crate handles:
//! - CSV bytes to raw table parsing
//! - Cell coercion (required, lenient, percent, date)
//! - Schema validation and quote normalization

pub mod coerce;
pub mod normalizer;
pub mod reader;

pub use normalizer::{NormalizeStats, Normalizer};
pub use reader::{read_csv_path, read_csv_table};
