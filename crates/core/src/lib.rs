//! Core types and configuration for the options-flow system.
//!
//! This crate provides shared types used across all other crates:
//! - Raw table and normalized quote types
//! - Contract group keys and summaries
//! - Derived diagnostic formulas
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod derive;
pub mod error;
pub mod types;

pub use config::{Config, FilterConfig, OutputConfig, ParseConfig};
pub use derive::DerivedFields;
pub use error::{Error, Result};
pub use types::*;
