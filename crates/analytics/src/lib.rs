//! Option-chain analytics for the options-flow system.
//!
//! This crate handles:
//! - Grouping quotes by contract identity
//! - Signed-split delta volume aggregation
//! - Activity / exposure filtering
//! - The end-to-end transform pipeline

pub mod aggregator;
pub mod filter;
pub mod pipeline;

pub use aggregator::Aggregator;
pub use filter::ActivityFilter;
pub use pipeline::{Pipeline, PipelineOutput, RunStats};
