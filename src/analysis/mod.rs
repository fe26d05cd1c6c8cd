//! Aggregation of detection snapshots.
//!
//! This module maps detection labels to chart slots and derives the
//! per-snapshot tally and log.

pub mod aggregator;
pub mod categories;

pub use aggregator::Aggregator;
pub use categories::CategoryMap;
