//! Periodic polling.
//!
//! This module drives the fetch, aggregate, render cycle and keeps the
//! counters for every tick outcome.

pub mod poll_loop;
pub mod stats;

pub use poll_loop::{PollConfig, PollLoop};
pub use stats::PollSummary;
