//! Data models for the inspection dashboard.
//!
//! This module contains the core data structures that flow through one
//! poll cycle: detection events, snapshots, and the aggregated frame that
//! ends up on screen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a tallied category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Normal classification (good product).
    Normal,
    /// Defect classification, counted towards the defect rate.
    Defect,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Normal => write!(f, "normal"),
            CategoryKind::Defect => write!(f, "defect"),
        }
    }
}

/// A single classified observation reported by the detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Class label, e.g. `product_A` or `defect_B`.
    #[serde(rename = "class")]
    pub category: String,
    /// Confidence score, nominally in [0, 1]. Not validated.
    pub confidence: f64,
}

impl DetectionEvent {
    /// Creates a new detection event.
    pub fn new(category: impl Into<String>, confidence: f64) -> Self {
        Self {
            category: category.into(),
            confidence,
        }
    }

    /// Returns the log line for this event.
    pub fn log_line(&self) -> String {
        format!(
            "{} (confidence: {})",
            self.category,
            two_decimals(self.confidence)
        )
    }
}

/// Formats with two decimals, rounding exact halves away from zero.
///
/// `{:.2}` breaks ties to even, so 0.125 would print as 0.12. A value sits
/// exactly halfway between two hundredths only when it is an odd multiple
/// of 1/8.
fn two_decimals(value: f64) -> String {
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return format!("{:.2}", (value * 100.0).round() / 100.0);
    }
    format!("{:.2}", value)
}

/// The detection events of one poll plus the capture timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capture time in seconds since the Unix epoch.
    #[serde(rename = "timestamp")]
    pub captured_at: i64,
    /// Events in detection order. May be empty.
    #[serde(rename = "detections")]
    pub events: Vec<DetectionEvent>,
}

/// A decoded poll response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The backend has no data yet (`{}`).
    Empty,
    /// A populated snapshot.
    Snapshot(Snapshot),
}

/// Result of aggregating one snapshot's events.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// One line per event, in input order.
    pub log_text: String,
    /// Count per category slot.
    pub counts: Vec<u64>,
    /// Share of tallied events that fell into defect slots.
    pub defect_rate: Option<f64>,
}

/// Everything the dashboard needs to draw one update.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Human-readable capture time.
    pub timestamp_label: String,
    pub aggregate: Aggregate,
}
