//! Tick outcome counters.
//!
//! Failures never reach the rendered UI. They are counted here and logged,
//! with a warning only when the source goes from healthy to failing.

use crate::error::FetchError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct PollStats {
    ticks: AtomicU64,
    applied: AtomicU64,
    empty: AtomicU64,
    stale: AtomicU64,
    transport_failures: AtomicU64,
    malformed: AtomicU64,
    healthy: AtomicBool,
}

impl Default for PollStats {
    fn default() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            empty: AtomicU64::new(0),
            stale: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            healthy: AtomicBool::new(true),
        }
    }
}

impl PollStats {
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        self.applied.fetch_add(1, Ordering::Relaxed);
        self.mark_healthy();
    }

    pub fn record_empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
        self.mark_healthy();
    }

    pub fn record_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
        self.mark_healthy();
    }

    pub fn record_failure(&self, sequence: u64, source: &str, err: &FetchError) {
        if err.is_malformed() {
            self.malformed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.transport_failures.fetch_add(1, Ordering::Relaxed);
        }

        if self.healthy.swap(false, Ordering::Relaxed) {
            warn!("Source {} unavailable: {}", source, err);
        } else {
            debug!("Tick #{} skipped: {}", sequence, err);
        }
    }

    fn mark_healthy(&self) {
        if !self.healthy.swap(true, Ordering::Relaxed) {
            info!("Source recovered");
        }
    }

    pub fn summary(&self) -> PollSummary {
        PollSummary {
            ticks: self.ticks.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// Counters at the time the loop stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub ticks: u64,
    pub applied: u64,
    pub empty: u64,
    pub stale: u64,
    pub transport_failures: u64,
    pub malformed: u64,
}

impl PollSummary {
    pub fn failures(&self) -> u64 {
        self.transport_failures + self.malformed
    }

    /// Ticks issued but never completed (aborted at shutdown).
    pub fn unfinished(&self) -> u64 {
        self.ticks
            .saturating_sub(self.applied + self.empty + self.stale + self.failures())
    }
}
