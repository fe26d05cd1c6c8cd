//! Fixed-cadence poll loop.
//!
//! Every tick gets the next sequence number and runs as its own task:
//! fetch, decode, aggregate, then hand the frame to the dashboard. The timer
//! never waits for a fetch, so slow responses overlap with later ticks; the
//! dashboard drops any frame older than the one it already shows.

use super::stats::{PollStats, PollSummary};
use crate::analysis::Aggregator;
use crate::models::{Frame, Payload};
use crate::render::{ApplyOutcome, Dashboard, TimeFormat};
use crate::source::DataSource;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Timing settings for the loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed poll period.
    pub interval: Duration,
    /// Stop after issuing this many ticks.
    pub max_ticks: Option<u64>,
    /// Clock for capture time labels.
    pub time_format: TimeFormat,
}

/// Everything one tick needs, cheap to clone into its task.
#[derive(Clone)]
struct TickContext {
    source: Arc<dyn DataSource>,
    source_name: Arc<str>,
    aggregator: Arc<Aggregator>,
    dashboard: Arc<Mutex<Dashboard>>,
    stats: Arc<PollStats>,
    time_format: TimeFormat,
}

pub struct PollLoop {
    config: PollConfig,
    ctx: TickContext,
}

impl PollLoop {
    pub fn new(
        config: PollConfig,
        source: Arc<dyn DataSource>,
        aggregator: Aggregator,
        dashboard: Arc<Mutex<Dashboard>>,
    ) -> Self {
        let source_name: Arc<str> = source.describe().into();
        let ctx = TickContext {
            source,
            source_name,
            aggregator: Arc::new(aggregator),
            dashboard,
            stats: Arc::new(PollStats::default()),
            time_format: config.time_format,
        };

        Self { config, ctx }
    }

    /// Poll until `max_ticks` ticks were issued or `shutdown` resolves.
    ///
    /// With a tick limit, in-flight ticks are allowed to finish. On shutdown
    /// they are aborted.
    pub async fn run<F>(self, shutdown: F) -> PollSummary
    where
        F: Future<Output = ()>,
    {
        info!(
            "Polling {} every {}ms",
            self.ctx.source_name,
            self.config.interval.as_millis()
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight = JoinSet::new();
        let mut sequence: u64 = 0;
        tokio::pin!(shutdown);

        let interrupted = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sequence += 1;
                    self.ctx.stats.record_tick();
                    in_flight.spawn(run_tick(self.ctx.clone(), sequence));

                    while let Some(result) = in_flight.try_join_next() {
                        log_join_error(result);
                    }

                    if self.config.max_ticks.is_some_and(|max| sequence >= max) {
                        break false;
                    }
                }
                _ = &mut shutdown => break true,
            }
        };

        if interrupted {
            info!("Shutting down, aborting {} in-flight ticks", in_flight.len());
            in_flight.shutdown().await;
        } else {
            debug!("Tick limit reached, waiting for {} in-flight ticks", in_flight.len());
            while let Some(result) = in_flight.join_next().await {
                log_join_error(result);
            }
        }

        self.ctx
            .dashboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish();

        self.ctx.stats.summary()
    }
}

/// One fetch, aggregate, render cycle.
async fn run_tick(ctx: TickContext, sequence: u64) {
    let payload = match ctx.source.fetch().await {
        Ok(payload) => payload,
        Err(err) => {
            ctx.stats.record_failure(sequence, &ctx.source_name, &err);
            return;
        }
    };

    let snapshot = match payload {
        Payload::Empty => {
            debug!("Tick #{}: no data yet", sequence);
            ctx.stats.record_empty();
            return;
        }
        Payload::Snapshot(snapshot) => snapshot,
    };

    let frame = Frame {
        timestamp_label: ctx.time_format.label(snapshot.captured_at),
        aggregate: ctx.aggregator.process(&snapshot.events),
    };

    let outcome = ctx
        .dashboard
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .apply(sequence, frame);

    match outcome {
        ApplyOutcome::Applied => {
            debug!(
                "Tick #{}: {} detections at {}",
                sequence,
                snapshot.events.len(),
                snapshot.captured_at
            );
            ctx.stats.record_applied();
        }
        ApplyOutcome::Stale => ctx.stats.record_stale(),
    }
}

fn log_join_error(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!("Tick task panicked: {}", e);
        }
    }
}
