//! Render surfaces and the dashboard state they display.
//!
//! The poll loop never talks to a [`Renderer`] directly. It hands finished
//! frames to a [`Dashboard`], which owns the [`DisplayState`], drops frames
//! that arrive out of issue order, and forwards the rest to the renderer.

pub mod json;
pub mod terminal;

pub use json::JsonRenderer;
pub use terminal::{LogWriter, TerminalRenderer};

use crate::models::Frame;
use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::debug;

/// A presentation surface.
///
/// Calls arrive in the order `set_log_text`, `set_series`,
/// `set_timestamp_label`, `present`, once per applied frame.
pub trait Renderer: Send {
    /// Replace the event log region.
    fn set_log_text(&mut self, text: &str);

    /// Replace the chart series, one value per category slot.
    fn set_series(&mut self, values: &[u64], defect_rate: Option<f64>);

    /// Replace the "last updated" label.
    fn set_timestamp_label(&mut self, label: &str);

    /// Redraw after a complete frame.
    fn present(&mut self) {}

    /// Release the surface when the dashboard stops.
    fn finish(&mut self) {}
}

/// What is currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub timestamp_label: String,
    pub log_text: String,
    pub series: Vec<u64>,
    pub defect_rate: Option<f64>,
    /// Sequence number of the frame shown, 0 before the first frame.
    pub sequence: u64,
}

impl DisplayState {
    /// Blank state with one zeroed bar per slot.
    pub fn empty(slots: usize) -> Self {
        Self {
            timestamp_label: String::new(),
            log_text: String::new(),
            series: vec![0; slots],
            defect_rate: None,
            sequence: 0,
        }
    }
}

/// Result of offering a frame to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer frame was already shown.
    Stale,
}

/// Render adapter: owns the display state and its renderer.
pub struct Dashboard {
    state: DisplayState,
    renderer: Box<dyn Renderer>,
}

impl Dashboard {
    pub fn new(slots: usize, renderer: Box<dyn Renderer>) -> Self {
        Self {
            state: DisplayState::empty(slots),
            renderer,
        }
    }

    /// Show `frame` unless a frame issued after `sequence` is already shown.
    pub fn apply(&mut self, sequence: u64, frame: Frame) -> ApplyOutcome {
        if sequence < self.state.sequence {
            debug!(
                "Dropping frame #{} (showing #{})",
                sequence, self.state.sequence
            );
            return ApplyOutcome::Stale;
        }

        let Frame {
            timestamp_label,
            aggregate,
        } = frame;

        self.renderer.set_log_text(&aggregate.log_text);
        self.renderer
            .set_series(&aggregate.counts, aggregate.defect_rate);
        self.renderer.set_timestamp_label(&timestamp_label);
        self.renderer.present();

        self.state = DisplayState {
            timestamp_label,
            log_text: aggregate.log_text,
            series: aggregate.counts,
            defect_rate: aggregate.defect_rate,
            sequence,
        };

        ApplyOutcome::Applied
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn finish(&mut self) {
        self.renderer.finish();
    }
}

/// Clock used for capture time labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    #[default]
    Local,
    Utc,
}

impl TimeFormat {
    pub fn from_utc_flag(utc: bool) -> Self {
        if utc {
            TimeFormat::Utc
        } else {
            TimeFormat::Local
        }
    }

    /// `"Updated: HH:MM:SS"` for a capture time in epoch seconds.
    pub fn label(&self, captured_at: i64) -> String {
        let clock = match self {
            TimeFormat::Local => Local
                .timestamp_opt(captured_at, 0)
                .single()
                .map(|t| clock_time(&t)),
            TimeFormat::Utc => Utc
                .timestamp_opt(captured_at, 0)
                .single()
                .map(|t| clock_time(&t)),
        };

        match clock {
            Some(clock) => format!("Updated: {}", clock),
            None => format!("Updated: {}s", captured_at),
        }
    }
}

fn clock_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M:%S").to_string()
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingRenderer};
    use super::*;
    use crate::models::Aggregate;

    fn frame(label: &str, log: &str, counts: Vec<u64>) -> Frame {
        Frame {
            timestamp_label: label.to_string(),
            aggregate: Aggregate {
                log_text: log.to_string(),
                counts,
                defect_rate: None,
            },
        }
    }

    #[test]
    fn test_apply_pushes_in_order() {
        let renderer = RecordingRenderer::default();
        let mut dashboard = Dashboard::new(2, Box::new(renderer.clone()));

        let outcome = dashboard.apply(1, frame("Updated: 22:13:20", "product_A (confidence: 0.93)", vec![1, 0]));

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(
            renderer.calls(),
            vec![
                Call::LogText("product_A (confidence: 0.93)".to_string()),
                Call::Series(vec![1, 0]),
                Call::Timestamp("Updated: 22:13:20".to_string()),
                Call::Present,
            ]
        );
        assert_eq!(dashboard.state().series, vec![1, 0]);
        assert_eq!(dashboard.state().sequence, 1);
    }

    #[test]
    fn test_stale_frame_is_dropped() {
        let renderer = RecordingRenderer::default();
        let mut dashboard = Dashboard::new(2, Box::new(renderer.clone()));

        dashboard.apply(5, frame("Updated: 10:00:05", "new", vec![3, 1]));
        let before = dashboard.state().clone();
        let calls_before = renderer.calls().len();

        let outcome = dashboard.apply(4, frame("Updated: 10:00:04", "old", vec![9, 9]));

        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(dashboard.state(), &before);
        assert_eq!(renderer.calls().len(), calls_before);
    }

    #[test]
    fn test_initial_state_is_blank() {
        let dashboard = Dashboard::new(3, Box::new(RecordingRenderer::default()));
        assert_eq!(dashboard.state(), &DisplayState::empty(3));
        assert_eq!(dashboard.state().series, vec![0, 0, 0]);
    }

    #[test]
    fn test_utc_label() {
        assert_eq!(TimeFormat::Utc.label(1_700_000_000), "Updated: 22:13:20");
        assert_eq!(TimeFormat::Utc.label(0), "Updated: 00:00:00");
    }

    #[test]
    fn test_unrepresentable_timestamp_falls_back() {
        assert_eq!(TimeFormat::Utc.label(i64::MAX), format!("Updated: {}s", i64::MAX));
    }

    #[test]
    fn test_local_label_shape() {
        let label = TimeFormat::Local.label(1_700_000_000);
        assert!(label.starts_with("Updated: "));
        assert_eq!(label.len(), "Updated: HH:MM:SS".len());
    }
}
