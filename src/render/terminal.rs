//! Live terminal dashboard.
//!
//! Draws a header line, one horizontal bar per category and the event log
//! using `indicatif`. Bars are scaled to the tally total, so their lengths
//! show each category's share of the latest snapshot. Log output shares the
//! terminal through [`LogWriter`], which clears the bars around each line.

use super::Renderer;
use crate::analysis::CategoryMap;
use crate::models::CategoryKind;
use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;

const WAITING_MESSAGE: &str = "Waiting for data...";
const NO_DETECTIONS: &str = "(no detections)";

pub struct TerminalRenderer {
    header: ProgressBar,
    bars: Vec<ProgressBar>,
    log: ProgressBar,
    max_log_lines: usize,
    timestamp_label: String,
    defect_rate: Option<f64>,
    // Keeps the draw target alive for the bars above.
    _multi: MultiProgress,
}

impl TerminalRenderer {
    /// Renderer drawing onto `multi`.
    ///
    /// Pass the same `MultiProgress` to a [`LogWriter`] so log lines do not
    /// tear the bars.
    pub fn new(categories: &CategoryMap, max_log_lines: usize, multi: MultiProgress) -> Result<Self> {
        let text_style = ProgressStyle::with_template("{msg}").context("Invalid text template")?;

        let header = multi.add(ProgressBar::new(0));
        header.set_style(text_style.clone());
        header.set_message(WAITING_MESSAGE);

        let mut bars = Vec::with_capacity(categories.len());
        for slot in categories.slots() {
            let template = match slot.kind {
                CategoryKind::Normal => "{prefix:>14} [{bar:40.cyan/blue}] {pos:>5}",
                CategoryKind::Defect => "{prefix:>14} [{bar:40.red/white}] {pos:>5}",
            };
            let style = ProgressStyle::with_template(template)
                .context("Invalid bar template")?
                .progress_chars("#>-");

            let bar = multi.add(ProgressBar::new(1));
            bar.set_style(style);
            bar.set_prefix(slot.name.clone());
            bars.push(bar);
        }

        let log = multi.add(ProgressBar::new(0));
        log.set_style(text_style);

        Ok(Self {
            header,
            bars,
            log,
            max_log_lines,
            timestamp_label: String::new(),
            defect_rate: None,
            _multi: multi,
        })
    }
}

impl Renderer for TerminalRenderer {
    fn set_log_text(&mut self, text: &str) {
        self.log.set_message(visible_log(text, self.max_log_lines));
    }

    fn set_series(&mut self, values: &[u64], defect_rate: Option<f64>) {
        let total: u64 = values.iter().sum();
        for (bar, value) in self.bars.iter().zip(values) {
            bar.set_length(total.max(1));
            bar.set_position(*value);
        }
        self.defect_rate = defect_rate;
    }

    fn set_timestamp_label(&mut self, label: &str) {
        self.timestamp_label = label.to_string();
    }

    fn present(&mut self) {
        self.header
            .set_message(header_line(&self.timestamp_label, self.defect_rate));
    }

    fn finish(&mut self) {
        self.header.finish();
        for bar in &self.bars {
            bar.finish();
        }
        self.log.finish();
    }
}

/// Log sink that hides the live bars while a line goes to stderr.
#[derive(Clone)]
pub struct LogWriter {
    multi: MultiProgress,
}

impl LogWriter {
    pub fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multi.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn header_line(timestamp_label: &str, defect_rate: Option<f64>) -> String {
    match defect_rate {
        Some(rate) => format!("{}  |  defect rate: {:.1}%", timestamp_label, rate * 100.0),
        None => format!("{}  |  defect rate: -", timestamp_label),
    }
}

/// Log text limited to `max_lines` lines (0 = unlimited).
fn visible_log(text: &str, max_lines: usize) -> String {
    if text.is_empty() {
        return NO_DETECTIONS.to_string();
    }

    let total = text.lines().count();
    if max_lines == 0 || total <= max_lines {
        return text.to_string();
    }

    let mut shown: Vec<&str> = text.lines().take(max_lines).collect();
    let more = format!("... {} more", total - max_lines);
    shown.push(&more);
    shown.join("\n")
}
