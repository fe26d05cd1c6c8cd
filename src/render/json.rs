//! JSON lines output.
//!
//! Writes one JSON object per applied frame, for piping the dashboard into
//! other tools.

use super::Renderer;
use crate::analysis::CategoryMap;
use serde::Serialize;
use std::io::Write;
use tracing::warn;

#[derive(Debug, Serialize)]
struct FrameRecord<'a> {
    updated: &'a str,
    log: Vec<&'a str>,
    /// One entry per slot, in chart order.
    counts: Vec<SlotCount<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defect_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SlotCount<'a> {
    name: &'a str,
    count: u64,
}

pub struct JsonRenderer<W: Write + Send> {
    writer: W,
    names: Vec<String>,
    log_text: String,
    series: Vec<u64>,
    defect_rate: Option<f64>,
    timestamp_label: String,
}

impl<W: Write + Send> JsonRenderer<W> {
    pub fn new(categories: &CategoryMap, writer: W) -> Self {
        Self {
            writer,
            names: categories.names().into_iter().map(String::from).collect(),
            log_text: String::new(),
            series: vec![0; categories.len()],
            defect_rate: None,
            timestamp_label: String::new(),
        }
    }

    fn write_record(&mut self) -> std::io::Result<()> {
        let record = FrameRecord {
            updated: &self.timestamp_label,
            log: self.log_text.lines().collect(),
            counts: self
                .names
                .iter()
                .zip(&self.series)
                .map(|(name, &count)| SlotCount {
                    name: name.as_str(),
                    count,
                })
                .collect(),
            defect_rate: self.defect_rate,
        };

        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn set_log_text(&mut self, text: &str) {
        self.log_text = text.to_string();
    }

    fn set_series(&mut self, values: &[u64], defect_rate: Option<f64>) {
        self.series = values.to_vec();
        self.defect_rate = defect_rate;
    }

    fn set_timestamp_label(&mut self, label: &str) {
        self.timestamp_label = label.to_string();
    }

    fn present(&mut self) {
        if let Err(e) = self.write_record() {
            warn!("Failed to write frame: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_categories, CategoryConfig};
    use crate::models::CategoryKind;
    use serde_json::Value;

    fn renderer() -> JsonRenderer<Vec<u8>> {
        JsonRenderer::new(&CategoryMap::new(&default_categories()).unwrap(), Vec::new())
    }

    #[test]
    fn test_present_writes_one_line() {
        let mut renderer = renderer();
        renderer.set_log_text("product_A (confidence: 0.93)\ndefect_B (confidence: 0.41)");
        renderer.set_series(&[1, 1], Some(0.5));
        renderer.set_timestamp_label("Updated: 22:13:20");
        renderer.present();

        let output = String::from_utf8(renderer.writer.clone()).unwrap();
        assert_eq!(output.lines().count(), 1);

        let record: Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(record["updated"], "Updated: 22:13:20");
        assert_eq!(record["log"][1], "defect_B (confidence: 0.41)");
        assert_eq!(record["counts"][0]["name"], "Product A");
        assert_eq!(record["counts"][0]["count"], 1);
        assert_eq!(record["counts"][1]["name"], "Defect B");
        assert_eq!(record["counts"][1]["count"], 1);
        assert_eq!(record["defect_rate"], 0.5);
    }

    #[test]
    fn test_counts_keep_slot_order() {
        let categories = CategoryMap::new(&[
            CategoryConfig {
                name: "Zeta".to_string(),
                labels: vec!["z".to_string()],
                kind: CategoryKind::Normal,
            },
            CategoryConfig {
                name: "Alpha".to_string(),
                labels: vec!["a".to_string()],
                kind: CategoryKind::Defect,
            },
        ])
        .unwrap();
        let mut renderer = JsonRenderer::new(&categories, Vec::new());
        renderer.set_log_text("");
        renderer.set_series(&[3, 4], Some(4.0 / 7.0));
        renderer.set_timestamp_label("Updated: 00:00:07");
        renderer.present();

        let record: Value = serde_json::from_slice(&renderer.writer).unwrap();
        let counts = record["counts"].as_array().unwrap();
        let names: Vec<&str> = counts.iter().map(|c| c["name"].as_str().unwrap()).collect();
        let total: u64 = counts.iter().map(|c| c["count"].as_u64().unwrap()).sum();

        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(total, 7);
    }

    #[test]
    fn test_nothing_written_before_present() {
        let mut renderer = renderer();
        renderer.set_log_text("x (confidence: 0.10)");
        renderer.set_series(&[0, 0], None);
        assert!(renderer.writer.is_empty());
    }

    #[test]
    fn test_empty_frame() {
        let mut renderer = renderer();
        renderer.set_log_text("");
        renderer.set_series(&[0, 0], None);
        renderer.set_timestamp_label("Updated: 00:00:00");
        renderer.present();

        let record: Value = serde_json::from_slice(&renderer.writer).unwrap();
        assert_eq!(record["log"], Value::Array(vec![]));
        assert!(record.get("defect_rate").is_none());
    }
}
