//! Snapshot aggregation.
//!
//! Turns the event list of one snapshot into the log text and the per-slot
//! counts shown on the dashboard. The tally is rebuilt from scratch on every
//! call; nothing carries over between snapshots.

use super::categories::CategoryMap;
use crate::models::{Aggregate, CategoryKind, DetectionEvent};

/// Pure event-list to aggregate transformation.
#[derive(Debug, Clone)]
pub struct Aggregator {
    categories: CategoryMap,
}

impl Aggregator {
    pub fn new(categories: CategoryMap) -> Self {
        Self { categories }
    }

    /// Aggregate one snapshot's events.
    ///
    /// Every event contributes a log line. Only events whose label is in the
    /// category map contribute to a count. Duplicates are counted
    /// independently.
    pub fn process(&self, events: &[DetectionEvent]) -> Aggregate {
        let mut counts = vec![0u64; self.categories.len()];
        let mut lines = Vec::with_capacity(events.len());

        for event in events {
            lines.push(event.log_line());
            if let Some(slot) = self.categories.slot_of(&event.category) {
                counts[slot] += 1;
            }
        }

        let defect_rate = self.defect_rate(&counts);

        Aggregate {
            log_text: lines.join("\n"),
            counts,
            defect_rate,
        }
    }

    /// Share of tallied events in defect slots, `None` when nothing was tallied.
    fn defect_rate(&self, counts: &[u64]) -> Option<f64> {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return None;
        }

        let defects: u64 = self
            .categories
            .slots()
            .iter()
            .zip(counts)
            .filter(|(slot, _)| slot.kind == CategoryKind::Defect)
            .map(|(_, count)| *count)
            .sum();

        Some(defects as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_categories;

    fn reference_aggregator() -> Aggregator {
        Aggregator::new(CategoryMap::new(&default_categories()).unwrap())
    }

    fn reference_events() -> Vec<DetectionEvent> {
        vec![
            DetectionEvent::new("product_A", 0.93),
            DetectionEvent::new("defect_B", 0.41),
            DetectionEvent::new("defect_B", 0.77),
        ]
    }

    #[test]
    fn test_reference_snapshot() {
        let aggregate = reference_aggregator().process(&reference_events());

        assert_eq!(aggregate.counts, vec![1, 2]);
        assert_eq!(
            aggregate.log_text,
            "product_A (confidence: 0.93)\n\
             defect_B (confidence: 0.41)\n\
             defect_B (confidence: 0.77)"
        );
    }

    #[test]
    fn test_empty_events() {
        let aggregate = reference_aggregator().process(&[]);

        assert_eq!(aggregate.log_text, "");
        assert_eq!(aggregate.counts, vec![0, 0]);
        assert_eq!(aggregate.defect_rate, None);
    }

    #[test]
    fn test_unknown_label_is_logged_not_counted() {
        let events = vec![
            DetectionEvent::new("unknown_thing", 0.5),
            DetectionEvent::new("product_A", 0.9),
        ];
        let aggregate = reference_aggregator().process(&events);

        assert!(aggregate.log_text.contains("unknown_thing (confidence: 0.50)"));
        assert_eq!(aggregate.counts, vec![1, 0]);
        assert_eq!(aggregate.counts.iter().sum::<u64>(), 1);
    }

    #[test]
    fn test_only_unknown_labels_has_no_defect_rate() {
        let aggregate = reference_aggregator().process(&[DetectionEvent::new("scratch", 0.3)]);
        assert_eq!(aggregate.counts, vec![0, 0]);
        assert_eq!(aggregate.defect_rate, None);
        assert_eq!(aggregate.log_text, "scratch (confidence: 0.30)");
    }

    #[test]
    fn test_duplicates_are_counted_independently() {
        let events = vec![DetectionEvent::new("defect_B", 0.6); 4];
        let aggregate = reference_aggregator().process(&events);

        assert_eq!(aggregate.counts, vec![0, 4]);
        assert_eq!(aggregate.log_text.lines().count(), 4);
    }

    #[test]
    fn test_process_is_idempotent() {
        let aggregator = reference_aggregator();
        let events = reference_events();

        let first = aggregator.process(&events);
        let second = aggregator.process(&events);

        assert_eq!(first, second);
    }

    #[test]
    fn test_counts_bounded_by_input_length() {
        let events = vec![
            DetectionEvent::new("product_A", 0.1),
            DetectionEvent::new("Product_A", 0.2),
            DetectionEvent::new("defect_B", 0.3),
            DetectionEvent::new("other", 0.4),
        ];
        let aggregate = reference_aggregator().process(&events);

        assert_eq!(aggregate.counts, vec![1, 1]);
        assert!(aggregate.counts.iter().sum::<u64>() <= events.len() as u64);
    }

    #[test]
    fn test_defect_rate() {
        let aggregate = reference_aggregator().process(&reference_events());
        let rate = aggregate.defect_rate.unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }
}
