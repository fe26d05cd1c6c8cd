//! Label to slot mapping for the tally.

use crate::config::CategoryConfig;
use crate::error::ConfigError;
use crate::models::CategoryKind;
use std::collections::HashMap;

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Display name.
    pub name: String,
    /// Whether hits in this slot count as defects.
    pub kind: CategoryKind,
}

/// Maps detection labels to tally slots.
///
/// Slot indices follow configuration order. Display names are unique.
/// Several labels may share a slot, but a label belongs to at most one.
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl CategoryMap {
    /// Build a map from configured categories.
    pub fn new(categories: &[CategoryConfig]) -> Result<Self, ConfigError> {
        if categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut slots = Vec::with_capacity(categories.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for (slot, category) in categories.iter().enumerate() {
            if slots.iter().any(|s: &Slot| s.name == category.name) {
                return Err(ConfigError::DuplicateName(category.name.clone()));
            }

            if category.labels.iter().all(|l| l.is_empty()) {
                return Err(ConfigError::EmptyCategory(category.name.clone()));
            }

            for label in category.labels.iter().filter(|l| !l.is_empty()) {
                if let Some(&existing) = index.get(label) {
                    if existing != slot {
                        return Err(ConfigError::DuplicateLabel {
                            label: label.clone(),
                            first: categories[existing].name.clone(),
                            second: category.name.clone(),
                        });
                    }
                    continue;
                }
                index.insert(label.clone(), slot);
            }

            slots.push(Slot {
                name: category.name.clone(),
                kind: category.kind,
            });
        }

        Ok(Self { slots, index })
    }

    /// Slot index for a label, if it is tallied.
    pub fn slot_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Display names in slot order.
    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_categories;

    fn category(name: &str, labels: &[&str], kind: CategoryKind) -> CategoryConfig {
        CategoryConfig {
            name: name.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            kind,
        }
    }

    #[test]
    fn test_default_categories_map() {
        let map = CategoryMap::new(&default_categories()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.slot_of("product_A"), Some(0));
        assert_eq!(map.slot_of("defect_B"), Some(1));
        assert_eq!(map.names(), vec!["Product A", "Defect B"]);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let map = CategoryMap::new(&default_categories()).unwrap();
        assert_eq!(map.slot_of("Product_A"), None);
        assert_eq!(map.slot_of("defect_b"), None);
        assert_eq!(map.slot_of("unknown_thing"), None);
    }

    #[test]
    fn test_several_labels_share_a_slot() {
        let map = CategoryMap::new(&[
            category("Good", &["product_A"], CategoryKind::Normal),
            category("Defects", &["V_defect", "W_defect"], CategoryKind::Defect),
        ])
        .unwrap();

        assert_eq!(map.slot_of("V_defect"), Some(1));
        assert_eq!(map.slot_of("W_defect"), Some(1));
        assert_eq!(map.slots()[1].kind, CategoryKind::Defect);
    }

    #[test]
    fn test_rejects_duplicate_label() {
        let err = CategoryMap::new(&[
            category("Defect B", &["defect_B"], CategoryKind::Defect),
            category("Scrap", &["defect_B"], CategoryKind::Defect),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::DuplicateLabel {
                label: "defect_B".to_string(),
                first: "Defect B".to_string(),
                second: "Scrap".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_name() {
        let err = CategoryMap::new(&[
            category("Defects", &["V_defect"], CategoryKind::Defect),
            category("Defects", &["W_defect"], CategoryKind::Defect),
        ])
        .unwrap_err();

        assert_eq!(err, ConfigError::DuplicateName("Defects".to_string()));
    }

    #[test]
    fn test_rejects_empty_configuration() {
        assert_eq!(CategoryMap::new(&[]).unwrap_err(), ConfigError::NoCategories);

        let err = CategoryMap::new(&[category("Nothing", &[""], CategoryKind::Normal)]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyCategory("Nothing".to_string()));
    }
}
