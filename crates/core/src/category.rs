//! Category correction.
//!
//! Source exports frequently file an allergen under the wrong category (foods under
//! `environment`, drug classes under `food`). Known labels are re-filed under a canonical
//! category; unknown labels keep whatever the source said.

use crate::normalize::clean_specific_reason;
use fhir::Bundle;

/// Canonical categories and the cleaned labels (lower-case) that belong to each.
///
/// Checked in order; the first category claiming a label wins.
const CATEGORY_LABELS: &[(&str, &[&str])] = &[
    (
        "food",
        &[
            "peanut",
            "egg",
            "dairy",
            "milk",
            "cow's milk",
            "shellfish",
            "shrimp",
            "fish",
            "soy",
            "soya bean",
            "wheat",
            "sesame",
            "strawberries",
            "tree nuts",
            "tree nut",
            "nut",
            "cashew nut",
        ],
    ),
    (
        "medication",
        &[
            "penicillin",
            "penicillin g",
            "penicillin v",
            "amoxicillin",
            "aspirin",
            "ibuprofen",
            "morphine",
            "codeine",
            "sulfonamide",
            "lisinopril",
            "non-steroidal anti-inflammatory agent",
        ],
    ),
    (
        "environment",
        &[
            "pollen",
            "mould",
            "mold",
            "latex",
            "bee stings",
            "bee venom",
            "dust mites",
            "house dust mite",
            "cat dander",
            "dog dander",
            "animal dander",
        ],
    ),
    ("other", &["nickel", "adhesive", "adhesive tape"]),
];

/// Canonical category for a cleaned label, if any category claims it.
///
/// Matching is case-insensitive and exact.
pub fn canonical_category(label: &str) -> Option<&'static str> {
    let label = label.trim().to_lowercase();
    CATEGORY_LABELS
        .iter()
        .find(|(_, labels)| labels.contains(&label.as_str()))
        .map(|(category, _)| *category)
}

/// Re-file a record under its canonical category.
///
/// On a match the category list is replaced by the single canonical name and `true` is returned.
/// Otherwise the list is left untouched, a warning is logged, and `false` is returned.
pub fn correct_category(label: &str, categories: &mut Vec<String>) -> bool {
    match canonical_category(label) {
        Some(category) => {
            if categories.len() != 1 || categories[0] != category {
                tracing::debug!(label, from = ?categories, to = category, "re-filing allergen");
            }
            *categories = vec![category.to_string()];
            true
        }
        None => {
            tracing::warn!(
                label,
                categories = ?categories,
                "no category mapping for allergen; keeping source category"
            );
            false
        }
    }
}

/// Outcome of correcting a whole bundle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorrectionSummary {
    /// Entries whose label matched a canonical category.
    pub corrected: usize,
    /// Entries with a non-empty label no category claimed.
    pub unmatched: usize,
}

/// Apply [`correct_category`] to every entry with a non-empty cleaned label.
pub fn correct_bundle(bundle: &mut Bundle) -> CorrectionSummary {
    let mut summary = CorrectionSummary::default();

    for entry in &mut bundle.entry {
        let label = clean_specific_reason(entry.resource.display_label());
        if label.is_empty() {
            continue;
        }
        if correct_category(&label, &mut entry.resource.category) {
            summary.corrected += 1;
        } else {
            summary.unmatched += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::{AllergyIntolerance, BundleEntry, CodeableConcept, Coding};

    fn entry(categories: &[&str], display: &str) -> BundleEntry {
        BundleEntry {
            resource: AllergyIntolerance {
                category: categories.iter().map(|c| c.to_string()).collect(),
                criticality: Some("high".into()),
                code: Some(CodeableConcept::from_coding(Coding::display(display))),
                ..AllergyIntolerance::default()
            },
            ..BundleEntry::default()
        }
    }

    #[test]
    fn looks_up_case_insensitively() {
        assert_eq!(canonical_category("Peanut"), Some("food"));
        assert_eq!(canonical_category("PENICILLIN G"), Some("medication"));
        assert_eq!(canonical_category("Pollen"), Some("environment"));
        assert_eq!(canonical_category("Nickel"), Some("other"));
        assert_eq!(canonical_category("Peanut butter"), None);
    }

    #[test]
    fn overrides_declared_category() {
        let mut categories = vec!["environment".to_string(), "food".to_string()];
        assert!(correct_category("Egg", &mut categories));
        assert_eq!(categories, vec!["food"]);
    }

    #[test]
    fn unmatched_label_keeps_source_category() {
        let mut categories = vec!["food".to_string()];
        assert!(!correct_category("Hemoglobin okaloosa", &mut categories));
        assert_eq!(categories, vec!["food"]);
    }

    #[test]
    fn corrects_whole_bundle() {
        let mut bundle = Bundle {
            entry: vec![
                entry(&["environment"], "Allergy to Eggs (substance)"),
                entry(&["food"], "Grass pollen"),
                entry(&["food"], "Hemoglobin Okaloosa"),
                entry(&["food"], "Allergy"),
            ],
            ..Bundle::default()
        };

        let summary = correct_bundle(&mut bundle);

        assert_eq!(
            summary,
            CorrectionSummary {
                corrected: 2,
                unmatched: 1
            }
        );
        assert_eq!(bundle.entry[0].resource.category, vec!["food"]);
        assert_eq!(bundle.entry[1].resource.category, vec!["environment"]);
        assert_eq!(bundle.entry[2].resource.category, vec!["food"]);
        assert_eq!(bundle.entry[3].resource.category, vec!["food"]);
    }
}
