//! Aggregation of bundle entries into display records.
//!
//! Records are grouped by category. Categories with fewer than `threshold` records are pooled
//! under [`OTHER_CATEGORY`] so the charts are not swamped by one-off groups. Sequence numbers run
//! over the final emitted order: large categories in first-seen order, then the pooled bucket.

use crate::constants::OTHER_CATEGORY;
use crate::normalize::clean_specific_reason;
use fhir::BundleEntry;

/// Flattened, display-ready allergy record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedAllergy {
    pub s_number: usize,
    pub category: String,
    pub criticality: String,
    pub specific_reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AllergyDetail {
    criticality: String,
    specific_reason: String,
}

/// Insertion-ordered mapping from category name to its records.
#[derive(Debug, Default)]
struct CategoryCounts {
    groups: Vec<(String, Vec<AllergyDetail>)>,
}

impl CategoryCounts {
    fn push(&mut self, category: &str, detail: AllergyDetail) {
        match self.groups.iter_mut().find(|(name, _)| name == category) {
            Some((_, details)) => details.push(detail),
            None => self.groups.push((category.to_string(), vec![detail])),
        }
    }
}

/// Group, bucket and number the entries of a bundle.
///
/// An entry contributes one record per category it lists, provided it has at least one
/// category, a non-empty criticality and a non-empty cleaned label. Other entries are skipped
/// without being reported.
pub fn parse_allergy_data(entries: &[BundleEntry], threshold: usize) -> Vec<ParsedAllergy> {
    let mut counts = CategoryCounts::default();

    for entry in entries {
        let resource = &entry.resource;
        let criticality = resource.criticality_str();
        let specific_reason = clean_specific_reason(resource.display_label());

        if resource.category.is_empty() || criticality.is_empty() || specific_reason.is_empty() {
            continue;
        }

        for category in &resource.category {
            counts.push(
                category,
                AllergyDetail {
                    criticality: criticality.to_string(),
                    specific_reason: specific_reason.clone(),
                },
            );
        }
    }

    let mut parsed = Vec::new();
    let mut other = Vec::new();

    for (category, details) in counts.groups {
        if details.len() < threshold {
            other.extend(details);
        } else {
            for detail in details {
                parsed.push((category.clone(), detail));
            }
        }
    }
    parsed.extend(other.into_iter().map(|d| (OTHER_CATEGORY.to_string(), d)));

    parsed
        .into_iter()
        .enumerate()
        .map(|(index, (category, detail))| ParsedAllergy {
            s_number: index + 1,
            category,
            criticality: detail.criticality,
            specific_reason: detail.specific_reason,
        })
        .collect()
}

/// Per-category totals for the visualisation page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    pub total: usize,
    /// `(criticality, count)` in first-seen order.
    pub by_criticality: Vec<(String, usize)>,
    /// `(specific_reason, count)` in first-seen order.
    pub by_reason: Vec<(String, usize)>,
}

/// Roll parsed records up by category, keeping emitted order.
pub fn summarise(allergies: &[ParsedAllergy]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();

    for allergy in allergies {
        let index = match summaries
            .iter()
            .position(|s| s.category == allergy.category)
        {
            Some(index) => index,
            None => {
                summaries.push(CategorySummary {
                    category: allergy.category.clone(),
                    total: 0,
                    by_criticality: Vec::new(),
                    by_reason: Vec::new(),
                });
                summaries.len() - 1
            }
        };

        let summary = &mut summaries[index];
        summary.total += 1;
        bump(&mut summary.by_criticality, &allergy.criticality);
        bump(&mut summary.by_reason, &allergy.specific_reason);
    }

    summaries
}

fn bump(counts: &mut Vec<(String, usize)>, key: &str) {
    match counts.iter_mut().find(|(name, _)| name == key) {
        Some((_, count)) => *count += 1,
        None => counts.push((key.to_string(), 1)),
    }
}
