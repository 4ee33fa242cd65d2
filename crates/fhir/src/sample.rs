//! Built-in demo dataset.
//!
//! Served instead of the backing file when sample mode is switched on, so the pages can be
//! previewed without a real export.

use crate::{AllergyIntolerance, Bundle, BundleEntry, CodeableConcept, Coding};

const SAMPLE_RECORDS: &[(&str, &str, &str)] = &[
    ("medication", "high", "Penicillin G"),
    ("food", "high", "Hemoglobin Okaloosa"),
    ("environment", "low", "Mould"),
    ("environment", "high", "Pollen"),
    ("medication", "low", "Aspirin"),
    ("medication", "mid", "Aspirin"),
    ("medication", "high", "Ibuprofen"),
    ("food", "high", "Peanuts"),
    ("food", "low", "Dairy"),
    ("food", "high", "Shellfish"),
    ("food", "mid", "Eggs"),
    ("environment", "high", "Bee stings"),
    ("environment", "low", "Latex"),
    ("food", "high", "Strawberries"),
    ("food", "high", "Tree nuts"),
    ("food", "low", "Soy"),
    ("environment", "low", "Dust mites"),
    ("environment", "high", "Cat dander"),
    ("food", "high", "Fish"),
    ("medication", "high", "Morphine"),
    ("food", "low", "Eggs"),
    ("environment", "low", "Grass pollen"),
];

/// The demo bundle: 22 AllergyIntolerance entries across food, medication and environment.
pub fn sample_bundle() -> Bundle {
    Bundle {
        entry: SAMPLE_RECORDS
            .iter()
            .map(|(category, criticality, display)| sample_entry(category, criticality, display))
            .collect(),
        ..Bundle::default()
    }
}

fn sample_entry(category: &str, criticality: &str, display: &str) -> BundleEntry {
    BundleEntry {
        resource: AllergyIntolerance {
            category: vec![category.to_string()],
            criticality: Some(criticality.to_string()),
            code: Some(CodeableConcept::from_coding(Coding::display(display))),
            ..AllergyIntolerance::default()
        },
        ..BundleEntry::default()
    }
}
