//! Construction of new bundle entries from user input.

use crate::constants::{
    CLINICAL_STATUS_ACTIVE, CLINICAL_STATUS_SYSTEM, UNKNOWN, VERIFICATION_STATUS_CONFIRMED,
    VERIFICATION_STATUS_SYSTEM,
};
use crate::{CoreError, CoreResult};
use chrono::{DateTime, SecondsFormat, Utc};
use fhir::allergy_intolerance::ALLERGY_INTOLERANCE;
use fhir::{
    AllergyIntolerance, BundleEntry, BundleRequest, CodeableConcept, Coding, Reaction, Reference,
};
use serde::Deserialize;
use uuid::Uuid;

/// Partial record submitted through the write endpoint.
///
/// Only `specific_reason` is required. Blank optional fields are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewAllergyEntry {
    pub specific_reason: Option<String>,
    pub category: Option<String>,
    pub criticality: Option<String>,
    pub patient: Option<String>,
    pub recorder: Option<String>,
}

/// Build a complete entry with a fresh identifier and the current time.
///
/// # Errors
///
/// Returns [`CoreError::MissingField`] if `specific_reason` is absent or blank.
pub fn build_entry(input: NewAllergyEntry) -> CoreResult<BundleEntry> {
    build_entry_at(input, Uuid::new_v4(), Utc::now())
}

/// [`build_entry`] with the identifier and timestamp supplied by the caller.
pub fn build_entry_at(
    input: NewAllergyEntry,
    id: Uuid,
    recorded_at: DateTime<Utc>,
) -> CoreResult<BundleEntry> {
    let specific_reason =
        non_blank(input.specific_reason).ok_or(CoreError::MissingField("specific_reason"))?;
    let category = non_blank(input.category).unwrap_or_else(|| UNKNOWN.to_string());
    let criticality = non_blank(input.criticality).unwrap_or_else(|| UNKNOWN.to_string());
    let patient = non_blank(input.patient).unwrap_or_else(|| UNKNOWN.to_string());
    let recorder = non_blank(input.recorder).unwrap_or_else(|| UNKNOWN.to_string());

    let id = id.to_string();
    let reason_concept = || CodeableConcept::from_coding(Coding::display(&specific_reason));

    let resource = AllergyIntolerance {
        resource_type: Some(ALLERGY_INTOLERANCE.to_string()),
        id: Some(id.clone()),
        clinical_status: Some(CodeableConcept::from_coding(Coding::system_code(
            CLINICAL_STATUS_SYSTEM,
            CLINICAL_STATUS_ACTIVE,
        ))),
        verification_status: Some(CodeableConcept::from_coding(Coding::system_code(
            VERIFICATION_STATUS_SYSTEM,
            VERIFICATION_STATUS_CONFIRMED,
        ))),
        kind: Some("allergy".to_string()),
        category: vec![category],
        criticality: Some(criticality),
        code: Some(CodeableConcept {
            text: Some(specific_reason.clone()),
            ..reason_concept()
        }),
        patient: Some(Reference::to("Patient", &patient)),
        recorded_date: Some(recorded_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        recorder: Some(Reference::to("Practitioner", &recorder)),
        reaction: vec![Reaction {
            substance: Some(reason_concept()),
            manifestation: vec![reason_concept()],
            description: Some(specific_reason.clone()),
            ..Reaction::default()
        }],
        ..AllergyIntolerance::default()
    };

    Ok(BundleEntry {
        full_url: Some(format!("urn:uuid:{id}")),
        resource,
        request: Some(BundleRequest {
            method: "POST".to_string(),
            url: ALLERGY_INTOLERANCE.to_string(),
        }),
        ..BundleEntry::default()
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
