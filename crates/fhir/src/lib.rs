//! FHIR wire/boundary support for the allergy insights service.
//!
//! This crate provides **wire models** and **format helpers** for the flat JSON bundle that backs
//! the service:
//! - `Bundle` documents holding `AllergyIntolerance` entries
//! - a built-in sample bundle for demo deployments
//!
//! This crate focuses on:
//! - FHIR semantic alignment (without FHIR REST transport)
//! - best-effort JSON serialisation/deserialisation
//! - preserving keys it does not model, so rewrites never drop source data
//!
//! Unlike a validating FHIR library, every modelled field is optional. Callers extract what is
//! present and apply their own fallbacks.

pub mod allergy_intolerance;
pub mod bundle;
pub mod sample;

// Re-export facades
pub use allergy_intolerance::{AllergyIntolerance, CodeableConcept, Coding, Reaction, Reference};
pub use bundle::{Bundle, BundleEntry, BundleRequest};
pub use sample::sample_bundle;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Deserialise a sequence field, treating an explicit `null` the same as an absent key.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let value = <Option<Vec<T>> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
