//! FHIR-aligned AllergyIntolerance wire models.
//!
//! Responsibilities:
//! - Model the subset of the AllergyIntolerance resource the pipeline reads or writes
//! - Keep every other key in `extra` so a load/save cycle is lossless
//!
//! Notes:
//! - `category` is a list of codes (`food`, `medication`, `environment`, `biologic`, ...)
//! - `criticality` is kept as free text; source data uses `high`/`mid`/`low` as well as the
//!   FHIR codes

use crate::null_as_empty;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource type string written on every new resource.
pub const ALLERGY_INTOLERANCE: &str = "AllergyIntolerance";

/// A single code from a terminology.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Coding {
    /// A coding carrying only a display label.
    pub fn display(label: impl Into<String>) -> Self {
        Self {
            display: Some(label.into()),
            ..Self::default()
        }
    }

    /// A coding with a system and code but no display label.
    pub fn system_code(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Self::default()
        }
    }
}

/// Concept with one or more codings and optional plain text.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CodeableConcept {
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub coding: Vec<Coding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            ..Self::default()
        }
    }

    /// Display label of the first coding, if any.
    pub fn first_display(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.display.as_deref())
    }
}

/// Literal reference to another resource, e.g. `Patient/123`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reference {
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self {
            reference: Some(format!("{resource_type}/{id}")),
            ..Self::default()
        }
    }
}

/// Adverse reaction event linked to the allergy.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Reaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substance: Option<CodeableConcept>,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub manifestation: Vec<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire representation of an AllergyIntolerance resource.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AllergyIntolerance {
    #[serde(
        rename = "resourceType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(
        rename = "clinicalStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub clinical_status: Option<CodeableConcept>,

    #[serde(
        rename = "verificationStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub verification_status: Option<CodeableConcept>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub category: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Reference>,

    #[serde(
        rename = "recordedDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recorded_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorder: Option<Reference>,

    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub reaction: Vec<Reaction>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AllergyIntolerance {
    /// Raw allergen label from `code.coding[0].display`, or `""` when absent.
    pub fn display_label(&self) -> &str {
        self.code
            .as_ref()
            .and_then(CodeableConcept::first_display)
            .unwrap_or("")
    }

    /// Criticality string, or `""` when absent.
    pub fn criticality_str(&self) -> &str {
        self.criticality.as_deref().unwrap_or("")
    }
}
