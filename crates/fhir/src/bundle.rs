//! FHIR-aligned Bundle wire model and JSON translation helpers.
//!
//! The backing file is a single Bundle document. Only `entry` is guaranteed: a document without
//! one (or with `"entry": null`) parses as an empty bundle, and rendering always writes the key.
//!
//! Entries are read one at a time. An entry whose modelled fields have unexpected types is kept
//! as raw JSON and written back unchanged, so one foreign resource never hides the rest.

use crate::{AllergyIntolerance, FhirError, FhirResult};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Root document holding an ordered sequence of entries.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Bundle {
    #[serde(
        rename = "resourceType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_entries",
        serialize_with = "render_entries"
    )]
    pub entry: Vec<BundleEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a bundle. The resource is read as an AllergyIntolerance on a best-effort basis.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct BundleEntry {
    #[serde(rename = "fullUrl", default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(default)]
    pub resource: AllergyIntolerance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleRequest>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// The entry as it appeared in the source document, when it could not be read as an
    /// AllergyIntolerance entry. Such entries carry a default resource and are rendered from
    /// this value.
    #[serde(skip)]
    pub unreadable: Option<Value>,
}

impl BundleEntry {
    /// Read one entry, keeping the raw JSON when the modelled fields do not fit.
    fn from_value(index: usize, value: Value) -> Self {
        match serde_path_to_error::deserialize::<_, BundleEntry>(&value) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(
                    "skipping unreadable bundle entry {} at {}: {}",
                    index,
                    err.path(),
                    err.inner()
                );
                Self {
                    unreadable: Some(value),
                    ..Self::default()
                }
            }
        }
    }

    /// True when the entry could not be read and is only carried through to the next write.
    pub fn is_unreadable(&self) -> bool {
        self.unreadable.is_some()
    }
}

fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<BundleEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(index, value)| BundleEntry::from_value(index, value))
        .collect())
}

fn render_entries<S>(entries: &[BundleEntry], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
    for entry in entries {
        match &entry.unreadable {
            Some(raw) => seq.serialize_element(raw)?,
            None => seq.serialize_element(entry)?,
        }
    }
    seq.end()
}

/// Transaction request details attached to an entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BundleRequest {
    pub method: String,
    pub url: String,
}

impl Bundle {
    /// An empty bundle (`{"entry": []}`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a bundle from JSON text.
    ///
    /// Mismatches inside a single entry only mark that entry unreadable. Uses
    /// `serde_path_to_error` to surface a best-effort path to a document-level mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if the text is not JSON at all, and
    /// [`FhirError::Translation`] if the document itself has the wrong shape (for example an
    /// `entry` that is not a list).
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let bundle = match serde_path_to_error::deserialize::<_, Bundle>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                if source.is_syntax() || source.is_eof() {
                    return Err(FhirError::InvalidInput(format!(
                        "bundle is not valid JSON: {source}"
                    )));
                }
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Bundle schema mismatch at {path}: {source}"
                )));
            }
        };
        deserializer.end()?;

        Ok(bundle)
    }

    /// Render the bundle as pretty-printed JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render(&self) -> FhirResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise bundle: {e}")))
    }

    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }
}
