//! Constants used throughout the allergy core crate.
//!
//! Defaults live here so the call sites that need them (config resolution, tests) name them
//! explicitly rather than repeating literals.

use std::time::Duration;

/// Default location of the backing bundle, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data_visualization/jsonResponse.json";

/// Logical cache key under which the loaded bundle is stored.
pub const ALLERGY_DATA_CACHE_KEY: &str = "allergy_data";

/// Default lifetime of a cached bundle.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60_000);

/// Default minimum size a category needs to be listed under its own name.
///
/// Smaller categories are pooled into [`OTHER_CATEGORY`].
pub const DEFAULT_OTHER_THRESHOLD: usize = 5;

/// Category name for the pooled bucket of small categories.
pub const OTHER_CATEGORY: &str = "Other";

/// Fallback for a missing category or criticality on new entries.
pub const UNKNOWN: &str = "unknown";

/// Clinical status code written on new entries.
pub const CLINICAL_STATUS_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical";
pub const CLINICAL_STATUS_ACTIVE: &str = "active";

/// Verification status code written on new entries.
pub const VERIFICATION_STATUS_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification";
pub const VERIFICATION_STATUS_CONFIRMED: &str = "confirmed";
