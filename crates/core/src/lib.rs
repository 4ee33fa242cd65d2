//! # Allergy Core
//!
//! Core business logic for the allergy insights service.
//!
//! This crate contains the data pipeline and its storage seams:
//! - Label cleaning ([`normalize`]) and category correction ([`category`])
//! - Grouping into display records with "Other" bucketing ([`aggregate`])
//! - Cached reads and append-only writes of the backing bundle ([`source`])
//! - Construction of new entries from partial user input ([`entry`])
//!
//! **No API concerns**: HTTP routing, page rendering and request parsing belong in `api-rest`.

pub mod aggregate;
pub mod cache;
pub mod category;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod normalize;
pub mod source;
pub mod store;

pub use aggregate::{parse_allergy_data, summarise, CategorySummary, ParsedAllergy};
pub use cache::{BundleCache, MemoryCache};
pub use category::{correct_bundle, correct_category, CorrectionSummary};
pub use config::{CoreConfig, DataMode};
pub use constants::{DEFAULT_CACHE_TTL, DEFAULT_DATA_FILE, DEFAULT_OTHER_THRESHOLD};
pub use entry::{build_entry, NewAllergyEntry};
pub use error::{CoreError, CoreResult};
pub use normalize::clean_specific_reason;
pub use source::AllergyDataSource;
pub use store::{BundleStore, JsonFileStore, MemoryStore};
