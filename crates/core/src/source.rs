//! Allergy data source: cached reads and append-only writes over a [`BundleStore`].
//!
//! Reads go through the cache; a miss loads from storage, optionally re-files categories, and
//! caches the result. Writes always start from storage so they see the latest document, then
//! drop the cached copy.
//!
//! There is no locking around the read-modify-write in [`AllergyDataSource::append`]; two
//! concurrent appends can lose one of the entries.

use crate::aggregate::{parse_allergy_data, ParsedAllergy};
use crate::cache::{BundleCache, MemoryCache};
use crate::category::correct_bundle;
use crate::config::{CoreConfig, DataMode};
use crate::constants::ALLERGY_DATA_CACHE_KEY;
use crate::store::{BundleStore, JsonFileStore, MemoryStore};
use crate::CoreResult;
use fhir::{Bundle, BundleEntry};
use std::sync::Arc;

/// Entry point for the pipeline's reads and writes.
#[derive(Clone)]
pub struct AllergyDataSource {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn BundleStore>,
    cache: Arc<dyn BundleCache>,
}

impl AllergyDataSource {
    /// Create a data source over explicit collaborators.
    pub fn new(
        cfg: Arc<CoreConfig>,
        store: Arc<dyn BundleStore>,
        cache: Arc<dyn BundleCache>,
    ) -> Self {
        Self { cfg, store, cache }
    }

    /// Create a data source with the store selected by [`CoreConfig::data_mode`] and a fresh
    /// in-memory cache.
    pub fn from_config(cfg: Arc<CoreConfig>) -> Self {
        let store: Arc<dyn BundleStore> = match cfg.data_mode() {
            DataMode::File => Arc::new(JsonFileStore::new(cfg.data_file())),
            DataMode::Sample => Arc::new(MemoryStore::new(fhir::sample_bundle())),
        };
        Self::new(cfg, store, Arc::new(MemoryCache::new()))
    }

    /// Current bundle.
    ///
    /// Storage failures are logged and replaced by an empty bundle; they never reach the
    /// caller. The empty fallback is not cached, so the next call retries storage.
    pub fn load(&self) -> Bundle {
        if let Some(bundle) = self.cache.get(ALLERGY_DATA_CACHE_KEY) {
            return bundle;
        }

        let mut bundle = match self.store.load() {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::error!(
                    "failed to load allergy bundle from {}: {}",
                    self.store.describe(),
                    e
                );
                return Bundle::empty();
            }
        };

        if self.cfg.correct_categories() {
            let summary = correct_bundle(&mut bundle);
            tracing::debug!(
                corrected = summary.corrected,
                unmatched = summary.unmatched,
                "applied category corrections"
            );
        }

        self.cache
            .set(ALLERGY_DATA_CACHE_KEY, bundle.clone(), self.cfg.cache_ttl());
        bundle
    }

    /// Append `entry` to the stored bundle and invalidate the cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::BundleNotFound`] if there is no bundle to append to, and other
    /// variants if the bundle cannot be read or written. Nothing is written on error.
    pub fn append(&self, entry: BundleEntry) -> CoreResult<()> {
        let mut bundle = self.store.load()?;
        bundle.entry.push(entry);
        self.store.save(&bundle)?;
        self.cache.invalidate(ALLERGY_DATA_CACHE_KEY);

        tracing::info!(
            "appended allergy entry to {} ({} entries)",
            self.store.describe(),
            bundle.len()
        );
        Ok(())
    }

    /// Display records for the current bundle, bucketed with the configured threshold.
    pub fn allergies(&self) -> Vec<ParsedAllergy> {
        parse_allergy_data(&self.load().entry, self.cfg.other_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_CACHE_TTL, DEFAULT_OTHER_THRESHOLD};
    use crate::entry::{build_entry, NewAllergyEntry};
    use crate::CoreError;
    use fhir::{AllergyIntolerance, CodeableConcept, Coding};
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(correct_categories: bool) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(
                PathBuf::from("unused.json"),
                DEFAULT_CACHE_TTL,
                DEFAULT_OTHER_THRESHOLD,
                correct_categories,
                DataMode::File,
            )
            .unwrap(),
        )
    }

    fn entry(category: &str, display: &str) -> BundleEntry {
        BundleEntry {
            resource: AllergyIntolerance {
                category: vec![category.to_string()],
                criticality: Some("low".into()),
                code: Some(CodeableConcept::from_coding(Coding::display(display))),
                ..AllergyIntolerance::default()
            },
            ..BundleEntry::default()
        }
    }

    fn two_entry_bundle() -> Bundle {
        Bundle {
            entry: vec![entry("food", "Eggs"), entry("environment", "Mould")],
            ..Bundle::default()
        }
    }

    fn new_entry(reason: &str) -> BundleEntry {
        build_entry(NewAllergyEntry {
            specific_reason: Some(reason.into()),
            ..NewAllergyEntry::default()
        })
        .unwrap()
    }

    #[test]
    fn append_then_load_sees_new_entry() {
        let store = Arc::new(MemoryStore::new(two_entry_bundle()));
        let source = AllergyDataSource::new(config(false), store, Arc::new(MemoryCache::new()));

        assert_eq!(source.load().len(), 2);
        source.append(new_entry("Peanuts")).unwrap();

        let bundle = source.load();
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.entry[2].resource.display_label(), "Peanuts");
    }

    #[test]
    fn load_is_served_from_cache() {
        let store = Arc::new(MemoryStore::new(two_entry_bundle()));
        let source = AllergyDataSource::new(
            config(false),
            store.clone(),
            Arc::new(MemoryCache::new()),
        );

        assert_eq!(source.load().len(), 2);
        // Write behind the data source's back; the cached copy is still served.
        store.save(&Bundle::empty()).unwrap();
        assert_eq!(source.load().len(), 2);
    }

    #[test]
    fn append_reads_storage_not_cache() {
        let store = Arc::new(MemoryStore::new(two_entry_bundle()));
        let source = AllergyDataSource::new(
            config(false),
            store.clone(),
            Arc::new(MemoryCache::new()),
        );

        assert_eq!(source.load().len(), 2);
        let mut grown = two_entry_bundle();
        grown.entry.push(entry("food", "Fish"));
        store.save(&grown).unwrap();

        source.append(new_entry("Soy")).unwrap();
        assert_eq!(store.load().unwrap().len(), 4);
        assert_eq!(source.load().len(), 4);
    }

    #[test]
    fn missing_store_loads_empty_and_rejects_append() {
        let source = AllergyDataSource::new(
            config(true),
            Arc::new(MemoryStore::missing()),
            Arc::new(MemoryCache::new()),
        );

        assert!(source.load().is_empty());
        assert!(source.allergies().is_empty());

        let err = source.append(new_entry("Peanuts")).expect_err("nothing to append to");
        assert!(matches!(err, CoreError::BundleNotFound(_)));
    }

    #[test]
    fn corrects_categories_on_load_only() {
        let store = Arc::new(MemoryStore::new(two_entry_bundle()));
        let mut misfiled = two_entry_bundle();
        misfiled.entry[0].resource.category = vec!["environment".into()];
        store.save(&misfiled).unwrap();

        let source = AllergyDataSource::new(
            config(true),
            store.clone(),
            Arc::new(MemoryCache::new()),
        );

        assert_eq!(source.load().entry[0].resource.category, vec!["food"]);
        assert_eq!(
            store.load().unwrap().entry[0].resource.category,
            vec!["environment"]
        );
    }

    #[test]
    fn file_backed_source_end_to_end() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jsonResponse.json");
        std::fs::write(&path, two_entry_bundle().render().unwrap()).unwrap();

        let cfg = Arc::new(
            CoreConfig::new(path.clone(), DEFAULT_CACHE_TTL, 1, true, DataMode::File).unwrap(),
        );
        let source = AllergyDataSource::from_config(cfg);

        source.append(new_entry("Allergy to peanuts")).unwrap();

        let allergies = source.allergies();
        let reasons: Vec<&str> = allergies
            .iter()
            .map(|a| a.specific_reason.as_str())
            .collect();
        assert_eq!(reasons, vec!["Egg", "Peanut", "Mould"]);
        assert_eq!(allergies[1].category, "food");

        let on_disk = Bundle::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 3);
        assert_eq!(on_disk.entry[2].resource.category, vec!["unknown"]);
    }

    #[test]
    fn unreadable_entry_does_not_hide_the_rest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jsonResponse.json");
        std::fs::write(
            &path,
            r#"{"resourceType": "Bundle", "entry": [
  {"resource": {"category": ["food"], "criticality": "high", "code": {"coding": [{"display": "Eggs"}]}}},
  {"resource": {"category": ["food"], "criticality": "low", "code": {"coding": [{"display": "Soy"}]}}},
  {"resource": {"resourceType": "Observation", "category": [{"coding": [{"code": "laboratory"}]}]}}
]}"#,
        )
        .unwrap();

        let cfg = Arc::new(
            CoreConfig::new(path.clone(), DEFAULT_CACHE_TTL, 1, true, DataMode::File).unwrap(),
        );
        let source = AllergyDataSource::from_config(cfg);

        let reasons: Vec<String> = source
            .allergies()
            .into_iter()
            .map(|a| a.specific_reason)
            .collect();
        assert_eq!(reasons, vec!["Egg", "Soy"]);

        source.append(new_entry("Sesame")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entries = raw["entry"].as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[2]["resource"]["resourceType"], "Observation");
        assert_eq!(
            entries[2]["resource"]["category"][0]["coding"][0]["code"],
            "laboratory"
        );
        assert_eq!(entries[3]["resource"]["code"]["text"], "Sesame");
        assert_eq!(source.allergies().len(), 3);
    }

    #[test]
    fn oversized_ttl_is_served_from_cache() {
        let store = Arc::new(MemoryStore::new(two_entry_bundle()));
        let cfg = Arc::new(
            CoreConfig::new(
                PathBuf::from("unused.json"),
                Duration::from_secs(u64::MAX),
                DEFAULT_OTHER_THRESHOLD,
                false,
                DataMode::File,
            )
            .unwrap(),
        );
        let source = AllergyDataSource::new(cfg, store.clone(), Arc::new(MemoryCache::new()));

        assert_eq!(source.load().len(), 2);
        store.save(&Bundle::empty()).unwrap();
        assert_eq!(source.load().len(), 2);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jsonResponse.json");
        std::fs::write(&path, "{\"entry\": [").unwrap();

        let cfg = Arc::new(
            CoreConfig::new(path, DEFAULT_CACHE_TTL, 1, true, DataMode::File).unwrap(),
        );
        let source = AllergyDataSource::from_config(cfg);

        assert!(source.load().is_empty());
        assert!(source.append(new_entry("Soy")).is_err());
    }

    #[test]
    fn sample_mode_serves_demo_bundle() {
        let cfg = Arc::new(
            CoreConfig::new(
                PathBuf::from("unused.json"),
                DEFAULT_CACHE_TTL,
                DEFAULT_OTHER_THRESHOLD,
                false,
                DataMode::Sample,
            )
            .unwrap(),
        );
        let source = AllergyDataSource::from_config(cfg);

        assert_eq!(source.load().len(), 22);
        source.append(new_entry("Sesame")).unwrap();
        assert_eq!(source.load().len(), 23);
    }
}
