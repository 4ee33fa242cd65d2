//! Process-wide bundle cache with per-key expiry.

use fhir::Bundle;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Key-value cache for loaded bundles.
pub trait BundleCache: Send + Sync {
    /// The cached bundle for `key`, if present and unexpired.
    fn get(&self, key: &str) -> Option<Bundle>;

    /// Store `bundle` under `key` for `ttl`. A `ttl` too large to represent never expires.
    fn set(&self, key: &str, bundle: Bundle, ttl: Duration);

    /// Drop `key` so the next read goes to storage.
    fn invalidate(&self, key: &str);
}

#[derive(Debug)]
struct CachedBundle {
    bundle: Bundle,
    /// `None` never expires.
    expires_at: Option<Instant>,
}

/// In-memory [`BundleCache`]. Expired entries are evicted when read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedBundle>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BundleCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Bundle> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let expired = match entries.get(key) {
            Some(cached) if cached.expires_at.is_none_or(|at| Instant::now() < at) => {
                return Some(cached.bundle.clone())
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    fn set(&self, key: &str, bundle: Bundle, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), CachedBundle { bundle, expires_at });
    }

    fn invalidate(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_live_entries() {
        let cache = MemoryCache::new();
        assert!(cache.get("k").is_none());

        cache.set("k", fhir::sample_bundle(), Duration::from_secs(60));
        assert_eq!(cache.get("k").map(|b| b.len()), Some(22));
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = MemoryCache::new();
        cache.set("k", Bundle::empty(), Duration::ZERO);

        assert!(cache.get("k").is_none());
        assert!(cache.entries.lock().unwrap().is_empty());
    }

    #[test]
    fn oversized_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache.set("k", fhir::sample_bundle(), Duration::from_secs(u64::MAX));

        assert_eq!(cache.get("k").map(|b| b.len()), Some(22));
        assert!(cache.entries.lock().unwrap()["k"].expires_at.is_none());
    }

    #[test]
    fn invalidate_drops_entry() {
        let cache = MemoryCache::new();
        cache.set("k", Bundle::empty(), Duration::from_secs(60));

        cache.invalidate("k");
        assert!(cache.get("k").is_none());

        // Invalidating a missing key is a no-op.
        cache.invalidate("k");
    }
}
