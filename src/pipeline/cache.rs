//! Externally owned lookaside cache for pipeline results.

use super::PipelineResult;
use crate::regions::RegionConfig;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Identifies one brand search over a set of regions.
///
/// Brand matching ignores case and the region set ignores order, so
/// `("Nike", [UK, US])` and `("nike", [us, uk])` share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    brand: String,
    regions: BTreeSet<String>,
}

impl CacheKey {
    pub fn new<'a>(brand: &str, region_codes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            brand: brand.trim().to_lowercase(),
            regions: region_codes.into_iter().map(|c| c.trim().to_uppercase()).collect(),
        }
    }

    pub fn for_regions(brand: &str, regions: &[RegionConfig]) -> Self {
        Self::new(brand, regions.iter().map(|r| r.region_code.as_str()))
    }
}

struct Entry {
    stored_at: Instant,
    result: PipelineResult,
}

/// Time-bounded cache of completed runs.
///
/// Owned by the caller and handed to
/// [`RegionalScrapePipeline::run_cached`](super::RegionalScrapePipeline::run_cached);
/// the pipeline itself never retains results.
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
        // A poisoned map still holds valid entries
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a fresh copy of the cached result, dropping it if expired.
    pub fn get(&self, key: &CacheKey) -> Option<PipelineResult> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                debug!("Cache hit for {}", key.brand);
                Some(entry.result.clone())
            }
            Some(_) => {
                debug!("Cache entry for {} expired", key.brand);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: CacheKey, result: PipelineResult) {
        self.lock().insert(key, Entry { stored_at: Instant::now(), result });
    }

    /// Removes an entry, returning true if one was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
