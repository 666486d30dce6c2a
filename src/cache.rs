//! Query normalizer and medication cache store.
//!
//! The cache doubles as the "recently viewed" history: successful,
//! validator-approved lookups are persisted under a normalized
//! (query, language) key, bounded to [`MAX_CACHED_ITEMS`] entries with
//! oldest-first eviction. Callers receive owned copies, never references
//! into the persisted collection.
//!
//! The whole map is rewritten through the [`StateStore`] on every `put`,
//! so two logically concurrent puts resolve to last-write-wins with no
//! partial state.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{self, StateStore, keys};
use crate::types::{GroundingMetadata, LanguageCode, MedicationRecord};
use crate::{telemetry, validate};

/// Maximum number of cached lookup results.
pub const MAX_CACHED_ITEMS: usize = 10;

/// Declared lifetime of a cached entry.
///
/// Not enforced: only the count-based eviction in [`MedicationCache::put`]
/// applies. Kept for callers that want to badge stale entries in a
/// history view.
pub const CACHE_EXPIRY_MS: u64 = 24 * 60 * 60 * 1000;

/// Build the normalized cache key for a query in a language.
///
/// The query side is lowercased, so identical text always maps to the
/// same key regardless of call-site casing; the language code side is
/// case-sensitive.
pub fn cache_key(query: &str, lang: LanguageCode) -> String {
    format!("{}_{}", query.to_lowercase(), lang.as_str())
}

/// One persisted lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The query as typed or identified, case preserved for display.
    pub original_query: String,
    pub info: MedicationRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
    /// Creation time, epoch milliseconds.
    pub timestamp: u64,
    pub language_code: LanguageCode,
}

/// Summary row for the history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub original_query: String,
    pub language_code: LanguageCode,
    pub timestamp: u64,
}

/// Bounded, persisted store of successful lookup results.
pub struct MedicationCache {
    store: Arc<dyn StateStore>,
    capacity: usize,
}

impl MedicationCache {
    /// Create a cache with the default capacity ([`MAX_CACHED_ITEMS`]).
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self::with_capacity(store, MAX_CACHED_ITEMS)
    }

    /// Create a cache with a custom capacity.
    pub fn with_capacity(store: Arc<dyn StateStore>, capacity: usize) -> Self {
        Self { store, capacity }
    }

    fn load(&self) -> HashMap<String, CacheEntry> {
        store::read_json(self.store.as_ref(), keys::MEDICATION_CACHE).unwrap_or_default()
    }

    fn persist(&self, map: &HashMap<String, CacheEntry>) {
        store::write_json(self.store.as_ref(), keys::MEDICATION_CACHE, map);
    }

    /// Look up a cached entry. No side effects beyond hit/miss metrics.
    pub fn get(&self, query: &str, lang: LanguageCode) -> Option<CacheEntry> {
        let key = cache_key(query, lang);
        match self.load().remove(&key) {
            Some(entry) => {
                debug!(query, lang = %lang, "cache hit");
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(entry)
            }
            None => {
                debug!(query, lang = %lang, "cache miss");
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Upsert an entry timestamped with the current clock.
    ///
    /// Error records are rejected as a logged no-op — they must never be
    /// persisted.
    pub fn put(
        &self,
        query: &str,
        lang: LanguageCode,
        record: MedicationRecord,
        grounding: Option<GroundingMetadata>,
    ) {
        self.put_at(query, lang, record, grounding, crate::now_epoch_ms());
    }

    /// Upsert an entry with an explicit creation timestamp.
    ///
    /// After the upsert, evicts oldest entries (timestamp ascending)
    /// until the count equals the capacity. The persisted map is
    /// rewritten as a whole in one store write.
    pub fn put_at(
        &self,
        query: &str,
        lang: LanguageCode,
        record: MedicationRecord,
        grounding: Option<GroundingMetadata>,
        timestamp: u64,
    ) {
        if validate::is_error_record(&record) {
            warn!(query, name = %record.name, "skipping cache for error/unrecognized record");
            return;
        }

        let mut map = self.load();
        map.insert(
            cache_key(query, lang),
            CacheEntry {
                original_query: query.to_string(),
                info: record,
                grounding_metadata: grounding,
                timestamp,
                language_code: lang,
            },
        );

        if map.len() > self.capacity {
            let mut by_age: Vec<(String, u64)> = map
                .iter()
                .map(|(k, e)| (k.clone(), e.timestamp))
                .collect();
            by_age.sort_by_key(|(_, ts)| *ts);
            let excess = map.len() - self.capacity;
            for (key, _) in by_age.into_iter().take(excess) {
                debug!(%key, "cache full, evicting oldest entry");
                metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(1);
                map.remove(&key);
            }
        }

        self.persist(&map);
        debug!(query, lang = %lang, entries = map.len(), "cached lookup result");
    }

    /// All cached entries as history rows, most recent first.
    ///
    /// Computed fresh from persisted state on every call.
    pub fn list_all(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .load()
            .into_values()
            .map(|e| HistoryEntry {
                original_query: e.original_query,
                language_code: e.language_code,
                timestamp: e.timestamp,
            })
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }
}
