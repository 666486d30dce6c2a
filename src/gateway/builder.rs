//! Builder for configuring gateway instances

use std::sync::Arc;

use crate::ads::AdGate;
use crate::cache::MedicationCache;
use crate::limiter::RateLimiter;
use crate::providers::{GeminiClient, LookupProvider, TranslationProvider, VisionProvider};
use crate::store::{FileStore, StateStore};
use crate::types::AdOffer;
use crate::{MedhanitError, Result};

use super::MedhanitGateway;

/// Main entry point for creating gateway instances.
pub struct Medhanit;

impl Medhanit {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> MedhanitBuilder {
        MedhanitBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct MedhanitBuilder {
    store: Option<Arc<dyn StateStore>>,
    gemini_key: Option<String>,
    lookup: Option<Arc<dyn LookupProvider>>,
    vision: Option<Arc<dyn VisionProvider>>,
    translator: Option<Arc<dyn TranslationProvider>>,
    ad_offers: Vec<AdOffer>,
    cache_capacity: Option<usize>,
    rate_limit: Option<(usize, u64)>,
    ad_interval: Option<u64>,
}

impl MedhanitBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            gemini_key: None,
            lookup: None,
            vision: None,
            translator: None,
            ad_offers: Vec::new(),
            cache_capacity: None,
            rate_limit: None,
            ad_interval: None,
        }
    }

    /// Use a specific state store. Defaults to a [`FileStore`] in the
    /// platform data directory.
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Configure the Gemini backend for all three AI capabilities.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.gemini_key = Some(api_key.into());
        self
    }

    /// Use a specific lookup provider (overrides [`gemini`](Self::gemini)).
    pub fn lookup_provider(mut self, provider: Arc<dyn LookupProvider>) -> Self {
        self.lookup = Some(provider);
        self
    }

    /// Use a specific vision provider (overrides [`gemini`](Self::gemini)).
    pub fn vision_provider(mut self, provider: Arc<dyn VisionProvider>) -> Self {
        self.vision = Some(provider);
        self
    }

    /// Use a specific translation provider (overrides [`gemini`](Self::gemini)).
    pub fn translation_provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.translator = Some(provider);
        self
    }

    /// Seed the ad offer catalog. Typically left empty and populated
    /// after construction via
    /// [`MedhanitGateway::load_ad_offers`](super::MedhanitGateway::load_ad_offers).
    pub fn ad_offers(mut self, offers: Vec<AdOffer>) -> Self {
        self.ad_offers = offers;
        self
    }

    /// Override the cache capacity (default 10 entries).
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Override the admission limits (default 5 requests per 60 s).
    pub fn rate_limit(mut self, max_requests: usize, window_ms: u64) -> Self {
        self.rate_limit = Some((max_requests, window_ms));
        self
    }

    /// Override the interstitial interval (default every 2nd fetch).
    pub fn ad_interval(mut self, interval: u64) -> Self {
        self.ad_interval = Some(interval);
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<MedhanitGateway> {
        let gemini = self.gemini_key.map(GeminiClient::new);

        let lookup: Arc<dyn LookupProvider> = match (self.lookup, &gemini) {
            (Some(provider), _) => provider,
            (None, Some(client)) => Arc::new(client.clone()),
            (None, None) => return Err(MedhanitError::NoProvider),
        };
        let vision: Arc<dyn VisionProvider> = match (self.vision, &gemini) {
            (Some(provider), _) => provider,
            (None, Some(client)) => Arc::new(client.clone()),
            (None, None) => return Err(MedhanitError::NoProvider),
        };
        let translator: Arc<dyn TranslationProvider> = match (self.translator, &gemini) {
            (Some(provider), _) => provider,
            (None, Some(client)) => Arc::new(client.clone()),
            (None, None) => return Err(MedhanitError::NoProvider),
        };

        let store: Arc<dyn StateStore> = self
            .store
            .unwrap_or_else(|| Arc::new(FileStore::default()));

        let cache = match self.cache_capacity {
            Some(capacity) => MedicationCache::with_capacity(store.clone(), capacity),
            None => MedicationCache::new(store.clone()),
        };
        let limiter = match self.rate_limit {
            Some((max, window)) => RateLimiter::with_limits(store.clone(), max, window),
            None => RateLimiter::new(store.clone()),
        };
        let gate = match self.ad_interval {
            Some(interval) => AdGate::with_interval(store, self.ad_offers, interval),
            None => AdGate::new(store, self.ad_offers),
        };

        Ok(MedhanitGateway {
            cache,
            limiter,
            gate,
            lookup,
            vision,
            translator,
        })
    }
}

impl Default for MedhanitBuilder {
    fn default() -> Self {
        Self::new()
    }
}
