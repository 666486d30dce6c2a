//! The lookup gateway: cache, admission, validation and ad gating in
//! one control flow.
//!
//! Callers (the UI) submit a typed query or a captured image and
//! receive a [`LookupOutcome`] back. Every externally-caused failure is
//! converted here into a well-formed record or a short user-facing
//! message; no raw transport or parse error crosses this boundary.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ads::{AdGate, DisplayContext, GateDecision, HeldResult};
use crate::cache::{HistoryEntry, MedicationCache};
use crate::limiter::{Admission, RateLimiter};
use crate::providers::{LookupProvider, TranslationProvider, VisionProvider};
use crate::types::{AdOffer, GroundingMetadata, LanguageCode, MedicationRecord};
use crate::validate::{self, Classification, FallbackKind};
use crate::{ads, telemetry};

/// A display-ready lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    /// The query as typed or identified, case preserved.
    pub query: String,
    pub language: LanguageCode,
    pub record: MedicationRecord,
    pub grounding: Option<GroundingMetadata>,
    pub classification: Classification,
    /// Whether the result was answered from the offline cache.
    pub from_cache: bool,
    /// Captured-image preview bytes, when the query came from a photo.
    pub image_preview: Option<Vec<u8>>,
}

/// What the gateway decided for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Result ready for display. May be a fallback or not-recognized
    /// record; check `classification`.
    Ready(LookupResult),
    /// The result is held behind an interstitial; show the offer, then
    /// call [`MedhanitGateway::dismiss_ad`] to release it.
    AdShowing { offer: AdOffer },
    /// Denied by the admission window; the user must wait.
    RateLimited { retry_after_seconds: u64 },
    /// Input problem; no network call was attempted.
    Rejected { message: String },
}

/// Orchestrator owning the cache, limiter, sequencer and providers.
pub struct MedhanitGateway {
    pub(crate) cache: MedicationCache,
    pub(crate) limiter: RateLimiter,
    pub(crate) gate: AdGate,
    pub(crate) lookup: Arc<dyn LookupProvider>,
    pub(crate) vision: Arc<dyn VisionProvider>,
    pub(crate) translator: Arc<dyn TranslationProvider>,
}

impl MedhanitGateway {
    /// Submit a typed medication name.
    ///
    /// `bypass` skips admission control and the ad sequencer; it is
    /// meant for replaying a history item whose cache entry has been
    /// evicted, never for ordinary lookups.
    pub async fn submit_query(
        &mut self,
        query: &str,
        lang: LanguageCode,
        bypass: bool,
    ) -> LookupOutcome {
        let context = DisplayContext::typed(query.trim(), lang);
        self.run_lookup(query, lang, bypass, context).await
    }

    /// Submit a captured JPEG for identification and lookup.
    ///
    /// The vision call is an outbound AI call and consumes an admission
    /// slot of its own before the text lookup runs.
    pub async fn submit_image(&mut self, image_jpeg: &[u8], lang: LanguageCode) -> LookupOutcome {
        self.gate.reset();

        if image_jpeg.is_empty() {
            return LookupOutcome::Rejected {
                message: "No image captured.".to_string(),
            };
        }

        if let Admission::Denied {
            retry_after_seconds,
        } = self.limiter.try_admit()
        {
            return LookupOutcome::RateLimited {
                retry_after_seconds,
            };
        }

        let identified = match self.vision.identify(image_jpeg).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                return LookupOutcome::Rejected {
                    message: "Could not identify a medication from the image. Please try \
                              again or enter the name manually."
                        .to_string(),
                };
            }
            Err(e) => {
                warn!(provider = self.vision.name(), error = %e, "image identification failed");
                return LookupOutcome::Rejected {
                    message: "The image could not be processed for identification. Please \
                              try again."
                        .to_string(),
                };
            }
        };

        info!(name = %identified, "medication identified from image");
        let context = DisplayContext {
            query: identified.clone(),
            language: lang,
            image_preview: Some(image_jpeg.to_vec()),
        };
        self.run_lookup(&identified, lang, false, context).await
    }

    /// Read a cached entry directly, for the history view.
    ///
    /// On `None` the caller replays via
    /// `submit_query(query, lang, bypass = true)`.
    pub fn recall(&mut self, query: &str, lang: LanguageCode) -> Option<LookupResult> {
        self.gate.reset();
        self.cache.get(query, lang).map(|entry| LookupResult {
            query: entry.original_query,
            language: lang,
            record: entry.info,
            grounding: entry.grounding_metadata,
            classification: Classification::Valid,
            from_cache: true,
            image_preview: None,
        })
    }

    /// All cached lookups, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.cache.list_all()
    }

    /// Rate-limit decision without recording a request; lets the UI
    /// disable its submit affordance pre-emptively.
    pub fn admission_preview(&self) -> Admission {
        self.limiter.preview()
    }

    /// The offer currently showing, if an interstitial is up.
    pub fn active_offer(&self) -> Option<&AdOffer> {
        self.gate.active_offer()
    }

    /// Dismiss the interstitial and release the held result.
    pub fn dismiss_ad(&mut self) -> Option<LookupResult> {
        self.gate.dismiss().map(released_to_result)
    }

    /// Wait out the interstitial countdown, then dismiss and release.
    pub async fn dismiss_ad_after_countdown(&mut self) -> Option<LookupResult> {
        tokio::time::sleep(self.gate.countdown()).await;
        self.dismiss_ad()
    }

    /// Clear any held interstitial state without releasing it.
    ///
    /// The UI calls this when the user switches input methods or
    /// navigates away from the result view.
    pub fn reset(&mut self) {
        self.gate.reset();
    }

    /// Replace the ad offer catalog, typically right after construction
    /// by fetching the remote document.
    pub async fn load_ad_offers(&mut self, url: &str) {
        let offers = ads::load_offers(url).await;
        self.gate.set_offers(offers);
    }

    async fn run_lookup(
        &mut self,
        query: &str,
        lang: LanguageCode,
        bypass: bool,
        context: DisplayContext,
    ) -> LookupOutcome {
        // A new fetch resolves prior held state via the same path as an
        // input-method switch.
        self.gate.reset();

        let query = query.trim();
        if query.is_empty() {
            return LookupOutcome::Rejected {
                message: "Please enter or scan a medication name.".to_string(),
            };
        }

        if let Some(entry) = self.cache.get(query, lang) {
            metrics::counter!(telemetry::LOOKUPS_TOTAL,
                "source" => "cache", "classification" => "valid")
            .increment(1);
            return LookupOutcome::Ready(LookupResult {
                query: entry.original_query,
                language: lang,
                record: entry.info,
                grounding: entry.grounding_metadata,
                classification: Classification::Valid,
                from_cache: true,
                image_preview: None,
            });
        }

        if !bypass {
            if let Admission::Denied {
                retry_after_seconds,
            } = self.limiter.try_admit()
            {
                return LookupOutcome::RateLimited {
                    retry_after_seconds,
                };
            }
        }

        let reply = match self.lookup.lookup(query, lang).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(provider = self.lookup.name(), query, error = %e, "lookup call failed");
                let kind = FallbackKind::ApiError {
                    message: e.to_string(),
                };
                let record =
                    validate::build_fallback(&kind, query, lang, self.translator.as_ref()).await;
                return self.finish(query, lang, record, None, Classification::ApiError);
            }
        };

        let Some(mut record) = validate::parse_record(&reply.text) else {
            warn!(query, "model response could not be parsed into a record");
            let record = validate::build_fallback(
                &FallbackKind::DataError,
                query,
                lang,
                self.translator.as_ref(),
            )
            .await;
            return self.finish(query, lang, record, reply.grounding, Classification::DataError);
        };

        validate::ensure_disclaimer(&mut record, lang, self.translator.as_ref()).await;

        let classification = validate::classify(&record);
        if !classification.is_valid() {
            info!(query, classification = classification.as_label(), "record not display-valid");
            return self.finish(query, lang, record, reply.grounding, classification);
        }

        self.cache
            .put(query, lang, record.clone(), reply.grounding.clone());

        metrics::counter!(telemetry::LOOKUPS_TOTAL,
            "source" => "provider", "classification" => "valid")
        .increment(1);

        match self.gate.on_success(record, reply.grounding, context, bypass) {
            GateDecision::PassThrough(held) => LookupOutcome::Ready(released_to_result(held)),
            GateDecision::Held { offer } => LookupOutcome::AdShowing { offer },
        }
    }

    /// Terminal path for non-valid records: counted, never cached,
    /// never ad-gated.
    fn finish(
        &self,
        query: &str,
        lang: LanguageCode,
        record: MedicationRecord,
        grounding: Option<GroundingMetadata>,
        classification: Classification,
    ) -> LookupOutcome {
        metrics::counter!(telemetry::LOOKUPS_TOTAL,
            "source" => "provider", "classification" => classification.as_label())
        .increment(1);
        LookupOutcome::Ready(LookupResult {
            query: query.to_string(),
            language: lang,
            record,
            grounding,
            classification,
            from_cache: false,
            image_preview: None,
        })
    }
}

fn released_to_result(held: HeldResult) -> LookupResult {
    LookupResult {
        query: held.context.query,
        language: held.context.language,
        record: held.record,
        grounding: held.grounding,
        classification: Classification::Valid,
        from_cache: false,
        image_preview: held.context.image_preview,
    }
}
