//! Medhanit - medication lookup cache and request-governance core
//!
//! This crate is the engineered core of a consumer medication-information
//! app: it deduplicates identical queries through a persisted per-language
//! cache, rate-limits outbound AI calls with a sliding window, validates
//! AI responses into a display taxonomy with safe fallbacks, and decides
//! when to hold a result behind a monetization interstitial. Presentation
//! is out of scope — the UI calls in with a query or an image and gets
//! plain data back.
//!
//! # Example
//!
//! ```rust,no_run
//! use medhanit::{LanguageCode, LookupOutcome, Medhanit};
//!
//! #[tokio::main]
//! async fn main() -> medhanit::Result<()> {
//!     let mut gateway = Medhanit::builder()
//!         .gemini("your-api-key")
//!         .build()?;
//!     gateway.load_ad_offers("https://example.com/ads.json").await;
//!
//!     match gateway.submit_query("Aspirin", LanguageCode::En, false).await {
//!         LookupOutcome::Ready(result) => println!("{}", result.record.overview),
//!         LookupOutcome::AdShowing { offer } => {
//!             println!("interstitial: {}", offer.alt_text);
//!             // ... after the countdown / user dismissal:
//!             // gateway.dismiss_ad();
//!         }
//!         LookupOutcome::RateLimited { retry_after_seconds } => {
//!             println!("try again in {retry_after_seconds}s");
//!         }
//!         LookupOutcome::Rejected { message } => println!("{message}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod ads;
pub mod cache;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod providers;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use error::{MedhanitError, Result};
pub use gateway::{LookupOutcome, LookupResult, Medhanit, MedhanitBuilder, MedhanitGateway};

// Re-export all types
pub use ads::{AdGate, DisplayContext, GateDecision, HeldResult};
pub use cache::{CacheEntry, HistoryEntry, MedicationCache};
pub use limiter::{Admission, RateLimiter};
pub use providers::{GeminiClient, LookupProvider, LookupReply, TranslationProvider, VisionProvider};
pub use store::{FileStore, MemoryStore, StateStore};
pub use types::{
    AdOffer, DEFAULT_LANGUAGE_CODE, GroundingCitation, GroundingMetadata, Language, LanguageCode,
    MedicationRecord, SUPPORTED_LANGUAGES,
};
pub use validate::Classification;

/// Milliseconds since the Unix epoch.
pub(crate) fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
