//! Provider traits for capability-specific implementations.
//!
//! The core talks to the generative-AI service through three narrow
//! capability traits rather than a single "god trait", so tests can
//! substitute one capability at a time and a production client can
//! implement all three over one HTTP connection.

use async_trait::async_trait;

use crate::Result;
use crate::types::{GroundingMetadata, LanguageCode};

/// Raw outcome of a text lookup: the model's text plus any grounding
/// citations it returned. Validation and parsing happen in the core,
/// not the provider.
#[derive(Debug, Clone, Default)]
pub struct LookupReply {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
}

/// Provider for medication text lookups.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Fetch information about a medication in the given display
    /// language. The reply text is expected to be a JSON-shaped record
    /// but is returned raw; the validator decides what it is.
    async fn lookup(&self, name: &str, lang: LanguageCode) -> Result<LookupReply>;
}

/// Provider for identifying a medication from a photo.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Best-guess medication name for a JPEG image, or `None` when the
    /// image holds no identifiable medication.
    async fn identify(&self, image_jpeg: &[u8]) -> Result<Option<String>>;
}

/// Provider for translating fixed disclaimer text.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Translate `text` into the given display language.
    async fn translate(&self, text: &str, lang: LanguageCode) -> Result<String>;
}
