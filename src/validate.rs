//! Result validation and fallback record construction.
//!
//! Raw model output passes through here before it reaches a caller:
//! [`parse_record`] turns loosely-formatted model text into a
//! [`MedicationRecord`], [`classify`] sorts records into the display
//! taxonomy, and [`build_fallback`] synthesizes an always-populated
//! record when the upstream response cannot be used as-is. The raw
//! parse or transport error never crosses to the presentation layer.

use tracing::warn;

use crate::providers::TranslationProvider;
use crate::telemetry;
use crate::types::{LanguageCode, MedicationRecord};

/// English master disclaimer, translated into the display language when
/// the model omits or truncates its own.
pub const DISCLAIMER_EN: &str = "This information is for educational purposes only and is not \
a substitute for professional medical advice. Always consult your doctor or pharmacist for any \
health concerns or before making any decisions related to your health or treatment.";

/// A model-supplied disclaimer shorter than this is treated as missing.
const MIN_DISCLAIMER_LEN: usize = 50;

/// Validator verdict for a lookup record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Display-ready; eligible for caching and ad gating.
    Valid,
    /// The model reported the medication as unrecognized.
    NotRecognized,
    /// Upstream content could not be used (unparseable or marked).
    DataError,
    /// The upstream call itself failed.
    ApiError,
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Classification::Valid)
    }

    /// Stable label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Classification::Valid => "valid",
            Classification::NotRecognized => "not_recognized",
            Classification::DataError => "data_error",
            Classification::ApiError => "api_error",
        }
    }
}

/// Whether a record carries an error/unrecognized marker in its name.
///
/// Error records must never be persisted to the cache.
pub fn is_error_record(record: &MedicationRecord) -> bool {
    let name = record.name.to_lowercase();
    name.contains("not recognized") || name.contains("data error") || name.contains("api error")
}

/// Classify a record by case-insensitive marker checks over its `name`
/// and `overview` fields.
pub fn classify(record: &MedicationRecord) -> Classification {
    let name = record.name.to_lowercase();
    let overview = record.overview.to_lowercase();

    if name.contains("not recognized") || overview.contains("not recognized") {
        Classification::NotRecognized
    } else if name.contains("data error") || overview.contains("data error") {
        Classification::DataError
    } else if name.contains("api error") || overview.contains("api error") {
        Classification::ApiError
    } else {
        Classification::Valid
    }
}

/// Parse a medication record out of raw model text.
///
/// Accepts clean JSON, JSON wrapped in markdown code fences, and JSON
/// embedded in surrounding prose (first `{` to last `}`). Returns `None`
/// when no structurally complete record can be extracted or the parsed
/// record has an empty name.
pub fn parse_record(text: &str) -> Option<MedicationRecord> {
    let mut body = text.trim();

    if body.starts_with("```") {
        body = body.trim_start_matches('`');
        body = body.strip_prefix("json").unwrap_or(body).trim_start();
        if let Some(idx) = body.rfind("```") {
            body = &body[..idx];
        }
        body = body.trim();
    }

    let parsed: Option<MedicationRecord> = match serde_json::from_str(body) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "strict parse of model response failed, retrying loosely");
            let start = body.find('{')?;
            let end = body.rfind('}')?;
            if end <= start {
                return None;
            }
            serde_json::from_str(&body[start..=end]).ok()
        }
    };

    parsed.filter(|record| !record.name.trim().is_empty())
}

/// Which kind of fallback record to synthesize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackKind {
    /// Upstream returned unparseable content.
    DataError,
    /// Upstream call failed; carries the error description for display.
    ApiError { message: String },
}

impl FallbackKind {
    fn as_label(&self) -> &'static str {
        match self {
            FallbackKind::DataError => "data_error",
            FallbackKind::ApiError { .. } => "api_error",
        }
    }
}

/// Synthesize a safe, fully-populated fallback record.
///
/// Content fields carry a "consult a healthcare professional" message in
/// the display language via a secondary translation call; if that call
/// fails the English message is used. No field is ever left blank.
pub async fn build_fallback(
    kind: &FallbackKind,
    query: &str,
    lang: LanguageCode,
    translator: &dyn TranslationProvider,
) -> MedicationRecord {
    metrics::counter!(telemetry::FALLBACKS_TOTAL, "kind" => kind.as_label()).increment(1);

    let language = lang.english_name();
    let (name, overview) = match kind {
        FallbackKind::DataError => (
            format!("{query} - Data Error"),
            format!(
                "Could not retrieve structured information about \"{query}\" in {language}. \
                 The data format received was unexpected. Please try again."
            ),
        ),
        FallbackKind::ApiError { message } => (
            format!("{query} - API Error"),
            format!(
                "An error occurred while fetching information for \"{query}\": {message}. \
                 Please try again later."
            ),
        ),
    };

    let consult = format!("Consult a healthcare professional for guidance about {query}.");
    let consult = translate_or(translator, &consult, lang, consult.clone()).await;
    let disclaimer = translate_or(translator, DISCLAIMER_EN, lang, DISCLAIMER_EN.to_string()).await;

    MedicationRecord {
        name,
        overview,
        usage_instructions: consult.clone(),
        side_effects: consult.clone(),
        contradictions: consult.clone(),
        storage_instructions: consult,
        disclaimer,
    }
}

/// Backfill a missing or truncated disclaimer on a parsed record.
pub async fn ensure_disclaimer(
    record: &mut MedicationRecord,
    lang: LanguageCode,
    translator: &dyn TranslationProvider,
) {
    if record.disclaimer.trim().len() >= MIN_DISCLAIMER_LEN {
        return;
    }
    record.disclaimer =
        translate_or(translator, DISCLAIMER_EN, lang, DISCLAIMER_EN.to_string()).await;
}

async fn translate_or(
    translator: &dyn TranslationProvider,
    text: &str,
    lang: LanguageCode,
    default: String,
) -> String {
    match translator.translate(text, lang).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => default,
        Err(e) => {
            warn!(lang = %lang, error = %e, "translation failed, using English default");
            default
        }
    }
}
