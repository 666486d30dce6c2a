//! Tests for the validator and fallback builder.

use async_trait::async_trait;

use medhanit::providers::TranslationProvider;
use medhanit::validate::{self, Classification, DISCLAIMER_EN, FallbackKind};
use medhanit::{LanguageCode, MedhanitError, MedicationRecord, Result};

// ============================================================================
// Mock translators
// ============================================================================

/// Prefixes the language code, so tests can see the call went through.
struct TaggingTranslator;

#[async_trait]
impl TranslationProvider for TaggingTranslator {
    fn name(&self) -> &str {
        "tagging"
    }

    async fn translate(&self, text: &str, lang: LanguageCode) -> Result<String> {
        Ok(format!("[{lang}] {text}"))
    }
}

struct FailingTranslator;

#[async_trait]
impl TranslationProvider for FailingTranslator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn translate(&self, _text: &str, _lang: LanguageCode) -> Result<String> {
        Err(MedhanitError::Http("connection reset".into()))
    }
}

fn record(name: &str, overview: &str) -> MedicationRecord {
    MedicationRecord {
        name: name.to_string(),
        overview: overview.to_string(),
        usage_instructions: "u".to_string(),
        side_effects: "s".to_string(),
        contradictions: "c".to_string(),
        storage_instructions: "st".to_string(),
        disclaimer: DISCLAIMER_EN.to_string(),
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn not_recognized_marker_in_name() {
    let verdict = validate::classify(&record("Aspirin - Not Recognized", "n/a"));
    assert_eq!(verdict, Classification::NotRecognized);
}

#[test]
fn markers_in_overview_also_classify() {
    let verdict = validate::classify(&record("Aspirin", "upstream data error"));
    assert_eq!(verdict, Classification::DataError);
}

#[test]
fn clean_record_is_valid() {
    let verdict = validate::classify(&record("Aspirin", "A common analgesic."));
    assert!(verdict.is_valid());
}

// ============================================================================
// Fallback construction
// ============================================================================

fn assert_fully_populated(record: &MedicationRecord) {
    assert!(!record.name.trim().is_empty());
    assert!(!record.overview.trim().is_empty());
    assert!(!record.usage_instructions.trim().is_empty());
    assert!(!record.side_effects.trim().is_empty());
    assert!(!record.contradictions.trim().is_empty());
    assert!(!record.storage_instructions.trim().is_empty());
    assert!(!record.disclaimer.trim().is_empty());
}

#[tokio::test]
async fn data_error_fallback_is_fully_populated_and_translated() {
    let fallback = validate::build_fallback(
        &FallbackKind::DataError,
        "Aspirin",
        LanguageCode::Am,
        &TaggingTranslator,
    )
    .await;

    assert_eq!(fallback.name, "Aspirin - Data Error");
    assert_fully_populated(&fallback);
    assert!(fallback.usage_instructions.starts_with("[am]"));
    assert!(fallback.disclaimer.starts_with("[am]"));
    assert_eq!(validate::classify(&fallback), Classification::DataError);
    assert!(validate::is_error_record(&fallback));
}

#[tokio::test]
async fn api_error_fallback_carries_the_failure_description() {
    let kind = FallbackKind::ApiError {
        message: "API error (503): overloaded".to_string(),
    };
    let fallback =
        validate::build_fallback(&kind, "Aspirin", LanguageCode::En, &TaggingTranslator).await;

    assert_eq!(fallback.name, "Aspirin - API Error");
    assert!(fallback.overview.contains("overloaded"));
    assert_fully_populated(&fallback);
    assert_eq!(validate::classify(&fallback), Classification::ApiError);
}

#[tokio::test]
async fn translation_failure_falls_back_to_english() {
    let fallback = validate::build_fallback(
        &FallbackKind::DataError,
        "Aspirin",
        LanguageCode::Ti,
        &FailingTranslator,
    )
    .await;

    assert_fully_populated(&fallback);
    assert!(
        fallback
            .usage_instructions
            .contains("Consult a healthcare professional")
    );
    assert_eq!(fallback.disclaimer, DISCLAIMER_EN);
}

// ============================================================================
// Disclaimer backfill
// ============================================================================

#[tokio::test]
async fn short_disclaimer_is_backfilled() {
    let mut parsed = record("Aspirin", "A common analgesic.");
    parsed.disclaimer = "ok".to_string();

    validate::ensure_disclaimer(&mut parsed, LanguageCode::Ar, &TaggingTranslator).await;
    assert!(parsed.disclaimer.starts_with("[ar]"));
    assert!(parsed.disclaimer.contains("educational purposes"));
}

#[tokio::test]
async fn substantial_disclaimer_is_kept() {
    let mut parsed = record("Aspirin", "A common analgesic.");
    let original = parsed.disclaimer.clone();

    validate::ensure_disclaimer(&mut parsed, LanguageCode::Ar, &TaggingTranslator).await;
    assert_eq!(parsed.disclaimer, original);
}

#[tokio::test]
async fn backfill_survives_translator_failure() {
    let mut parsed = record("Aspirin", "A common analgesic.");
    parsed.disclaimer = String::new();

    validate::ensure_disclaimer(&mut parsed, LanguageCode::Ar, &FailingTranslator).await;
    assert_eq!(parsed.disclaimer, DISCLAIMER_EN);
}
