//! Medication display payload and grounding metadata.

use serde::{Deserialize, Serialize};

/// The display payload for one medication lookup.
///
/// All fields are plain text blocks, possibly multi-line; any field may
/// hold a "consult a professional" placeholder instead of real content.
/// A record whose `name` carries an error or unrecognized marker is an
/// *error record* and must never be persisted — see
/// [`crate::validate::is_error_record`].
///
/// Field names serialize camelCase to match the JSON shape the model is
/// instructed to produce, so a model response parses directly into this
/// struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    pub name: String,
    pub overview: String,
    /// Usage instructions, including dosage.
    pub usage_instructions: String,
    pub side_effects: String,
    /// Contraindications, under the product's user-facing term.
    pub contradictions: String,
    pub storage_instructions: String,
    pub disclaimer: String,
}

/// One source citation accompanying an AI-generated answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingCitation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Citation list accompanying an AI-generated answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingMetadata {
    #[serde(default)]
    pub citations: Vec<GroundingCitation>,
}

impl GroundingMetadata {
    /// Whether the answer carried any citation at all.
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}
