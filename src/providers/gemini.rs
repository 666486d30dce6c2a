//! Gemini `generateContent` client for lookup, vision and translation.
//!
//! One HTTP client serves all three capability traits. The base URL is
//! injectable so tests can point the client at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::traits::{LookupProvider, LookupReply, TranslationProvider, VisionProvider};
use crate::types::{GroundingCitation, GroundingMetadata, LanguageCode};
use crate::{MedhanitError, Result};

/// Default base URL for the Gemini API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for all text and multimodal tasks.
pub const GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Client for the Gemini `generateContent` endpoint.
///
/// Implements [`LookupProvider`], [`VisionProvider`] and
/// [`TranslationProvider`] over a shared `reqwest` client.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
            model: GEMINI_TEXT_MODEL.to_string(),
        }
    }

    /// Override the model ID.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| MedhanitError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MedhanitError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| MedhanitError::Http(e.to_string()))
    }
}

#[async_trait]
#[async_trait]
impl LookupProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn lookup(&self, name: &str, lang: LanguageCode) -> Result<LookupReply> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::text(lookup_prompt(name, lang))],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.3),
                response_mime_type: Some("application/json".to_string()),
                ..Default::default()
            }),
        };

        let response = self.generate(&request).await?;
        let text = response.first_text()?;
        let grounding = response.grounding();
        Ok(LookupReply { text, grounding })
    }
}

#[async_trait]
impl VisionProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn identify(&self, image_jpeg: &[u8]) -> Result<Option<String>> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline_jpeg(image_jpeg),
                    Part::text(VISION_PROMPT.to_string()),
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.1),
                top_k: Some(1),
                top_p: Some(0.8),
                ..Default::default()
            }),
        };

        let response = self.generate(&request).await?;
        let text = response.first_text()?;
        Ok(extract_identified_name(&text))
    }
}

#[async_trait]
impl TranslationProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn translate(&self, text: &str, lang: LanguageCode) -> Result<String> {
        let prompt = format!(
            "Translate the following text to {}: \"{}\". Respond with only the translated text.",
            lang.english_name(),
            text
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: None,
        };

        let response = self.generate(&request).await?;
        Ok(response.first_text()?.trim().to_string())
    }
}

fn lookup_prompt(name: &str, lang: LanguageCode) -> String {
    let language = lang.english_name();
    format!(
        "You are a helpful medication information assistant. Provide detailed information about \
         the medication \"{name}\" in the {language} language.\n\
         Format your response as a single, valid JSON object with exactly these keys, each \
         holding a string value: \"name\", \"overview\", \"usageInstructions\", \"sideEffects\", \
         \"contradictions\", \"storageInstructions\", \"disclaimer\". Usage instructions must \
         include dosage guidance.\n\
         If information for a key is unavailable or not applicable for \"{name}\", use a \
         descriptive phrase in {language} such as \"Information not available\" or \"Consult \
         your doctor\"; never use an empty string.\n\
         If the medication \"{name}\" is not recognized or you cannot provide substantial \
         information about it, set \"name\" to \"{name} - Not Recognized\" and fill the other \
         fields with an appropriate message in {language}.\n\
         Respond with ONLY the JSON object, without surrounding text, explanations, or markdown \
         formatting."
    )
}

const VISION_PROMPT: &str = "Analyze the provided image. If it shows a pharmaceutical product \
(pill, box, bottle) or a prescription, identify and list all medication names clearly visible. \
If it shows a pill, describe its appearance (color, shape, markings) and attempt to identify it \
from those features. Respond with only the most prominent or clearly identifiable medication \
name; if multiple distinct medications are equally clear, list them comma-separated. If no \
medication is identifiable or the image is not medication-related, respond with 'UNKNOWN'. Do \
not add any other explanatory text, greetings, or markdown formatting.";

/// Reduce the model's identification reply to a single name, or `None`
/// for the UNKNOWN sentinel and refusals.
fn extract_identified_name(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("unknown")
        || trimmed.to_lowercase().contains("unable to identify")
    {
        return None;
    }
    trimmed
        .split(',')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline_jpeg(bytes: &[u8]) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: BASE64.encode(bytes),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct WireGroundingChunk {
    web: Option<WireWebSource>,
}

#[derive(Debug, Deserialize)]
struct WireWebSource {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts.
    fn first_text(&self) -> Result<String> {
        let text: String = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(MedhanitError::EmptyResponse);
        }
        Ok(text)
    }

    /// Web citations of the first candidate, mapped into domain types.
    fn grounding(&self) -> Option<GroundingMetadata> {
        let wire = self
            .candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())?;
        let citations: Vec<GroundingCitation> = wire
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .map(|web| GroundingCitation {
                uri: web.uri.clone(),
                title: web.title.clone(),
            })
            .collect();
        if citations.is_empty() {
            return None;
        }
        Some(GroundingMetadata { citations })
    }
}
