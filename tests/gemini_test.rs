//! Tests for [`GeminiClient`] request/response mapping.

use medhanit::providers::{GEMINI_TEXT_MODEL, GeminiClient};
use medhanit::{LanguageCode, LookupProvider, MedhanitError, TranslationProvider, VisionProvider};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generate_path() -> String {
    format!("/v1beta/models/{GEMINI_TEXT_MODEL}:generateContent")
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"parts": [{"text": text}]}}
        ]
    })
}

async fn serve(body: serde_json::Value) -> (MockServer, GeminiClient) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    let client = GeminiClient::with_base_url("test-key", server.uri());
    (server, client)
}

#[tokio::test]
async fn lookup_returns_raw_text() {
    let record_json = r#"{"name":"Aspirin","overview":"Analgesic"}"#;
    let (_server, client) = serve(text_response(record_json)).await;

    let reply = client.lookup("Aspirin", LanguageCode::En).await.unwrap();
    assert_eq!(reply.text, record_json);
    assert!(reply.grounding.is_none());
}

#[tokio::test]
async fn lookup_maps_grounding_chunks() {
    let body = json!({
        "candidates": [{
            "content": {"parts": [{"text": "{}"}]},
            "groundingMetadata": {
                "groundingChunks": [
                    {"web": {"uri": "https://example.com", "title": "Monograph"}},
                    {"notWeb": {}}
                ]
            }
        }]
    });
    let (_server, client) = serve(body).await;

    let reply = client.lookup("Aspirin", LanguageCode::En).await.unwrap();
    let grounding = reply.grounding.unwrap();
    assert_eq!(grounding.citations.len(), 1);
    assert_eq!(
        grounding.citations[0].uri.as_deref(),
        Some("https://example.com")
    );
    assert_eq!(grounding.citations[0].title.as_deref(), Some("Monograph"));
}

#[tokio::test]
async fn lookup_prompt_carries_query_and_language() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_string_contains("Ibuprofen"))
        .and(body_string_contains("Amharic"))
        .and(body_string_contains("responseMimeType"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    client.lookup("Ibuprofen", LanguageCode::Am).await.unwrap();
}

#[tokio::test]
async fn upstream_failure_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    match client.lookup("Aspirin", LanguageCode::En).await {
        Err(MedhanitError::Api { status, message }) => {
            assert_eq!(status, 429);
            assert!(message.contains("quota"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_candidates_is_empty_response() {
    let (_server, client) = serve(json!({"candidates": []})).await;
    match client.lookup("Aspirin", LanguageCode::En).await {
        Err(MedhanitError::EmptyResponse) => {}
        other => panic!("expected EmptyResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn vision_unknown_sentinel_is_none() {
    let (_server, client) = serve(text_response("UNKNOWN")).await;
    let identified = client.identify(b"jpeg bytes").await.unwrap();
    assert_eq!(identified, None);
}

#[tokio::test]
async fn vision_takes_the_first_of_multiple_names() {
    let (_server, client) = serve(text_response("Aspirin, Tylenol")).await;
    let identified = client.identify(b"jpeg bytes").await.unwrap();
    assert_eq!(identified.as_deref(), Some("Aspirin"));
}

#[tokio::test]
async fn vision_sends_inline_jpeg_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_string_contains("inlineData"))
        .and(body_string_contains("image/jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Aspirin")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    client.identify(b"jpeg bytes").await.unwrap();
}

#[tokio::test]
async fn translate_returns_trimmed_text() {
    let (_server, client) = serve(text_response("  ትርጉም  ")).await;
    let translated = client
        .translate("Consult your doctor.", LanguageCode::Am)
        .await
        .unwrap();
    assert_eq!(translated, "ትርጉም");
}
