//! Google Gemini `generateContent` implementation.
//!
//! Request body shape:
//!
//! ```json
//! { "contents": [ { "parts": [ { "text": "<prompt>" } ] } ] }
//! ```
//!
//! Response shape (only the fields we read):
//!
//! ```json
//! { "candidates": [ { "content": { "parts": [ { "text": "<result>" } ] } } ] }
//! ```
//!
//! The key travels in the `x-goog-api-key` header, never in the URL.

use serde::Deserialize;
use serde_json::{Value, json};

use missive_types::{ApiKey, GenerateError};

use crate::{
    GenerationClient, classify_status, classify_transport, endpoint_reachable,
    read_capped_error_body,
};

/// Build the request body for `generateContent`.
pub(crate) fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    })
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the first candidate's text out of a parsed response.
///
/// Returns `None` when there is no candidate, no part, or only
/// empty/whitespace text - all of which surface as `EmptyResult`.
fn extract_candidate_text(response: GenerateContentResponse) -> Option<String> {
    let text = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text?;
    if text.trim().is_empty() { None } else { Some(text) }
}

pub(crate) async fn generate(
    client: &GenerationClient,
    prompt: &str,
    api_key: &ApiKey,
) -> Result<String, GenerateError> {
    if api_key.is_blank() {
        return Err(GenerateError::MissingCredential);
    }

    if !endpoint_reachable(client.base_url()).await {
        return Err(GenerateError::NetworkUnavailable);
    }

    let url = format!(
        "{}/models/{}:generateContent",
        client.base_url(),
        client.model()
    );

    let response = client
        .http()
        .post(&url)
        .header("x-goog-api-key", api_key.expose_secret())
        .header("content-type", "application/json")
        .json(&build_request_body(prompt))
        .timeout(client.timeout())
        .send()
        .await
        .map_err(|e| {
            let classified = classify_transport(&e);
            tracing::warn!("Generation request failed before a response: {e}");
            classified
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = read_capped_error_body(response).await;
        tracing::warn!(status = status.as_u16(), "Generation request rejected: {error_text}");
        return Err(classify_status(status));
    }

    let parsed: GenerateContentResponse = match response.json().await {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Unparseable generation response body: {e}");
            return Err(GenerateError::EmptyResult);
        }
    };

    extract_candidate_text(parsed).ok_or(GenerateError::EmptyResult)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use missive_types::{ApiKey, GenerateError};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{build_request_body, extract_candidate_text};
    use crate::GenerationClient;

    fn candidate_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
    }

    fn client_for(server: &MockServer) -> GenerationClient {
        GenerationClient::with_base_url(server.uri())
    }

    #[test]
    fn request_body_wraps_the_prompt() {
        let body = build_request_body("write me a note");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "write me a note");
    }

    #[test]
    fn candidate_text_survives_extraction_verbatim() {
        let response = serde_json::from_value(candidate_body("  Dear recruiter,\n...  ")).unwrap();
        assert_eq!(
            extract_candidate_text(response).as_deref(),
            Some("  Dear recruiter,\n...  ")
        );
    }

    #[test]
    fn whitespace_only_candidate_is_rejected() {
        let response = serde_json::from_value(candidate_body("  \n\t ")).unwrap();
        assert!(extract_candidate_text(response).is_none());
    }

    #[tokio::test]
    async fn blank_key_fails_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("prompt", &ApiKey::new("  ")).await;
        assert_eq!(result, Err(GenerateError::MissingCredential));
    }

    #[tokio::test]
    async fn success_returns_the_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "AIza-test"))
            .and(body_json(json!({
                "contents": [{ "parts": [{ "text": "the prompt" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("A fine note.")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let letter = client
            .generate("the prompt", &ApiKey::new("AIza-test"))
            .await
            .expect("generate");
        assert_eq!(letter, "A fine note.");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_invalid_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("prompt", &ApiKey::new("bad")).await;
        assert_eq!(result, Err(GenerateError::InvalidCredential));
    }

    #[tokio::test]
    async fn throttled_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("prompt", &ApiKey::new("key")).await;
        assert_eq!(result, Err(GenerateError::RateLimited));
    }

    #[tokio::test]
    async fn server_error_maps_to_service_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("prompt", &ApiKey::new("key")).await;
        assert_eq!(result, Err(GenerateError::ServiceUnavailable));
    }

    #[tokio::test]
    async fn other_statuses_map_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("prompt", &ApiKey::new("key")).await;
        assert!(matches!(
            result,
            Err(GenerateError::ApiError { status: 418, .. })
        ));
    }

    #[tokio::test]
    async fn empty_candidates_map_to_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("prompt", &ApiKey::new("key")).await;
        assert_eq!(result, Err(GenerateError::EmptyResult));
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate_body("late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).with_timeout(Duration::from_millis(200));
        let result = client.generate("prompt", &ApiKey::new("key")).await;
        assert_eq!(result, Err(GenerateError::Timeout));
    }
}
