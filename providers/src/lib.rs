//! Gemini generation client.
//!
//! # Architecture
//!
//! One provider, one unary call: [`GenerationClient::generate`] issues a
//! single `generateContent` POST and returns the extracted candidate text.
//! There is no streaming and no retry - every failure is a terminal
//! [`GenerateError`] for that invocation.
//!
//! # Failure classification
//!
//! | Condition                      | Error                |
//! |--------------------------------|----------------------|
//! | blank API key                  | `MissingCredential`  |
//! | endpoint host unresolvable     | `NetworkUnavailable` |
//! | 30 s request timeout elapsed   | `Timeout`            |
//! | HTTP 401 / 403                 | `InvalidCredential`  |
//! | HTTP 429                       | `RateLimited`        |
//! | HTTP 500 / 503                 | `ServiceUnavailable` |
//! | other non-2xx                  | `ApiError`           |
//! | 2xx without usable candidate   | `EmptyResult`        |
//!
//! The base URL, model, and timeout are injectable so tests can point the
//! client at a local mock server with a short timeout.

pub mod gemini;

use std::time::Duration;

use missive_types::{ApiKey, GenerateError};

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Per-request timeout. The request is aborted when it elapses.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(3);
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl Default for GenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(GEMINI_API_BASE_URL)
    }

    /// Client against a non-default base URL (tests, proxies).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .https_only(base_url.starts_with("https://"))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client: {e}. Falling back to defaults.");
                reqwest::Client::new()
            });
        Self {
            http,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text for `prompt`. See the crate docs for the failure table.
    pub async fn generate(
        &self,
        prompt: &str,
        api_key: &ApiKey,
    ) -> Result<String, GenerateError> {
        gemini::generate(self, prompt, api_key).await
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Map a non-2xx HTTP status to its terminal error.
pub(crate) fn classify_status(status: reqwest::StatusCode) -> GenerateError {
    match status.as_u16() {
        401 | 403 => GenerateError::InvalidCredential,
        429 => GenerateError::RateLimited,
        500 | 503 => GenerateError::ServiceUnavailable,
        code => GenerateError::ApiError {
            status: code,
            status_text: status.canonical_reason().unwrap_or("").to_string(),
        },
    }
}

/// Map a transport-level failure (no HTTP status available).
pub(crate) fn classify_transport(error: &reqwest::Error) -> GenerateError {
    if error.is_timeout() {
        GenerateError::Timeout
    } else {
        GenerateError::NetworkUnavailable
    }
}

/// Best-effort reachability probe: resolve the endpoint host.
///
/// Resolution failure means offline; a slow resolver is not treated as
/// offline - the request itself will report the real failure.
pub(crate) async fn endpoint_reachable(base_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base_url) else {
        return true;
    };
    let Some(host) = url.host_str() else {
        return true;
    };
    let port = url.port_or_known_default().unwrap_or(443);

    match tokio::time::timeout(
        REACHABILITY_TIMEOUT,
        tokio::net::lookup_host((host, port)),
    )
    .await
    {
        Ok(Ok(mut addrs)) => addrs.next().is_some(),
        Ok(Err(e)) => {
            tracing::warn!("Endpoint host {host:?} did not resolve: {e}");
            false
        }
        Err(_) => true,
    }
}

/// Read an error body without letting a hostile response grow unbounded.
pub(crate) async fn read_capped_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
