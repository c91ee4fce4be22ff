//! Best-effort page text for job postings.
//!
//! Fetches a job-posting URL and reduces the HTML to the visible text a
//! reader would see: scripts, styles, and markup dropped, whitespace
//! collapsed. The contract is deliberately forgiving - callers that want the
//! original's "best-effort text or empty" behavior map every error to the
//! empty string at their own boundary.

mod extract;

use std::time::Duration;

use url::Url;

pub use extract::extract_text;

const DEFAULT_USER_AGENT: &str = "missive-pagetext/0.1";
const DEFAULT_TIMEOUT_SECONDS: u32 = 20;
const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 2 * 1024 * 1024;
const MAX_REDIRECTS: usize = 5;

/// Fetch configuration. All fields have working defaults.
#[derive(Debug, Clone)]
pub struct PageFetchConfig {
    pub user_agent: Option<String>,
    pub timeout_seconds: u32,
    pub max_download_bytes: u64,
}

impl Default for PageFetchConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PageTextError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unsupported scheme {0:?} (only http and https)")]
    UnsupportedScheme(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("page returned status {0}")]
    Status(u16),
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
}

/// Fetch `url` and return its visible text.
///
/// The download is capped at `max_download_bytes`; anything past the cap is
/// dropped, which is acceptable for a best-effort extraction.
pub async fn fetch_page_text(
    raw_url: &str,
    config: &PageFetchConfig,
) -> Result<String, PageTextError> {
    let url = Url::parse(raw_url.trim()).map_err(|e| PageTextError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(PageTextError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().is_none() {
        return Err(PageTextError::InvalidUrl("missing host".to_string()));
    }

    let client = reqwest::Client::builder()
        .user_agent(
            config
                .user_agent
                .clone()
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        )
        .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(PageTextError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_ascii_lowercase();
    let is_html = content_type.contains("text/html")
        || content_type.contains("application/xhtml")
        || content_type.is_empty();
    let is_plain = content_type.contains("text/plain");
    if !is_html && !is_plain {
        return Err(PageTextError::UnsupportedContentType(content_type));
    }

    let body = read_capped_body(response, config.max_download_bytes).await?;

    if is_plain {
        return Ok(collapse_plain(&body));
    }
    Ok(extract_text(&body))
}

async fn read_capped_body(
    mut response: reqwest::Response,
    max_bytes: u64,
) -> Result<String, PageTextError> {
    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() as u64 > max_bytes {
            tracing::debug!(cap = max_bytes, "Page body truncated at download cap");
            body.truncate(max_bytes as usize);
            break;
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn collapse_plain(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}
