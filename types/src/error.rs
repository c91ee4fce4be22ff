//! Generation failure taxonomy.
//!
//! Every failure of the generate pipeline is one terminal [`GenerateError`];
//! no variant is retried automatically. `Display` gives the message shown
//! inline in the UI.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// No API key on file. Checked before any request is issued.
    #[error("No API key saved. Add one in Settings.")]
    MissingCredential,

    /// Endpoint host could not be resolved; the request was never attempted.
    #[error("No internet connection. Please check your network.")]
    NetworkUnavailable,

    /// The 30-second request timeout elapsed and the request was aborted.
    #[error("The request timed out. Try again.")]
    Timeout,

    /// 401 or 403 from the API.
    #[error("Invalid API key. Please check your settings.")]
    InvalidCredential,

    /// 429 from the API.
    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,

    /// 500 or 503 from the API.
    #[error("The generation service is temporarily unavailable. Try again later.")]
    ServiceUnavailable,

    /// Any other non-2xx status.
    #[error("API returned error: {status} {status_text}")]
    ApiError { status: u16, status_text: String },

    /// 2xx response without a usable candidate text.
    #[error("The model returned no content. Try a different job description.")]
    EmptyResult,

    /// The stored CV is empty; nothing to generate from.
    #[error("Please enter your CV first.")]
    MissingInput,
}

impl GenerateError {
    /// True for failures that never reached the network.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::NetworkUnavailable | Self::MissingInput
        )
    }
}
