//! Shared domain types for Missive.
//!
//! This crate holds the types every other crate agrees on: the stored history
//! record shape, the outreach-language table, the generation error taxonomy,
//! and the API-key wrapper. It performs no I/O.

pub mod error;
pub mod language;
pub mod record;

pub use error::GenerateError;
pub use language::Language;
pub use record::{HistoryRecord, NewRecord, RecordId, RecordKind};

/// Gemini API key.
///
/// Wrapped so the secret never leaks through `Debug` formatting (logs, error
/// chains, `{:?}` in tests). Access to the raw value is explicit via
/// [`ApiKey::expose_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for embedding in the auth header.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// True when the key is empty or whitespace-only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Which kind of outreach text to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStyle {
    /// Short recruiter note, ready to paste into a LinkedIn conversation.
    #[default]
    LinkedInNote,
    /// Formal cover letter, ready to send by email.
    CoverLetter,
}

impl MessageStyle {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LinkedInNote => "LinkedIn note",
            Self::CoverLetter => "Cover letter",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::LinkedInNote => Self::CoverLetter,
            Self::CoverLetter => Self::LinkedInNote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiKey, MessageStyle};

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("AIza-very-secret");
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("secret"));
        assert_eq!(rendered, "ApiKey(<redacted>)");
    }

    #[test]
    fn api_key_blank_detection() {
        assert!(ApiKey::new("").is_blank());
        assert!(ApiKey::new("   ").is_blank());
        assert!(!ApiKey::new("AIza").is_blank());
    }

    #[test]
    fn message_style_toggles_between_both() {
        let style = MessageStyle::default();
        assert_eq!(style, MessageStyle::LinkedInNote);
        assert_eq!(style.toggled(), MessageStyle::CoverLetter);
        assert_eq!(style.toggled().toggled(), MessageStyle::LinkedInNote);
    }
}
