//! Outreach language table.
//!
//! Two-letter codes map to the English language names embedded in the prompt.
//! Unknown codes resolve to English.

/// Languages the generated message can be written in.
///
/// Stored and configured as the two-letter code, never as the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    French,
    #[default]
    English,
    Spanish,
    German,
    Italian,
    Portuguese,
    Dutch,
    Swedish,
    Norwegian,
    Danish,
    Finnish,
    Polish,
    Russian,
    Japanese,
    Chinese,
    Korean,
    Arabic,
}

impl Language {
    /// All supported languages, in selector order.
    pub const ALL: [Language; 17] = [
        Self::French,
        Self::English,
        Self::Spanish,
        Self::German,
        Self::Italian,
        Self::Portuguese,
        Self::Dutch,
        Self::Swedish,
        Self::Norwegian,
        Self::Danish,
        Self::Finnish,
        Self::Polish,
        Self::Russian,
        Self::Japanese,
        Self::Chinese,
        Self::Korean,
        Self::Arabic,
    ];

    /// Resolve a two-letter code. Unrecognized codes fall back to English.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "fr" => Self::French,
            "en" => Self::English,
            "es" => Self::Spanish,
            "de" => Self::German,
            "it" => Self::Italian,
            "pt" => Self::Portuguese,
            "nl" => Self::Dutch,
            "sv" => Self::Swedish,
            "no" => Self::Norwegian,
            "da" => Self::Danish,
            "fi" => Self::Finnish,
            "pl" => Self::Polish,
            "ru" => Self::Russian,
            "ja" => Self::Japanese,
            "zh" => Self::Chinese,
            "ko" => Self::Korean,
            "ar" => Self::Arabic,
            _ => Self::English,
        }
    }

    /// The stored two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::French => "fr",
            Self::English => "en",
            Self::Spanish => "es",
            Self::German => "de",
            Self::Italian => "it",
            Self::Portuguese => "pt",
            Self::Dutch => "nl",
            Self::Swedish => "sv",
            Self::Norwegian => "no",
            Self::Danish => "da",
            Self::Finnish => "fi",
            Self::Polish => "pl",
            Self::Russian => "ru",
            Self::Japanese => "ja",
            Self::Chinese => "zh",
            Self::Korean => "ko",
            Self::Arabic => "ar",
        }
    }

    /// The English name embedded in the prompt.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::French => "French",
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::German => "German",
            Self::Italian => "Italian",
            Self::Portuguese => "Portuguese",
            Self::Dutch => "Dutch",
            Self::Swedish => "Swedish",
            Self::Norwegian => "Norwegian",
            Self::Danish => "Danish",
            Self::Finnish => "Finnish",
            Self::Polish => "Polish",
            Self::Russian => "Russian",
            Self::Japanese => "Japanese",
            Self::Chinese => "Chinese",
            Self::Korean => "Korean",
            Self::Arabic => "Arabic",
        }
    }

    /// Next language in selector order, wrapping at the end.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous language in selector order, wrapping at the start.
    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
