//! Singleton settings: résumé text, API key, last generated letter.
//!
//! Each value is overwritten wholesale on save; there is no partial update.
//! Reads return `Option<String>` so "never set" stays distinguishable from
//! "explicitly empty".

use crate::kv::{KvError, KvStore};

/// Storage key for the résumé text.
pub const CV_KEY: &str = "userCV";
/// Storage key for the API key.
pub const API_KEY_KEY: &str = "apiKey";
/// Storage key for the last generated letter (session restore).
pub const LETTER_KEY: &str = "generatedLetter";

#[derive(Debug, Clone)]
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KvStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn user_cv(&self) -> Option<String> {
        self.read(CV_KEY).await
    }

    pub async fn set_user_cv(&self, cv: &str) -> Result<(), KvError> {
        self.store.set(CV_KEY, &cv).await
    }

    pub async fn api_key(&self) -> Option<String> {
        self.read(API_KEY_KEY).await
    }

    pub async fn set_api_key(&self, key: &str) -> Result<(), KvError> {
        self.store.set(API_KEY_KEY, &key).await
    }

    /// Whether a non-empty key is on file, without handing the value out.
    pub async fn has_api_key(&self) -> bool {
        self.api_key().await.is_some_and(|k| !k.trim().is_empty())
    }

    pub async fn generated_letter(&self) -> Option<String> {
        self.read(LETTER_KEY).await
    }

    pub async fn set_generated_letter(&self, letter: &str) -> Result<(), KvError> {
        self.store.set(LETTER_KEY, &letter).await
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get::<String>(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read setting {key:?}, treating as unset: {e}");
                None
            }
        }
    }
}
