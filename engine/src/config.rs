//! TOML configuration.
//!
//! Raw deserialization structs keep every field optional; accessors resolve
//! them to working defaults. A missing file is not an error - the tool runs
//! fine unconfigured. The API key is deliberately NOT config: it lives in
//! the storage document alongside the other settings.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use missive_pagetext::PageFetchConfig;
use missive_types::Language;

#[derive(Debug, Default, Deserialize)]
pub struct MissiveConfig {
    pub app: Option<AppConfig>,
    pub fetch: Option<FetchConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Generation model override.
    pub model: Option<String>,
    /// Default outreach language (two-letter code).
    pub language: Option<String>,
    /// API endpoint override (proxies, tests).
    pub endpoint: Option<String>,
    /// Where CSV and letter exports are written.
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchConfig {
    pub timeout_seconds: Option<u32>,
    pub user_agent: Option<String>,
    pub max_download_bytes: Option<u64>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config at {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config at {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl MissiveConfig {
    /// Load the config at `path`. Missing file resolves to `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {path:?}: {err}");
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {path:?}: {err}");
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn model(&self) -> String {
        self.app
            .as_ref()
            .and_then(|app| app.model.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| missive_providers::DEFAULT_MODEL.to_string())
    }

    #[must_use]
    pub fn default_language(&self) -> Language {
        self.app
            .as_ref()
            .and_then(|app| app.language.as_deref())
            .map(Language::from_code)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn endpoint(&self) -> Option<String> {
        self.app
            .as_ref()
            .and_then(|app| app.endpoint.clone())
            .filter(|e| !e.trim().is_empty())
    }

    #[must_use]
    pub fn export_dir(&self) -> Option<PathBuf> {
        self.app.as_ref().and_then(|app| app.export_dir.clone())
    }

    #[must_use]
    pub fn page_fetch_config(&self) -> PageFetchConfig {
        let defaults = PageFetchConfig::default();
        let Some(fetch) = self.fetch.as_ref() else {
            return defaults;
        };
        PageFetchConfig {
            user_agent: fetch.user_agent.clone().or(defaults.user_agent),
            timeout_seconds: fetch.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            max_download_bytes: fetch
                .max_download_bytes
                .unwrap_or(defaults.max_download_bytes),
        }
    }

    /// Persist the default language back to the config file.
    ///
    /// Uses `toml_edit` to preserve comments and formatting. Creates the
    /// file and parent directory if they don't exist.
    pub fn persist_language(path: &Path, language: Language) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            missive_storage::persist::ensure_secure_dir(parent)?;
        }

        let content = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            String::new()
        };

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if !doc.contains_key("app") {
            doc["app"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        doc["app"]["language"] = toml_edit::value(language.code());

        std::fs::write(path, doc.to_string())
    }
}
