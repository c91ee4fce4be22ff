//! Data directory resolution.
//!
//! Everything Missive persists lives under one directory: the storage
//! document, the config file, and the log files. Primary location is
//! `~/.missive`; when no home directory can be determined we fall back to
//! `./.missive` so constrained environments still work.

use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = ".missive";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirSource {
    Home,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct DataDir {
    path: PathBuf,
    source: DataDirSource,
}

impl DataDir {
    /// Resolve the default data directory.
    #[must_use]
    pub fn resolve() -> Self {
        match dirs::home_dir() {
            Some(home) => Self {
                path: home.join(DATA_DIR_NAME),
                source: DataDirSource::Home,
            },
            None => Self {
                path: PathBuf::from(DATA_DIR_NAME),
                source: DataDirSource::Fallback,
            },
        }
    }

    /// A data directory rooted at an explicit path (tests).
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: DataDirSource::Fallback,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn source(&self) -> DataDirSource {
        self.source
    }

    /// The key-value storage document.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.path.join("store.json")
    }

    /// The TOML config file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// Directory for log files.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.path.join("logs")
    }
}
