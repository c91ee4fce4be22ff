//! Persistent storage for Missive.
//!
//! # Architecture
//!
//! The crate is layered bottom-up:
//!
//! - [`persist`] - atomic file writes and secure directory creation
//! - [`kv`] - typed async key-value interface over a single JSON document
//! - [`history`] - the bounded generation-history list (`letterHistory` key)
//! - [`settings`] - singleton settings (`userCV`, `apiKey`, `generatedLetter`)
//!
//! # Failure policy
//!
//! The adapter makes I/O failure first-class: [`kv::KvStore::get`] and
//! [`kv::KvStore::set`] return `Result`, and absence is an explicit
//! `Option`. The stores above apply the forgiving read policy the tool wants
//! at the UI level: a failed or missing read degrades to "empty" with a
//! `tracing::warn!`, while write failures propagate to the caller.

pub mod history;
pub mod kv;
pub mod persist;
pub mod settings;

pub use history::{HISTORY_KEY, HistoryStore, MAX_RECORDS};
pub use kv::{JsonFileStore, KvError, KvStore, MemoryStore};
pub use settings::{API_KEY_KEY, CV_KEY, LETTER_KEY, SettingsStore};
