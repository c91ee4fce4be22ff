//! Stored history record shape.
//!
//! Records are persisted as JSON under the `letterHistory` key. Field names
//! follow the stored wire shape (`jobDescription`, `isManual`), so existing
//! documents deserialize unchanged.

use serde::{Deserialize, Serialize};

use crate::Language;

/// Record identifier: the creation timestamp in milliseconds.
///
/// Invariant: strictly increasing within one store. Two appends landing in
/// the same millisecond are disambiguated by bumping past the current tail
/// (see [`RecordId::succeeding`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// The id for a record appended at `now_millis` after `tail`.
    ///
    /// Uses the wall clock when it has advanced; otherwise bumps one past the
    /// tail so ids stay unique under same-millisecond appends.
    #[must_use]
    pub fn succeeding(now_millis: i64, tail: Option<RecordId>) -> Self {
        match tail {
            Some(RecordId(last)) if now_millis <= last => Self(last + 1),
            _ => Self(now_millis),
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One history entry, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: RecordId,
    /// Display timestamp, already formatted for the UI.
    pub date: String,
    pub url: String,
    /// Extracted job-posting text. Absent on manual entries.
    #[serde(
        rename = "jobDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub job_description: Option<String>,
    /// Generated text. `None` marks a manual entry with no generated content.
    pub letter: Option<String>,
    /// Two-letter language code of the generation. Absent on manual entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Set (true) only on manual entries.
    #[serde(rename = "isManual", default, skip_serializing_if = "Option::is_none")]
    pub is_manual: Option<bool>,
}

impl HistoryRecord {
    /// Whether this entry was recorded manually, without a generation.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.is_manual.unwrap_or(false)
    }

    /// Whether a generated letter is attached.
    #[must_use]
    pub fn has_letter(&self) -> bool {
        self.letter.as_deref().is_some_and(|l| !l.is_empty())
    }
}

/// What kind of entry to append; the store assigns id and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Generated {
        job_description: String,
        letter: String,
        language: Language,
    },
    Manual,
}

/// A record about to be appended, before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub url: String,
    pub kind: RecordKind,
}

impl NewRecord {
    #[must_use]
    pub fn generated(
        url: impl Into<String>,
        job_description: impl Into<String>,
        letter: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            url: url.into(),
            kind: RecordKind::Generated {
                job_description: job_description.into(),
                letter: letter.into(),
                language,
            },
        }
    }

    #[must_use]
    pub fn manual(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: RecordKind::Manual,
        }
    }

    /// Materialize the stored record.
    #[must_use]
    pub fn into_record(self, id: RecordId, date: String) -> HistoryRecord {
        match self.kind {
            RecordKind::Generated {
                job_description,
                letter,
                language,
            } => HistoryRecord {
                id,
                date,
                url: self.url,
                job_description: Some(job_description),
                letter: Some(letter),
                language: Some(language.code().to_string()),
                is_manual: None,
            },
            RecordKind::Manual => HistoryRecord {
                id,
                date,
                url: self.url,
                job_description: None,
                letter: None,
                language: None,
                is_manual: Some(true),
            },
        }
    }
}
