//! Bounded generation-history list.
//!
//! The list lives under the `letterHistory` key in storage order
//! (chronological, oldest first). Appends go to the tail; once the list
//! exceeds [`MAX_RECORDS`] entries the oldest are evicted from the head.
//! Display order is the caller's concern (reverse for most-recent-first).

use chrono::{Local, Utc};

use missive_types::{HistoryRecord, NewRecord, RecordId};

use crate::kv::{KvError, KvStore};

/// Storage key for the history list.
pub const HISTORY_KEY: &str = "letterHistory";

/// Upper bound on retained records.
pub const MAX_RECORDS: usize = 50;

/// History store layered on a [`KvStore`].
///
/// Reads degrade: a missing or failed read yields the empty list (with a
/// warn log), so the UI never blocks on a broken document. Writes surface
/// their [`KvError`].
#[derive(Debug, Clone)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KvStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All records in storage order (chronological).
    pub async fn list(&self) -> Vec<HistoryRecord> {
        match self.store.get::<Vec<HistoryRecord>>(HISTORY_KEY).await {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Append a record at the tail, evicting from the head past the bound.
    ///
    /// Assigns the next id: the current wall clock in milliseconds, bumped
    /// past the tail id when the clock has not advanced.
    pub async fn append(&self, new: NewRecord) -> Result<RecordId, KvError> {
        let mut records = self.list().await;

        let now_millis = Utc::now().timestamp_millis();
        let id = RecordId::succeeding(now_millis, records.last().map(|r| r.id));
        let date = Local::now().format("%d/%m/%Y %H:%M").to_string();
        records.push(new.into_record(id, date));

        while records.len() > MAX_RECORDS {
            records.remove(0);
        }

        self.store.set(HISTORY_KEY, &records).await?;
        Ok(id)
    }

    /// Remove the record with `id`. No-op when the id is absent.
    pub async fn remove(&self, id: RecordId) -> Result<(), KvError> {
        let mut records = self.list().await;
        records.retain(|r| r.id != id);
        self.store.set(HISTORY_KEY, &records).await
    }

    /// Replace the list with the empty list.
    pub async fn clear(&self) -> Result<(), KvError> {
        let empty: Vec<HistoryRecord> = Vec::new();
        self.store.set(HISTORY_KEY, &empty).await
    }

    /// Look up a single record by id.
    pub async fn find(&self, id: RecordId) -> Option<HistoryRecord> {
        self.list().await.into_iter().find(|r| r.id == id)
    }
}
