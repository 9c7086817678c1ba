//! # History Repository
//!
//! Persistence for the day's append-only ledger: the `history/{day}`
//! document.
//!
//! ## Append Pattern
//! Appends branch on [`Lookup`] rather than catching a not-found error:
//! an existing document gets the entry pushed onto its list, an absent one
//! is created with the entry as its first element. First write of the day
//! is what brings the bucket into existence.

use chrono::Utc;
use miga_core::{HistoryDocument, LedgerEntry};
use miga_core::day::DayKey;
use tracing::debug;

use crate::document::{self, DocumentStore, Lookup};
use crate::error::StoreResult;

/// Repository for `history/{day}` documents.
#[derive(Debug, Clone)]
pub struct HistoryRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> HistoryRepository<S> {
    pub fn new(store: S) -> Self {
        HistoryRepository { store }
    }

    /// Reads the day's history document, absence as `NotFound`.
    pub async fn fetch_day(&self, day: &DayKey) -> StoreResult<Lookup<HistoryDocument>> {
        match self.store.get(document::HISTORY, day.as_str()).await? {
            Lookup::Exists(body) => Ok(Lookup::Exists(serde_json::from_value(body)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    /// The day's entries; an unwritten day reads as an empty list.
    pub async fn fetch_entries(&self, day: &DayKey) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self.fetch_day(day).await?.unwrap_or_default().entries)
    }

    /// Appends one entry to the day's ledger, creating the document on
    /// first write.
    pub async fn append_entry(&self, day: &DayKey, entry: LedgerEntry) -> StoreResult<()> {
        let mut doc = match self.fetch_day(day).await? {
            Lookup::Exists(doc) => doc,
            Lookup::NotFound => HistoryDocument::default(),
        };
        doc.entries.push(entry);
        doc.last_updated = Some(Utc::now());

        let body = serde_json::to_value(&doc)?;
        self.store.put(document::HISTORY, day.as_str(), body).await?;
        debug!(day = %day, entries = doc.entries.len(), "ledger entry appended");
        Ok(())
    }

    /// Truncates the day's entry list, leaving the clear markers behind so
    /// the reset itself stays visible.
    pub async fn clear_entries(&self, day: &DayKey) -> StoreResult<()> {
        let now = Utc::now();
        let doc = HistoryDocument {
            entries: Vec::new(),
            cleared: true,
            cleared_at: Some(now),
            last_updated: Some(now),
        };
        let body = serde_json::to_value(&doc)?;
        self.store.put(document::HISTORY, day.as_str(), body).await?;
        debug!(day = %day, "history cleared");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::{DateTime, Utc};

    fn day() -> DayKey {
        DayKey::parse("2026-08-23").unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-08-23T09:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_first_append_creates_document() {
        let repo = HistoryRepository::new(MemoryStore::new());
        assert_eq!(repo.fetch_day(&day()).await.unwrap(), Lookup::NotFound);

        repo.append_entry(&day(), LedgerEntry::new_product("Pan", 10, now()))
            .await
            .unwrap();

        let doc = repo.fetch_day(&day()).await.unwrap();
        assert!(doc.exists());
        assert_eq!(repo.fetch_entries(&day()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_appends_preserve_order() {
        let repo = HistoryRepository::new(MemoryStore::new());
        repo.append_entry(&day(), LedgerEntry::new_product("Pan", 10, now()))
            .await
            .unwrap();
        repo.append_entry(&day(), LedgerEntry::addition("Pan", 5, 10, now()))
            .await
            .unwrap();

        let entries = repo.fetch_entries(&day()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "Producto nuevo: Pan");
        assert_eq!(entries[1].description, "Stock añadido: Pan");
    }

    #[tokio::test]
    async fn test_clear_keeps_markers() {
        let repo = HistoryRepository::new(MemoryStore::new());
        repo.append_entry(&day(), LedgerEntry::new_product("Pan", 10, now()))
            .await
            .unwrap();
        repo.clear_entries(&day()).await.unwrap();

        let doc = repo.fetch_day(&day()).await.unwrap().unwrap_or_default();
        assert!(doc.entries.is_empty());
        assert!(doc.cleared);
        assert!(doc.cleared_at.is_some());
    }
}
