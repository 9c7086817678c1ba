//! # Sales Repository
//!
//! Persistence for the day's POS document: the `pos/{day}` sales list and
//! its running metadata (`createdAt`, `lastSale`, `totalSales`).
//!
//! Recording a sale is append-only union: the new sale joins the list and
//! the metadata advances; existing sales are never rewritten.

use chrono::Utc;
use miga_core::{PosDocument, Sale, SaleDraft, SalesLedger};
use miga_core::day::DayKey;
use tracing::{debug, info};

use crate::document::{self, DocumentStore, Lookup};
use crate::error::StoreResult;

/// Repository for `pos/{day}` documents.
#[derive(Debug, Clone)]
pub struct SalesRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> SalesRepository<S> {
    pub fn new(store: S) -> Self {
        SalesRepository { store }
    }

    /// Reads the day's POS document, absence as `NotFound`.
    pub async fn fetch_day(&self, day: &DayKey) -> StoreResult<Lookup<PosDocument>> {
        match self.store.get(document::POS, day.as_str()).await? {
            Lookup::Exists(body) => Ok(Lookup::Exists(serde_json::from_value(body)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    /// The day's sales as a [`SalesLedger`]; an unwritten day is empty.
    pub async fn ledger(&self, day: &DayKey) -> StoreResult<SalesLedger> {
        let doc = self.fetch_day(day).await?.unwrap_or_default();
        Ok(SalesLedger::new(doc.sales))
    }

    /// Finalizes the draft and appends the resulting sale to the day's
    /// document, creating the bucket (with `createdAt`) on first sale.
    pub async fn record_sale(&self, day: &DayKey, draft: SaleDraft) -> StoreResult<Sale> {
        let now = Utc::now();
        let sale = draft.finalize(now, day.clone());

        let mut doc = match self.fetch_day(day).await? {
            Lookup::Exists(doc) => doc,
            Lookup::NotFound => PosDocument {
                created_at: Some(now),
                date: Some(day.clone()),
                ..PosDocument::default()
            },
        };
        doc.sales.push(sale.clone());
        doc.total_sales += 1;
        doc.last_sale = Some(now);
        doc.last_updated = Some(now);

        let body = serde_json::to_value(&doc)?;
        self.store.put(document::POS, day.as_str(), body).await?;
        info!(
            day = %day,
            sale_id = %sale.id,
            total = sale.total,
            method = %sale.payment_method,
            "sale recorded"
        );
        Ok(sale)
    }

    /// Empties the day's sales list. Clear markers and a zeroed counter
    /// stay behind; `createdAt` survives so the bucket's origin is kept.
    pub async fn clear_sales(&self, day: &DayKey) -> StoreResult<()> {
        let now = Utc::now();
        let mut doc = self.fetch_day(day).await?.unwrap_or_default();
        doc.sales.clear();
        doc.total_sales = 0;
        doc.cleared = true;
        doc.cleared_at = Some(now);
        doc.last_updated = Some(now);

        let body = serde_json::to_value(&doc)?;
        self.store.put(document::POS, day.as_str(), body).await?;
        debug!(day = %day, "sales cleared");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
