//! # Ledger Service
//!
//! Orchestration of the day-bucket writes: one operation here is one user
//! action at the counter.
//!
//! ## Write Choreography
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Operation Shape                                     │
//! │                                                                         │
//! │  resolve DayKey::today() ONCE                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate against current projection  ── reject ──► no write happens    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  awaited writes, in sequence:                                           │
//! │    checkout:  record_sale ──► withdraw per item ──► append sale entry   │
//! │    add:       add_new / add_existing ──► append entry                   │
//! │    withdraw:  withdraw ──► append withdrawal entry                      │
//! │                                                                         │
//! │  No multi-document transaction. A failure mid-sequence leaves the       │
//! │  earlier writes in place; status goes to Error and the error surfaces.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use miga_core::day::DayKey;
use miga_core::validation::{
    validate_checkout, validate_product_name, validate_quantity, validate_withdrawal,
};
use miga_core::{
    final_stats, flatten_entries, FinalStats, LedgerEntry, ReportRow, RowFilter, Sale, SaleDraft,
    StockChange, StockProjection, WithdrawalKind,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::DocumentStore;
use crate::error::LedgerResult;
use crate::repository::{HistoryRepository, ProductCatalog, SalesRepository, StockRepository};

// =============================================================================
// Requests
// =============================================================================

/// Stock intake: a product and how many units arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStockRequest {
    pub product_name: String,
    pub quantity: i64,
}

/// Administrative withdrawal request from the stock form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub product_name: String,
    pub quantity: i64,
    pub withdrawal_type: WithdrawalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// =============================================================================
// Status
// =============================================================================

/// Coarse operation status surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpStatus {
    #[default]
    Idle,
    Loading,
    Saving,
    Error,
}

// =============================================================================
// Service
// =============================================================================

/// The counter-facing service owning the day-bucket repositories.
///
/// Each operation resolves today's [`DayKey`] exactly once, so a sale rung
/// up at 23:59:58 lands wholly in that day even if the writes finish after
/// midnight.
#[derive(Debug, Clone)]
pub struct LedgerService<S: DocumentStore> {
    stock: StockRepository<S>,
    history: HistoryRepository<S>,
    sales: SalesRepository<S>,
    catalog: ProductCatalog<S>,
    status: OpStatus,
}

impl<S: DocumentStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        LedgerService {
            stock: StockRepository::new(store.clone()),
            history: HistoryRepository::new(store.clone()),
            sales: SalesRepository::new(store.clone()),
            catalog: ProductCatalog::new(store),
            status: OpStatus::Idle,
        }
    }

    /// Last operation's status.
    pub fn status(&self) -> OpStatus {
        self.status
    }

    // -------------------------------------------------------------------------
    // Repository access
    // -------------------------------------------------------------------------

    pub fn stock(&self) -> &StockRepository<S> {
        &self.stock
    }

    pub fn history(&self) -> &HistoryRepository<S> {
        &self.history
    }

    pub fn sales(&self) -> &SalesRepository<S> {
        &self.sales
    }

    pub fn catalog(&self) -> &ProductCatalog<S> {
        &self.catalog
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Adds stock for today. A product already in today's projection gets
    /// an `addition` entry, a product not yet stocked today a `new` entry.
    pub async fn add_stock(&mut self, request: AddStockRequest) -> LedgerResult<StockChange> {
        self.status = OpStatus::Saving;
        let result = self.add_stock_inner(request).await;
        self.finish(result)
    }

    async fn add_stock_inner(&self, request: AddStockRequest) -> LedgerResult<StockChange> {
        validate_product_name(&request.product_name)?;
        validate_quantity(request.quantity)?;

        let day = DayKey::today();
        let existing = self.stock.quantity(&day, &request.product_name).await?;

        let (change, entry) = if existing > 0 {
            let change = self
                .stock
                .add_existing(&day, &request.product_name, request.quantity)
                .await?;
            let entry = LedgerEntry::addition(
                &request.product_name,
                request.quantity,
                change.previous_quantity,
                Utc::now(),
            );
            (change, entry)
        } else {
            let change = self
                .stock
                .add_new(&day, &request.product_name, request.quantity)
                .await?;
            let entry = LedgerEntry::new_product(&request.product_name, request.quantity, Utc::now());
            (change, entry)
        };

        self.history.append_entry(&day, entry).await?;
        info!(
            day = %day,
            product = %request.product_name,
            quantity = request.quantity,
            "stock added"
        );
        Ok(change)
    }

    /// Withdraws units for a non-sale reason (damaged, expired, ...).
    /// Rejected outright when the request exceeds today's stock.
    pub async fn withdraw_stock(&mut self, request: WithdrawRequest) -> LedgerResult<StockChange> {
        self.status = OpStatus::Saving;
        let result = self.withdraw_stock_inner(request).await;
        self.finish(result)
    }

    async fn withdraw_stock_inner(&self, request: WithdrawRequest) -> LedgerResult<StockChange> {
        let day = DayKey::today();
        let available = self.stock.quantity(&day, &request.product_name).await?;
        validate_withdrawal(&request.product_name, request.quantity, available)?;

        let change = self
            .stock
            .withdraw(&day, &request.product_name, request.quantity)
            .await?;
        let entry = LedgerEntry::withdrawal(
            &request.product_name,
            request.quantity,
            change.previous_quantity,
            request.withdrawal_type,
            request.reason.clone(),
            Utc::now(),
        );
        self.history.append_entry(&day, entry).await?;
        info!(
            day = %day,
            product = %request.product_name,
            quantity = request.quantity,
            kind = ?request.withdrawal_type,
            "stock withdrawn"
        );
        Ok(change)
    }

    /// Rings up a sale: validates the whole cart against current stock,
    /// records the sale, withdraws each line and appends one `sale` entry
    /// whose changes all carry the sale id.
    pub async fn checkout(&mut self, draft: SaleDraft) -> LedgerResult<Sale> {
        self.status = OpStatus::Saving;
        let result = self.checkout_inner(draft).await;
        self.finish(result)
    }

    async fn checkout_inner(&self, draft: SaleDraft) -> LedgerResult<Sale> {
        let day = DayKey::today();
        let projection: StockProjection = self.stock.load(&day).await?;
        validate_checkout(&draft, &projection)?;

        let sale = self.sales.record_sale(&day, draft).await?;

        // Each withdrawal reports the stock level it saw, which the sale
        // entry's changes then carry as previousQuantity.
        let mut previous_quantities = Vec::with_capacity(sale.items.len());
        for item in &sale.items {
            let change = self
                .stock
                .withdraw(&day, &item.product_name, item.quantity)
                .await?;
            previous_quantities.push(change.previous_quantity);
        }

        let entry = LedgerEntry::sale(&sale, &previous_quantities, Utc::now());
        self.history.append_entry(&day, entry).await?;
        info!(
            day = %day,
            sale_id = %sale.id,
            total = sale.total,
            items = sale.items.len(),
            "checkout complete"
        );
        Ok(sale)
    }

    /// Today's report: flattened rows (most recent first) plus the header
    /// figures replayed from the full entry list.
    pub async fn report_rows(
        &mut self,
        filter: RowFilter,
    ) -> LedgerResult<(Vec<ReportRow>, FinalStats)> {
        self.status = OpStatus::Loading;
        let result = async {
            let day = DayKey::today();
            let entries = self.history.fetch_entries(&day).await?;
            Ok((flatten_entries(&entries, filter), final_stats(&entries)))
        }
        .await;
        self.finish(result)
    }

    /// Administrative reset of today's history (clear markers stay).
    pub async fn clear_today_history(&mut self) -> LedgerResult<()> {
        self.status = OpStatus::Saving;
        let result = async {
            self.history.clear_entries(&DayKey::today()).await?;
            Ok(())
        }
        .await;
        self.finish(result)
    }

    /// Administrative reset of today's sales (clear markers stay).
    pub async fn clear_today_sales(&mut self) -> LedgerResult<()> {
        self.status = OpStatus::Saving;
        let result = async {
            self.sales.clear_sales(&DayKey::today()).await?;
            Ok(())
        }
        .await;
        self.finish(result)
    }

    fn finish<T>(&mut self, result: LedgerResult<T>) -> LedgerResult<T> {
        match &result {
            Ok(_) => self.status = OpStatus::Idle,
            Err(err) => {
                self.status = OpStatus::Error;
                warn!(error = %err, "ledger operation failed");
            }
        }
        result
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::memory::MemoryStore;
    use miga_core::{CoreError, EntryKind, SaleItem};

    fn service() -> LedgerService<MemoryStore> {
        LedgerService::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_add_stock_first_then_addition() {
        let mut svc = service();
        let first = svc
            .add_stock(AddStockRequest {
                product_name: "Marraqueta".to_string(),
                quantity: 20,
            })
            .await
            .unwrap();
        assert_eq!(first.previous_quantity, 0);

        let second = svc
            .add_stock(AddStockRequest {
                product_name: "Marraqueta".to_string(),
                quantity: 5,
            })
            .await
            .unwrap();
        assert_eq!(second.previous_quantity, 20);
        assert_eq!(second.new_quantity, 25);

        let entries = svc
            .history()
            .fetch_entries(&DayKey::today())
            .await
            .unwrap();
        assert_eq!(entries[0].kind, EntryKind::New);
        assert_eq!(entries[1].kind, EntryKind::Addition);
        assert_eq!(svc.status(), OpStatus::Idle);
    }

    #[tokio::test]
    async fn test_withdraw_rejects_overdraw_without_writes() {
        let mut svc = service();
        svc.add_stock(AddStockRequest {
            product_name: "Pan".to_string(),
            quantity: 4,
        })
        .await
        .unwrap();

        let err = svc
            .withdraw_stock(WithdrawRequest {
                product_name: "Pan".to_string(),
                quantity: 10,
                withdrawal_type: WithdrawalKind::Damaged,
                reason: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(svc.status(), OpStatus::Error);

        // Stock untouched, no withdrawal entry appended.
        let day = DayKey::today();
        assert_eq!(svc.stock().quantity(&day, "Pan").await.unwrap(), 4);
        assert_eq!(svc.history().fetch_entries(&day).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_writes_all_three_documents() {
        let mut svc = service();
        svc.add_stock(AddStockRequest {
            product_name: "Marraqueta".to_string(),
            quantity: 20,
        })
        .await
        .unwrap();
        svc.add_stock(AddStockRequest {
            product_name: "Hallulla".to_string(),
            quantity: 8,
        })
        .await
        .unwrap();

        let sale = svc
            .checkout(SaleDraft::new(
                vec![
                    SaleItem::new("Marraqueta", 5.0, 2),
                    SaleItem::new("Hallulla", 20.0, 1),
                ],
                "efectivo",
            ))
            .await
            .unwrap();
        assert_eq!(sale.total, 30.0);

        let day = DayKey::today();
        assert_eq!(svc.stock().quantity(&day, "Marraqueta").await.unwrap(), 18);
        assert_eq!(svc.stock().quantity(&day, "Hallulla").await.unwrap(), 7);

        let ledger = svc.sales().ledger(&day).await.unwrap();
        assert_eq!(ledger.sales_count(), 1);

        let entries = svc.history().fetch_entries(&day).await.unwrap();
        let sale_entry = entries.last().unwrap();
        assert_eq!(sale_entry.kind, EntryKind::Sale);
        assert_eq!(sale_entry.changes.len(), 2);
        for change in &sale_entry.changes {
            assert_eq!(change.sale_id.as_deref(), Some(sale.id.as_str()));
        }
        assert_eq!(sale_entry.changes[0].previous_quantity, 20);
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let mut svc = service();
        let err = svc
            .checkout(SaleDraft::new(vec![], "efectivo"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::EmptySale)));
    }

    #[tokio::test]
    async fn test_report_rows_and_final_stats() {
        let mut svc = service();
        svc.add_stock(AddStockRequest {
            product_name: "Marraqueta".to_string(),
            quantity: 20,
        })
        .await
        .unwrap();
        svc.checkout(SaleDraft::new(
            vec![SaleItem::new("Marraqueta", 5.0, 2)],
            "QR",
        ))
        .await
        .unwrap();

        let (rows, stats) = svc.report_rows(RowFilter::All).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, EntryKind::Sale);
        assert_eq!(rows[0].cumulative_cash, 10.0);
        assert_eq!(stats.total_cash, 10.0);
        assert_eq!(stats.total_stock_items, 18);
    }
}
