//! # Stock Repository
//!
//! Persistence for the day's [`StockProjection`]: the flat
//! `stock/{day}` document mapping product names to quantities.
//!
//! Mutations follow one pattern: load the projection (absent day reads as
//! empty), apply the pure primitive, save the whole document back, and
//! return the [`StockChange`] the caller pairs with a history append.

use miga_core::{StockChange, StockLevel, StockProjection};
use miga_core::day::DayKey;
use tracing::debug;

use crate::document::{self, DocumentStore, Lookup};
use crate::error::{LedgerResult, StoreResult};

/// Repository for `stock/{day}` documents.
#[derive(Debug, Clone)]
pub struct StockRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> StockRepository<S> {
    pub fn new(store: S) -> Self {
        StockRepository { store }
    }

    // -------------------------------------------------------------------------
    // Load / Save
    // -------------------------------------------------------------------------

    /// Loads the day's projection. A day that was never written reads as an
    /// empty projection, never as an error.
    pub async fn load(&self, day: &DayKey) -> StoreResult<StockProjection> {
        match self.store.get(document::STOCK, day.as_str()).await? {
            Lookup::Exists(body) => Ok(serde_json::from_value(body)?),
            Lookup::NotFound => Ok(StockProjection::new()),
        }
    }

    /// Writes the whole projection document back.
    pub async fn save(&self, day: &DayKey, projection: &StockProjection) -> StoreResult<()> {
        let body = serde_json::to_value(projection)?;
        self.store.put(document::STOCK, day.as_str(), body).await
    }

    // -------------------------------------------------------------------------
    // Mutations (read-modify-write)
    // -------------------------------------------------------------------------

    /// Overwrites a product's quantity for the day.
    pub async fn set_quantity(
        &self,
        day: &DayKey,
        product_name: &str,
        quantity: i64,
    ) -> LedgerResult<StockChange> {
        let mut projection = self.load(day).await?;
        let change = projection.set_quantity(product_name, quantity)?;
        self.save(day, &projection).await?;
        debug!(day = %day, product = product_name, quantity, "stock quantity set");
        Ok(change)
    }

    /// Registers a product entering today's stock for the first time.
    pub async fn add_new(
        &self,
        day: &DayKey,
        product_name: &str,
        quantity: i64,
    ) -> LedgerResult<StockChange> {
        let mut projection = self.load(day).await?;
        let change = projection.add_new(product_name, quantity)?;
        self.save(day, &projection).await?;
        debug!(day = %day, product = product_name, quantity, "new product stocked");
        Ok(change)
    }

    /// Adds units on top of existing stock.
    pub async fn add_existing(
        &self,
        day: &DayKey,
        product_name: &str,
        delta: i64,
    ) -> LedgerResult<StockChange> {
        let mut projection = self.load(day).await?;
        let change = projection.add_existing(product_name, delta)?;
        self.save(day, &projection).await?;
        debug!(day = %day, product = product_name, delta, "stock added");
        Ok(change)
    }

    /// Removes up to `delta` units, clamping at zero. Policy-level
    /// rejection of over-withdrawals happens in the service before this.
    pub async fn withdraw(
        &self,
        day: &DayKey,
        product_name: &str,
        delta: i64,
    ) -> LedgerResult<StockChange> {
        let mut projection = self.load(day).await?;
        let change = projection.withdraw(product_name, delta);
        self.save(day, &projection).await?;
        debug!(day = %day, product = product_name, delta, "stock withdrawn");
        Ok(change)
    }

    /// Deletes the product key entirely (administrative removal).
    pub async fn remove(&self, day: &DayKey, product_name: &str) -> LedgerResult<Option<i64>> {
        let mut projection = self.load(day).await?;
        let removed = projection.remove(product_name);
        if removed.is_some() {
            self.save(day, &projection).await?;
            debug!(day = %day, product = product_name, "product removed from stock");
        }
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current quantity for one product (absent reads as 0).
    pub async fn quantity(&self, day: &DayKey, product_name: &str) -> StoreResult<i64> {
        Ok(self.load(day).await?.quantity(product_name))
    }

    /// Products at or below the default low-stock threshold.
    pub async fn low_stock(&self, day: &DayKey) -> StoreResult<Vec<StockLevel>> {
        Ok(self.load(day).await?.low_stock_default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
