//! # Sales Ledger
//!
//! Running totals over a day's completed sales.
//!
//! The day's sales live in the `pos/{day}` document as an append-only list;
//! this module is the pure arithmetic over that list. Recording and clearing
//! are store operations (miga-store), since they are network writes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::Sale;
use crate::BEST_SELLERS_LIMIT;

/// A ranked `(productName, quantity)` pair from the best-sellers query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRank {
    pub product_name: String,
    pub quantity: i64,
}

/// Read-side view over one day's sale list.
#[derive(Debug, Clone, Default)]
pub struct SalesLedger {
    sales: Vec<Sale>,
}

impl SalesLedger {
    pub fn new(sales: Vec<Sale>) -> Self {
        SalesLedger { sales }
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Sum of `sale.total` over the day.
    pub fn today_total(&self) -> f64 {
        self.sales.iter().map(|s| s.total).sum()
    }

    /// Number of completed sales.
    pub fn sales_count(&self) -> usize {
        self.sales.len()
    }

    /// Sum of item quantities across all sales.
    pub fn total_quantity_sold(&self) -> i64 {
        self.sales
            .iter()
            .flat_map(|s| &s.items)
            .map(|i| i.quantity)
            .sum()
    }

    /// Top `limit` products by units sold, descending. Ties resolve to the
    /// first-encountered product (stable sort over insertion order).
    pub fn best_sellers(&self, limit: usize) -> Vec<ProductRank> {
        let mut counts: IndexMap<String, i64> = IndexMap::new();
        for sale in &self.sales {
            for item in &sale.items {
                *counts.entry(item.product_name.clone()).or_insert(0) += item.quantity;
            }
        }

        let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(limit)
            .map(|(product_name, quantity)| ProductRank {
                product_name,
                quantity,
            })
            .collect()
    }

    /// Best sellers with the default limit of 5.
    pub fn best_sellers_default(&self) -> Vec<ProductRank> {
        self.best_sellers(BEST_SELLERS_LIMIT)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
