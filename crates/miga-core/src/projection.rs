//! # Stock Projection
//!
//! The per-day `productName → quantity` mapping and its mutation primitives.
//!
//! ## Day-Scoped Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Stock Projection Lifecycle                             │
//! │                                                                         │
//! │  First write of the day ──► projection created empty                    │
//! │  add_new / add_existing ──► quantity raised, change recorded            │
//! │  withdraw               ──► quantity lowered, clamped at 0              │
//! │  midnight rollover      ──► NEW empty projection (no carry-forward)     │
//! │                                                                         │
//! │  Every mutation returns the StockChange the caller must pair with       │
//! │  exactly one ledger entry append. The two writes are separate           │
//! │  network round-trips, not a transaction.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Absent == 0
//! A product missing from the mapping reads as quantity 0. `withdraw`
//! removes the key when it reaches 0 (matching the persisted document's
//! delete-field behavior) while an explicit `set_quantity(_, 0)` keeps a 0
//! entry so `out_of_stock` can report it. Both are valid for all readers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::StockChange;
use crate::LOW_STOCK_THRESHOLD;

/// A `(productName, quantity)` pair as reported by the stock queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_name: String,
    pub quantity: i64,
}

/// The day's stock quantities, keyed by product name.
///
/// Serializes as the flat `stock/{day}` document: a JSON object mapping
/// product names to non-negative integers. Insertion order is preserved so
/// listings and tie-breaks are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockProjection {
    quantities: IndexMap<String, i64>,
}

impl StockProjection {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------
    // Each mutation returns the StockChange describing what happened, so the
    // caller can append the matching ledger entry.

    /// Overwrites a product's quantity. Rejects negative values; zero is
    /// allowed and keeps an explicit 0 entry.
    pub fn set_quantity(
        &mut self,
        product_name: &str,
        quantity: i64,
    ) -> Result<StockChange, ValidationError> {
        if quantity < 0 {
            return Err(ValidationError::MustBeNonNegative {
                field: "quantity".to_string(),
            });
        }
        let previous = self.quantity(product_name);
        self.quantities.insert(product_name.to_string(), quantity);
        Ok(StockChange::new(product_name, quantity - previous, previous))
    }

    /// Registers a product that had no stock today: quantity becomes `qty`,
    /// previous quantity is 0.
    pub fn add_new(
        &mut self,
        product_name: &str,
        quantity: i64,
    ) -> Result<StockChange, ValidationError> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        self.quantities.insert(product_name.to_string(), quantity);
        Ok(StockChange::new(product_name, quantity, 0))
    }

    /// Adds `delta` units on top of the current quantity.
    pub fn add_existing(
        &mut self,
        product_name: &str,
        delta: i64,
    ) -> Result<StockChange, ValidationError> {
        if delta <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        let previous = self.quantity(product_name);
        self.quantities
            .insert(product_name.to_string(), previous + delta);
        Ok(StockChange::new(product_name, delta, previous))
    }

    /// Removes up to `delta` units, clamping at 0.
    ///
    /// The primitive clamps rather than errors; rejecting an over-withdrawal
    /// is caller-level policy (the sale path validates against current stock
    /// before calling this). When the quantity reaches 0 the key is removed.
    pub fn withdraw(&mut self, product_name: &str, delta: i64) -> StockChange {
        let previous = self.quantity(product_name);
        let removed = delta.min(previous).max(0);
        let new_quantity = previous - removed;

        if new_quantity == 0 {
            self.quantities.shift_remove(product_name);
        } else {
            self.quantities
                .insert(product_name.to_string(), new_quantity);
        }

        StockChange::new(product_name, -removed, previous)
    }

    /// Deletes the product key entirely. This is administrative removal,
    /// distinct from withdrawing to 0: no ledger entry convention applies
    /// and reports do not count it as a withdrawal.
    pub fn remove(&mut self, product_name: &str) -> Option<i64> {
        self.quantities.shift_remove(product_name)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current quantity; a product absent from the mapping reads as 0.
    pub fn quantity(&self, product_name: &str) -> i64 {
        self.quantities.get(product_name).copied().unwrap_or(0)
    }

    /// Number of distinct products with an entry.
    pub fn total_products(&self) -> usize {
        self.quantities.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.quantities.values().sum()
    }

    /// Products with `0 < quantity <= threshold`.
    pub fn low_stock(&self, threshold: i64) -> Vec<StockLevel> {
        self.quantities
            .iter()
            .filter(|(_, &qty)| qty > 0 && qty <= threshold)
            .map(|(name, &qty)| StockLevel {
                product_name: name.clone(),
                quantity: qty,
            })
            .collect()
    }

    /// Products with the default low-stock threshold of 5.
    pub fn low_stock_default(&self) -> Vec<StockLevel> {
        self.low_stock(LOW_STOCK_THRESHOLD)
    }

    /// Products with an explicit 0 entry (withdrawals remove the key, so
    /// these come from explicit `set_quantity(_, 0)` writes).
    pub fn out_of_stock(&self) -> Vec<StockLevel> {
        self.quantities
            .iter()
            .filter(|(_, &qty)| qty == 0)
            .map(|(name, &qty)| StockLevel {
                product_name: name.clone(),
                quantity: qty,
            })
            .collect()
    }

    /// Snapshot of all `(productName, quantity)` pairs in insertion order.
    pub fn entries(&self) -> Vec<StockLevel> {
        self.quantities
            .iter()
            .map(|(name, &qty)| StockLevel {
                product_name: name.clone(),
                quantity: qty,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_reads_as_zero() {
        let projection = StockProjection::new();
        assert_eq!(projection.quantity("Marraqueta"), 0);
        assert_eq!(projection.total_products(), 0);
        assert_eq!(projection.total_quantity(), 0);
    }

    #[test]
    fn test_add_new_sets_from_zero() {
        let mut projection = StockProjection::new();
        let change = projection.add_new("Marraqueta", 20).unwrap();
        assert_eq!(change.previous_quantity, 0);
        assert_eq!(change.new_quantity, 20);
        assert_eq!(projection.quantity("Marraqueta"), 20);
    }

    #[test]
    fn test_add_existing_accumulates() {
        let mut projection = StockProjection::new();
        projection.add_new("Marraqueta", 20).unwrap();
        let change = projection.add_existing("Marraqueta", 5).unwrap();
        assert_eq!(change.previous_quantity, 20);
        assert_eq!(change.new_quantity, 25);
    }

    #[test]
    fn test_withdraw_clamps_at_zero() {
        let mut projection = StockProjection::new();
        projection.add_new("Pan", 4).unwrap();

        let change = projection.withdraw("Pan", 10);
        assert_eq!(change.quantity, -4);
        assert_eq!(change.new_quantity, 0);
        assert_eq!(projection.quantity("Pan"), 0);
    }

    #[test]
    fn test_withdraw_to_zero_removes_key() {
        let mut projection = StockProjection::new();
        projection.add_new("Pan", 4).unwrap();
        projection.withdraw("Pan", 4);

        // Key is gone, yet all readers still see quantity 0.
        assert_eq!(projection.total_products(), 0);
        assert_eq!(projection.quantity("Pan"), 0);
        assert!(projection.out_of_stock().is_empty());
    }

    #[test]
    fn test_explicit_zero_stays_visible() {
        let mut projection = StockProjection::new();
        projection.set_quantity("Pan", 0).unwrap();
        assert_eq!(projection.total_products(), 1);
        assert_eq!(projection.out_of_stock().len(), 1);
    }

    #[test]
    fn test_set_quantity_rejects_negative() {
        let mut projection = StockProjection::new();
        assert!(projection.set_quantity("Pan", -1).is_err());
    }

    #[test]
    fn test_remove_is_distinct_from_withdraw() {
        let mut projection = StockProjection::new();
        projection.add_new("Pan", 7).unwrap();
        assert_eq!(projection.remove("Pan"), Some(7));
        assert_eq!(projection.remove("Pan"), None);
    }

    #[test]
    fn test_low_stock_window() {
        let mut projection = StockProjection::new();
        projection.add_new("A", 3).unwrap();
        projection.add_new("B", 5).unwrap();
        projection.add_new("C", 6).unwrap();
        projection.set_quantity("D", 0).unwrap();

        let low: Vec<String> = projection
            .low_stock_default()
            .into_iter()
            .map(|l| l.product_name)
            .collect();
        assert_eq!(low, vec!["A", "B"]);
    }

    #[test]
    fn test_replay_equals_sum_of_signed_deltas_clamped() {
        // Property from the ledger contract: replaying any op sequence on one
        // product yields the clamped running sum of its signed deltas.
        let ops: &[(&str, i64)] = &[
            ("add_new", 10),
            ("withdraw", 3),
            ("add_existing", 2),
            ("withdraw", 15), // overflow, clamps at 0
            ("add_existing", 4),
        ];

        let mut projection = StockProjection::new();
        let mut expected: i64 = 0;
        for (op, qty) in ops {
            match *op {
                "add_new" => {
                    projection.add_new("Pan", *qty).unwrap();
                    expected += qty;
                }
                "add_existing" => {
                    projection.add_existing("Pan", *qty).unwrap();
                    expected += qty;
                }
                "withdraw" => {
                    projection.withdraw("Pan", *qty);
                    expected = (expected - qty).max(0);
                }
                _ => unreachable!(),
            }
            assert_eq!(projection.quantity("Pan"), expected);
        }
    }

    #[test]
    fn test_serializes_as_flat_document() {
        let mut projection = StockProjection::new();
        projection.add_new("Marraqueta", 20).unwrap();
        projection.add_new("Hallulla", 8).unwrap();

        let json = serde_json::to_value(&projection).unwrap();
        assert_eq!(json, serde_json::json!({ "Marraqueta": 20, "Hallulla": 8 }));
    }
}
