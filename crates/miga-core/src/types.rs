//! # Domain Types
//!
//! Core domain types for the Miga stock ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │   LedgerEntry   │   │      Sale       │   │    Product      │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  kind           │   │  id (derived)   │   │  id (UUID)      │        │
//! │  │  description    │   │  items          │   │  name (key)     │        │
//! │  │  date / method  │   │  total/method   │   │  priceType      │        │
//! │  │  changes[]      │   │  timestamp/day  │   │  prices[]       │        │
//! │  └───────┬─────────┘   └─────────────────┘   └─────────────────┘        │
//! │          │                                                              │
//! │  ┌───────┴─────────┐   One `sale` entry ↔ one Sale, joined by saleId    │
//! │  │   StockChange   │   on every change (loose 1:1, no FK enforcement).  │
//! │  │  signed qty +   │                                                    │
//! │  │  prev/new stock │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! All document types serialize with camelCase field names so the persisted
//! JSON matches the day-bucket shapes consumed by the UI and the exporter
//! (`productName`, `previousQuantity`, `withdrawalType`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::day::DayKey;

// =============================================================================
// Ledger Entry Kind
// =============================================================================

/// The four kinds of stock movement a day's ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Product entered today's stock with no prior quantity.
    New,
    /// Quantity added on top of existing stock.
    Addition,
    /// Administrative removal (damaged, returned, expired, lost).
    Withdrawal,
    /// Stock leaving through a completed sale.
    Sale,
}

// =============================================================================
// Withdrawal Kind
// =============================================================================

/// Reason category for a `withdrawal` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalKind {
    Damaged,
    Returned,
    Expired,
    Lost,
}

impl WithdrawalKind {
    /// Human label used in entry descriptions and exported reports.
    pub fn label(&self) -> &'static str {
        match self {
            WithdrawalKind::Damaged => "Producto dañado",
            WithdrawalKind::Returned => "Devolución",
            WithdrawalKind::Expired => "Producto vencido",
            WithdrawalKind::Lost => "Producto perdido",
        }
    }
}

// =============================================================================
// Stock Change
// =============================================================================

/// A single product line inside a ledger entry.
///
/// Invariant: `new_quantity == previous_quantity + quantity` holds at
/// construction time. The projection and the ledger are written as separate
/// documents and are not re-validated against each other afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub product_name: String,

    /// Signed delta: positive = added to stock, negative = removed.
    pub quantity: i64,

    pub previous_quantity: i64,

    pub new_quantity: i64,

    /// Unit price, present on sale changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Line total (price × |quantity|), present on sale changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,

    /// Present on withdrawal changes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_type: Option<WithdrawalKind>,

    /// Free-form note, withdrawal changes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Joins a sale change to its Sale record, sale changes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<String>,
}

impl StockChange {
    /// Creates a bare change; `new_quantity` is derived so the invariant
    /// holds by construction.
    pub fn new(product_name: impl Into<String>, quantity: i64, previous_quantity: i64) -> Self {
        StockChange {
            product_name: product_name.into(),
            quantity,
            previous_quantity,
            new_quantity: previous_quantity + quantity,
            price: None,
            total: None,
            withdrawal_type: None,
            reason: None,
            sale_id: None,
        }
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One append-only movement in a day's history document.
///
/// Entries are never mutated or deleted once written, except by the explicit
/// `clear` operation that truncates the whole day's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,

    pub description: String,

    /// Timestamp of the movement (entries within a day are ordered by it).
    pub date: DateTime<Utc>,

    /// Payment method, `sale` entries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    pub changes: Vec<StockChange>,
}

impl LedgerEntry {
    /// Entry for a product entering today's stock for the first time.
    pub fn new_product(product_name: &str, quantity: i64, date: DateTime<Utc>) -> Self {
        LedgerEntry {
            kind: EntryKind::New,
            description: format!("Producto nuevo: {product_name}"),
            date,
            method: None,
            changes: vec![StockChange::new(product_name, quantity, 0)],
        }
    }

    /// Entry for quantity added on top of existing stock.
    pub fn addition(
        product_name: &str,
        quantity: i64,
        previous_quantity: i64,
        date: DateTime<Utc>,
    ) -> Self {
        LedgerEntry {
            kind: EntryKind::Addition,
            description: format!("Stock añadido: {product_name}"),
            date,
            method: None,
            changes: vec![StockChange::new(product_name, quantity, previous_quantity)],
        }
    }

    /// Entry for an administrative withdrawal. `quantity` is the positive
    /// number of units removed; the change records it as a negative delta.
    pub fn withdrawal(
        product_name: &str,
        quantity: i64,
        previous_quantity: i64,
        kind: WithdrawalKind,
        reason: Option<String>,
        date: DateTime<Utc>,
    ) -> Self {
        let mut change = StockChange::new(product_name, -quantity, previous_quantity);
        change.withdrawal_type = Some(kind);
        change.reason = Some(reason.filter(|r| !r.trim().is_empty()).unwrap_or_else(|| {
            "Sin observaciones".to_string()
        }));

        LedgerEntry {
            kind: EntryKind::Withdrawal,
            description: format!("{}: {product_name}", kind.label()),
            date,
            method: None,
            changes: vec![change],
        }
    }

    /// Entry mirroring a completed sale: one change per cart line, each
    /// carrying the sale's id and a negative quantity.
    ///
    /// `previous_quantities` are the per-line stock levels read before the
    /// sale's withdrawals were issued.
    pub fn sale(sale: &Sale, previous_quantities: &[i64], date: DateTime<Utc>) -> Self {
        debug_assert_eq!(sale.items.len(), previous_quantities.len());

        let changes = sale
            .items
            .iter()
            .zip(previous_quantities)
            .map(|(item, &previous)| {
                let mut change = StockChange::new(&item.product_name, -item.quantity, previous);
                change.price = Some(item.price);
                change.total = Some(item.total);
                change.sale_id = Some(sale.id.clone());
                change
            })
            .collect();

        LedgerEntry {
            kind: EntryKind::Sale,
            description: format!("Venta realizada - {} productos", sale.items_count),
            date,
            method: Some(sale.payment_method.clone()),
            changes,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item of a completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_name: String,
    pub price: f64,
    pub quantity: i64,
    /// price × quantity, frozen at sale time.
    pub total: f64,
}

impl SaleItem {
    pub fn new(product_name: impl Into<String>, price: f64, quantity: i64) -> Self {
        SaleItem {
            product_name: product_name.into(),
            price,
            quantity,
            total: price * quantity as f64,
        }
    }
}

/// A completed POS transaction, stored in the day's `pos` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Time+random derived id: `sale_<unix millis>_<9 random chars>`.
    pub id: String,
    pub items: Vec<SaleItem>,
    pub total: f64,
    pub payment_method: String,
    /// Total units across all items.
    pub items_count: i64,
    pub timestamp: DateTime<Utc>,
    /// The day bucket this sale belongs to.
    pub date: DayKey,
}

/// An unsaved sale as assembled by the checkout flow: items plus payment
/// method. Id, timestamp and day are assigned on finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub items: Vec<SaleItem>,
    pub payment_method: String,
}

impl SaleDraft {
    pub fn new(items: Vec<SaleItem>, payment_method: impl Into<String>) -> Self {
        SaleDraft {
            items,
            payment_method: payment_method.into(),
        }
    }

    /// Sum of line totals.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.total).sum()
    }

    /// Total units across all items.
    pub fn items_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Assigns id, timestamp and day bucket, producing the persisted Sale.
    pub fn finalize(self, now: DateTime<Utc>, day: DayKey) -> Sale {
        let total = self.total();
        let items_count = self.items_count();
        Sale {
            id: generate_sale_id(now),
            items: self.items,
            total,
            payment_method: self.payment_method,
            items_count,
            timestamp: now,
            date: day,
        }
    }
}

/// Generates a sale id of the form `sale_<unix millis>_<9 random chars>`.
///
/// The millisecond prefix keeps ids roughly sortable by time; the random
/// suffix makes collisions within a millisecond irrelevant in practice.
pub fn generate_sale_id(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("sale_{}_{}", now.timestamp_millis(), suffix)
}

// =============================================================================
// Product Catalog Types
// =============================================================================

/// Pricing scheme for a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// One unit price.
    Simple,
    /// Unit price plus quantity-bundle tiers ("3 marraquetas por 5Bs").
    Multiple,
}

/// A quantity-bundle price for `PriceType::Multiple` products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub quantity: i64,
    pub price: f64,
}

/// A catalog product. Owned by the product catalog outside the ledger core;
/// the ledger only reads names and prices from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price_type: PriceType,
    pub unit_price: f64,
    #[serde(default)]
    pub prices: Vec<PriceTier>,
}

impl Product {
    /// Price for a given quantity: an exact bundle-tier match wins for
    /// `Multiple` products, otherwise unit price × quantity.
    pub fn price_for(&self, quantity: i64) -> f64 {
        if self.price_type == PriceType::Multiple {
            if let Some(tier) = self.prices.iter().find(|t| t.quantity == quantity) {
                return tier.price;
            }
        }
        self.unit_price * quantity as f64
    }
}

// =============================================================================
// Day-Bucket Documents
// =============================================================================

/// The `history/{day}` document: the day's append-only entry list plus the
/// clear-marker metadata an administrative reset leaves behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDocument {
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cleared: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The `pos/{day}` document: the day's sales list plus running metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosDocument {
    #[serde(default)]
    pub sales: Vec<Sale>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sale: Option<DateTime<Utc>>,

    /// Running count of sales recorded today.
    #[serde(default)]
    pub total_sales: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DayKey>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cleared: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-08-23T14:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_change_invariant_holds_by_construction() {
        let change = StockChange::new("Marraqueta", -3, 10);
        assert_eq!(change.new_quantity, change.previous_quantity + change.quantity);
        assert_eq!(change.new_quantity, 7);
    }

    #[test]
    fn test_new_product_entry() {
        let entry = LedgerEntry::new_product("Hallulla", 20, now());
        assert_eq!(entry.kind, EntryKind::New);
        assert_eq!(entry.changes.len(), 1);
        assert_eq!(entry.changes[0].previous_quantity, 0);
        assert_eq!(entry.changes[0].new_quantity, 20);
        assert!(entry.method.is_none());
    }

    #[test]
    fn test_withdrawal_entry_defaults_reason() {
        let entry =
            LedgerEntry::withdrawal("Hallulla", 2, 8, WithdrawalKind::Damaged, None, now());
        let change = &entry.changes[0];
        assert_eq!(change.quantity, -2);
        assert_eq!(change.new_quantity, 6);
        assert_eq!(change.withdrawal_type, Some(WithdrawalKind::Damaged));
        assert_eq!(change.reason.as_deref(), Some("Sin observaciones"));
        assert_eq!(entry.description, "Producto dañado: Hallulla");
    }

    #[test]
    fn test_sale_entry_carries_sale_id_on_every_change() {
        let draft = SaleDraft::new(
            vec![
                SaleItem::new("Marraqueta", 5.0, 2),
                SaleItem::new("Hallulla", 20.0, 1),
            ],
            "efectivo",
        );
        let sale = draft.finalize(now(), DayKey::parse("2026-08-23").unwrap());
        let entry = LedgerEntry::sale(&sale, &[10, 4], now());

        assert_eq!(entry.kind, EntryKind::Sale);
        assert_eq!(entry.method.as_deref(), Some("efectivo"));
        assert_eq!(entry.changes.len(), 2);
        for change in &entry.changes {
            assert_eq!(change.sale_id.as_deref(), Some(sale.id.as_str()));
            assert!(change.quantity < 0);
        }
        assert_eq!(entry.changes[0].total, Some(10.0));
        assert_eq!(entry.changes[1].total, Some(20.0));
    }

    #[test]
    fn test_sale_draft_totals() {
        let draft = SaleDraft::new(
            vec![
                SaleItem::new("Marraqueta", 5.0, 2),
                SaleItem::new("Hallulla", 20.0, 1),
            ],
            "QR",
        );
        assert_eq!(draft.total(), 30.0);
        assert_eq!(draft.items_count(), 3);
    }

    #[test]
    fn test_sale_id_shape() {
        let id = generate_sale_id(now());
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts[0], "sale");
        assert_eq!(parts[1], now().timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_entry_wire_format_is_camel_case() {
        let entry = LedgerEntry::new_product("Hallulla", 5, now());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "new");
        let change = &json["changes"][0];
        assert_eq!(change["productName"], "Hallulla");
        assert_eq!(change["previousQuantity"], 0);
        assert_eq!(change["newQuantity"], 5);
        // Absent optionals are omitted, not null.
        assert!(change.get("withdrawalType").is_none());
        assert!(change.get("saleId").is_none());
    }

    #[test]
    fn test_tiered_price_lookup() {
        let product = Product {
            id: "p1".to_string(),
            name: "Marraqueta".to_string(),
            category: "Panes".to_string(),
            price_type: PriceType::Multiple,
            unit_price: 2.0,
            prices: vec![PriceTier {
                quantity: 3,
                price: 5.0,
            }],
        };
        assert_eq!(product.price_for(3), 5.0);
        assert_eq!(product.price_for(2), 4.0);
    }

    #[test]
    fn test_documents_deserialize_with_missing_fields() {
        let doc: HistoryDocument = serde_json::from_str(r#"{"entries":[]}"#).unwrap();
        assert!(!doc.cleared);
        assert!(doc.entries.is_empty());

        let pos: PosDocument = serde_json::from_str(r#"{"sales":[],"totalSales":0}"#).unwrap();
        assert_eq!(pos.total_sales, 0);
        assert!(pos.created_at.is_none());
    }
}
