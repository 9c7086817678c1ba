//! # History Analytics
//!
//! Derives day and multi-day statistics from ledger entries.
//!
//! ## Derivation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Analytics Derivation                                │
//! │                                                                         │
//! │  entries ──► partition (sale / new)                                     │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Totals accumulator                                                     │
//! │    revenue, units, per-product units/revenue/withdrawals,               │
//! │    payment-method tally, sale count, new-product count                  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  finish(): percentages, rankings, per-product stats, averages           │
//! │                                                                         │
//! │  Multi-day: fold each day's DayStats into the SAME accumulator and      │
//! │  derive once on the grand totals. Ratios are never averaged per day.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Withdrawals Accumulator
//! `product_withdrawals` counts units removed through SALES, not through
//! `withdrawal` entries. The dashboard has always treated "sold" and
//! "withdrawn from inventory" as synonyms for the most-withdrawn metric;
//! the naming is kept as-is rather than silently corrected.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::day::DayKey;
use crate::types::{EntryKind, LedgerEntry};

// =============================================================================
// Result Shapes
// =============================================================================

/// Per-product breakdown within a stats result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub quantity_sold: i64,
    pub revenue: f64,
    /// revenue / quantity_sold for the window.
    pub average_price: f64,
    /// Units removed via sales (see module docs on the conflation).
    pub withdrawals: i64,
}

/// Fixed-shape statistics for one day (or, embedded in [`RangeStats`], for a
/// whole window). Every numeric field defaults to 0 and every ranking field
/// to `None` when there are no sales.
///
/// Ranking fields serialize as `[name, quantity]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    /// Total UNITS sold (historical name; the number of sale transactions
    /// is `sales_count`).
    pub total_sales: i64,
    pub total_revenue: f64,
    pub products_sold: IndexMap<String, i64>,
    pub sales_by_method: IndexMap<String, i64>,
    /// Percentage per payment method, formatted to one decimal ("66.7").
    pub payment_percentages: IndexMap<String, String>,
    /// Count of `new`-type entries in the window.
    pub new_products: i64,
    pub top_selling_product: Option<(String, i64)>,
    /// `None` unless at least two distinct products sold, so a lone product
    /// is never reported as both top and least seller.
    pub least_selling_product: Option<(String, i64)>,
    pub most_withdrawn_product: Option<(String, i64)>,
    /// Number of sale transactions.
    pub sales_count: i64,
    pub average_sale_value: f64,
    pub product_stats: IndexMap<String, ProductStats>,
    pub revenue_by_product: IndexMap<String, f64>,
    pub product_withdrawals: IndexMap<String, i64>,
}

/// Statistics for a multi-day window: the grand-total stats plus each
/// contributing day's own analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeStats {
    #[serde(flatten)]
    pub stats: DayStats,
    pub daily_stats: IndexMap<DayKey, DayStats>,
}

// =============================================================================
// Totals Accumulator
// =============================================================================

/// Raw accumulators shared by the single-day and multi-day paths. Deriving
/// the presentation fields happens exactly once, in [`Totals::finish`].
#[derive(Debug, Default)]
struct Totals {
    total_revenue: f64,
    total_units: i64,
    products_sold: IndexMap<String, i64>,
    revenue_by_product: IndexMap<String, f64>,
    product_withdrawals: IndexMap<String, i64>,
    sales_by_method: IndexMap<String, i64>,
    payment_transactions: i64,
    new_products: i64,
    sales_count: i64,
}

impl Totals {
    fn absorb_entry(&mut self, entry: &LedgerEntry) {
        match entry.kind {
            EntryKind::New => self.new_products += 1,
            EntryKind::Sale => {
                self.sales_count += 1;
                self.payment_transactions += 1;
                let method = entry
                    .method
                    .clone()
                    .unwrap_or_else(|| "desconocido".to_string());
                *self.sales_by_method.entry(method).or_insert(0) += 1;

                for change in &entry.changes {
                    let units = change.quantity.abs();
                    let total = change.total.unwrap_or(0.0);

                    self.total_revenue += total;
                    self.total_units += units;
                    *self
                        .products_sold
                        .entry(change.product_name.clone())
                        .or_insert(0) += units;
                    *self
                        .revenue_by_product
                        .entry(change.product_name.clone())
                        .or_insert(0.0) += total;
                    // Sale-driven removal counts as a withdrawal here.
                    *self
                        .product_withdrawals
                        .entry(change.product_name.clone())
                        .or_insert(0) += units;
                }
            }
            EntryKind::Addition | EntryKind::Withdrawal => {}
        }
    }

    /// Folds one already-analyzed day into the window totals.
    fn absorb_day(&mut self, day: &DayStats) {
        self.total_units += day.total_sales;
        self.total_revenue += day.total_revenue;
        self.new_products += day.new_products;
        self.sales_count += day.sales_count;

        for (product, &units) in &day.products_sold {
            *self.products_sold.entry(product.clone()).or_insert(0) += units;
            *self
                .product_withdrawals
                .entry(product.clone())
                .or_insert(0) += units;
        }
        for (product, &revenue) in &day.revenue_by_product {
            *self
                .revenue_by_product
                .entry(product.clone())
                .or_insert(0.0) += revenue;
        }
        for (method, &count) in &day.sales_by_method {
            *self.sales_by_method.entry(method.clone()).or_insert(0) += count;
            self.payment_transactions += count;
        }
    }

    /// Derives the presentation fields from the accumulated totals.
    fn finish(self) -> DayStats {
        // Percentage per method over all payment transactions in the window.
        let payment_percentages: IndexMap<String, String> = self
            .sales_by_method
            .iter()
            .map(|(method, &count)| {
                let pct = if self.payment_transactions > 0 {
                    count as f64 / self.payment_transactions as f64 * 100.0
                } else {
                    0.0
                };
                (method.clone(), format!("{pct:.1}"))
            })
            .collect();

        // Stable sort keeps insertion order on equal quantities, so ties
        // resolve to the first-encountered product.
        let mut ranked: Vec<(String, i64)> = self
            .products_sold
            .iter()
            .map(|(name, &qty)| (name.clone(), qty))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let top_selling_product = ranked.first().cloned();
        let least_selling_product = if ranked.len() > 1 {
            ranked.last().cloned()
        } else {
            None
        };

        // Arg-max with strict comparison: first-inserted wins under ties.
        let most_withdrawn_product = self
            .product_withdrawals
            .iter()
            .fold(None::<(String, i64)>, |best, (name, &qty)| match best {
                Some((_, best_qty)) if best_qty >= qty => best,
                _ => Some((name.clone(), qty)),
            });

        let product_stats: IndexMap<String, ProductStats> = self
            .products_sold
            .iter()
            .map(|(name, &quantity_sold)| {
                let revenue = self.revenue_by_product.get(name).copied().unwrap_or(0.0);
                let withdrawals = self.product_withdrawals.get(name).copied().unwrap_or(0);
                (
                    name.clone(),
                    ProductStats {
                        quantity_sold,
                        revenue,
                        average_price: if quantity_sold > 0 {
                            revenue / quantity_sold as f64
                        } else {
                            0.0
                        },
                        withdrawals,
                    },
                )
            })
            .collect();

        let average_sale_value = if self.sales_count > 0 {
            self.total_revenue / self.sales_count as f64
        } else {
            0.0
        };

        DayStats {
            total_sales: self.total_units,
            total_revenue: self.total_revenue,
            products_sold: self.products_sold,
            sales_by_method: self.sales_by_method,
            payment_percentages,
            new_products: self.new_products,
            top_selling_product,
            least_selling_product,
            most_withdrawn_product,
            sales_count: self.sales_count,
            average_sale_value,
            product_stats,
            revenue_by_product: self.revenue_by_product,
            product_withdrawals: self.product_withdrawals,
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Analyzes one day's ledger entries into the fixed-shape stats object.
///
/// An empty (or sale-free) entry list yields the all-zero/None default.
pub fn analyze_day(entries: &[LedgerEntry]) -> DayStats {
    let mut totals = Totals::default();
    for entry in entries {
        totals.absorb_entry(entry);
    }
    totals.finish()
}

/// Folds per-day analyses into window totals.
///
/// Days are added with [`RangeAccumulator::add_day`]; days whose fetch
/// failed are simply never added (their contribution is zero). Percentages,
/// rankings and per-product stats are computed once, on the grand totals,
/// at [`RangeAccumulator::finish`].
#[derive(Debug, Default)]
pub struct RangeAccumulator {
    totals: Totals,
    daily: IndexMap<DayKey, DayStats>,
}

impl RangeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzes `entries` for `day` and folds the result into the window.
    pub fn add_day(&mut self, day: DayKey, entries: &[LedgerEntry]) {
        let stats = analyze_day(entries);
        self.totals.absorb_day(&stats);
        self.daily.insert(day, stats);
    }

    /// Number of days folded so far.
    pub fn days(&self) -> usize {
        self.daily.len()
    }

    pub fn finish(self) -> RangeStats {
        RangeStats {
            stats: self.totals.finish(),
            daily_stats: self.daily,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LedgerEntry, Sale, SaleDraft, SaleItem, WithdrawalKind};
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        "2026-08-23T12:00:00Z".parse().unwrap()
    }

    fn day() -> DayKey {
        DayKey::parse("2026-08-23").unwrap()
    }

    fn sale_entry(items: Vec<SaleItem>, method: &str) -> LedgerEntry {
        let previous: Vec<i64> = items.iter().map(|i| i.quantity + 10).collect();
        let sale: Sale = SaleDraft::new(items, method).finalize(now(), day());
        LedgerEntry::sale(&sale, &previous, now())
    }

    #[test]
    fn test_empty_entries_yield_default_shape() {
        let stats = analyze_day(&[]);
        assert_eq!(stats, DayStats::default());
        assert_eq!(stats.total_sales, 0);
        assert_eq!(stats.total_revenue, 0.0);
        assert!(stats.top_selling_product.is_none());
        assert!(stats.least_selling_product.is_none());
        assert!(stats.most_withdrawn_product.is_none());
        assert!(stats.payment_percentages.is_empty());
    }

    #[test]
    fn test_single_sale_two_products() {
        // One sale: ProductA qty 2 at 5 (total 10), ProductB qty 1 at 20
        // (total 20), paid efectivo.
        let entry = sale_entry(
            vec![
                SaleItem::new("ProductA", 5.0, 2),
                SaleItem::new("ProductB", 20.0, 1),
            ],
            "efectivo",
        );
        let stats = analyze_day(&[entry]);

        assert_eq!(stats.total_revenue, 30.0);
        assert_eq!(stats.total_sales, 3);
        assert_eq!(stats.sales_count, 1);
        assert_eq!(
            stats.top_selling_product,
            Some(("ProductA".to_string(), 2))
        );
        assert_eq!(
            stats.least_selling_product,
            Some(("ProductB".to_string(), 1))
        );
        assert_eq!(stats.payment_percentages["efectivo"], "100.0");
        assert_eq!(stats.average_sale_value, 30.0);
        assert_eq!(stats.product_stats["ProductA"].average_price, 5.0);
        assert_eq!(stats.product_stats["ProductB"].revenue, 20.0);
    }

    #[test]
    fn test_least_seller_null_with_single_product() {
        let entry = sale_entry(vec![SaleItem::new("ProductA", 5.0, 4)], "efectivo");
        let stats = analyze_day(&[entry]);
        assert!(stats.top_selling_product.is_some());
        assert!(stats.least_selling_product.is_none());
    }

    #[test]
    fn test_payment_percentages_sum_to_hundred() {
        let entries = vec![
            sale_entry(vec![SaleItem::new("A", 1.0, 1)], "efectivo"),
            sale_entry(vec![SaleItem::new("A", 1.0, 1)], "efectivo"),
            sale_entry(vec![SaleItem::new("A", 1.0, 1)], "QR"),
        ];
        let stats = analyze_day(&entries);
        assert_eq!(stats.payment_percentages["efectivo"], "66.7");
        assert_eq!(stats.payment_percentages["QR"], "33.3");

        let sum: f64 = stats
            .payment_percentages
            .values()
            .map(|p| p.parse::<f64>().unwrap())
            .sum();
        assert!((sum - 100.0).abs() <= 0.2);
    }

    #[test]
    fn test_most_withdrawn_tie_first_inserted_wins() {
        let entry = sale_entry(
            vec![
                SaleItem::new("Hallulla", 2.0, 3),
                SaleItem::new("Marraqueta", 1.0, 3),
            ],
            "efectivo",
        );
        let stats = analyze_day(&[entry]);
        assert_eq!(
            stats.most_withdrawn_product,
            Some(("Hallulla".to_string(), 3))
        );
    }

    #[test]
    fn test_non_sale_entries_only_count_new_products() {
        let entries = vec![
            LedgerEntry::new_product("Marraqueta", 20, now()),
            LedgerEntry::addition("Marraqueta", 5, 20, now()),
            LedgerEntry::withdrawal("Marraqueta", 2, 25, WithdrawalKind::Expired, None, now()),
        ];
        let stats = analyze_day(&entries);
        assert_eq!(stats.new_products, 1);
        assert_eq!(stats.total_revenue, 0.0);
        assert_eq!(stats.sales_count, 0);
        // True withdrawals do NOT feed the (sale-conflated) accumulator.
        assert!(stats.product_withdrawals.is_empty());
    }

    #[test]
    fn test_range_percentages_derive_from_grand_totals() {
        // Day 1: 1 efectivo sale. Day 2: 2 QR sales. Percentages must come
        // from 1/3 and 2/3 of the window, not per-day averages.
        let mut acc = RangeAccumulator::new();
        acc.add_day(
            DayKey::parse("2026-08-21").unwrap(),
            &[sale_entry(vec![SaleItem::new("A", 2.0, 1)], "efectivo")],
        );
        acc.add_day(
            DayKey::parse("2026-08-22").unwrap(),
            &[
                sale_entry(vec![SaleItem::new("A", 2.0, 2)], "QR"),
                sale_entry(vec![SaleItem::new("B", 3.0, 1)], "QR"),
            ],
        );
        let range = acc.finish();

        assert_eq!(range.stats.sales_count, 3);
        assert_eq!(range.stats.payment_percentages["efectivo"], "33.3");
        assert_eq!(range.stats.payment_percentages["QR"], "66.7");
        assert_eq!(range.stats.products_sold["A"], 3);
        assert_eq!(range.daily_stats.len(), 2);
        assert_eq!(
            range.daily_stats[&DayKey::parse("2026-08-21").unwrap()].sales_count,
            1
        );
    }

    #[test]
    fn test_range_average_sale_value_over_grand_totals() {
        let mut acc = RangeAccumulator::new();
        acc.add_day(
            DayKey::parse("2026-08-21").unwrap(),
            &[sale_entry(vec![SaleItem::new("A", 10.0, 1)], "efectivo")],
        );
        acc.add_day(
            DayKey::parse("2026-08-22").unwrap(),
            &[sale_entry(vec![SaleItem::new("A", 20.0, 1)], "efectivo")],
        );
        let range = acc.finish();
        assert_eq!(range.stats.total_revenue, 30.0);
        assert_eq!(range.stats.average_sale_value, 15.0);
    }

    #[test]
    fn test_stats_serialize_with_wire_names() {
        let entry = sale_entry(vec![SaleItem::new("A", 5.0, 2)], "efectivo");
        let json = serde_json::to_value(analyze_day(&[entry])).unwrap();
        assert_eq!(json["totalRevenue"], 10.0);
        assert_eq!(json["salesCount"], 1);
        assert_eq!(json["topSellingProduct"][0], "A");
        assert_eq!(json["topSellingProduct"][1], 2);
        assert!(json["leastSellingProduct"].is_null());
        assert_eq!(json["paymentPercentages"]["efectivo"], "100.0");
    }
}
