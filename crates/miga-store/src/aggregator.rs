//! # History Aggregator
//!
//! Multi-day analytics over stored history documents.
//!
//! ## Partial Aggregation Policy
//! A day whose fetch fails is logged and skipped; it contributes zero to
//! the window and the range result still comes back. The dashboard showing
//! six of seven days beats showing nothing.
//!
//! Today may be supplied from a live in-memory bucket so the dashboard
//! reflects the sale that just happened without waiting for a re-fetch.

use miga_core::day::DayKey;
use miga_core::{analyze_day, DayStats, LedgerEntry, RangeAccumulator, RangeStats};
use miga_core::DEFAULT_RANGE_DAYS;
use tracing::{debug, warn};

use crate::document::DocumentStore;
use crate::error::StoreResult;
use crate::repository::HistoryRepository;

/// Derives day and range statistics from stored ledger entries.
#[derive(Debug, Clone)]
pub struct HistoryAggregator<S: DocumentStore> {
    history: HistoryRepository<S>,
}

impl<S: DocumentStore> HistoryAggregator<S> {
    pub fn new(store: S) -> Self {
        HistoryAggregator {
            history: HistoryRepository::new(store),
        }
    }

    /// Analyzes one stored day. An unwritten day yields the all-zero stats,
    /// not an error; only transport failures surface.
    pub async fn analyze_day(&self, day: &DayKey) -> StoreResult<DayStats> {
        let entries = self.history.fetch_entries(day).await?;
        Ok(analyze_day(&entries))
    }

    /// Analyzes a window of days, optionally overriding one day with a
    /// live entry list (typically today's unsaved bucket).
    ///
    /// Failing days are skipped with a warning; percentages and rankings
    /// come from the grand totals of the days that did load.
    pub async fn analyze_range(
        &self,
        days: &[DayKey],
        live: Option<(&DayKey, &[LedgerEntry])>,
    ) -> RangeStats {
        let mut acc = RangeAccumulator::new();
        for day in days {
            if let Some((live_day, entries)) = live {
                if day == live_day {
                    acc.add_day(day.clone(), entries);
                    continue;
                }
            }
            match self.history.fetch_entries(day).await {
                Ok(entries) => acc.add_day(day.clone(), &entries),
                Err(err) => {
                    warn!(day = %day, error = %err, "skipping day in range analysis");
                }
            }
        }
        debug!(requested = days.len(), analyzed = acc.days(), "range analyzed");
        acc.finish()
    }

    /// The default dashboard window: the last 7 days ending today.
    pub async fn analyze_last_week(
        &self,
        live_today: Option<&[LedgerEntry]>,
    ) -> RangeStats {
        let days = DayKey::last_n_days(DEFAULT_RANGE_DAYS);
        let today = DayKey::today();
        self.analyze_range(&days, live_today.map(|entries| (&today, entries)))
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use crate::memory::MemoryStore;
    use chrono::{DateTime, Utc};
    use miga_core::{SaleDraft, SaleItem};

    fn now() -> DateTime<Utc> {
        "2026-08-23T12:00:00Z".parse().unwrap()
    }

    fn sale_entry(product: &str, price: f64, qty: i64, method: &str, day: &DayKey) -> LedgerEntry {
        let sale =
            SaleDraft::new(vec![SaleItem::new(product, price, qty)], method).finalize(now(), day.clone());
        LedgerEntry::sale(&sale, &[qty + 5], now())
    }

    async fn seed_day(store: &MemoryStore, day: &DayKey, entries: Vec<LedgerEntry>) {
        let repo = HistoryRepository::new(store.clone());
        for entry in entries {
            repo.append_entry(day, entry).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_unwritten_day_analyzes_to_defaults() {
        let aggregator = HistoryAggregator::new(MemoryStore::new());
        let day = DayKey::parse("2026-08-20").unwrap();
        let stats = aggregator.analyze_day(&day).await.unwrap();
        assert_eq!(stats, DayStats::default());
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("miga_store=debug")
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn test_failing_day_is_skipped_not_fatal() {
        init_tracing();
        let store = MemoryStore::new();
        let d1 = DayKey::parse("2026-08-20").unwrap();
        let d2 = DayKey::parse("2026-08-21").unwrap();
        let d3 = DayKey::parse("2026-08-22").unwrap();

        seed_day(&store, &d1, vec![sale_entry("A", 5.0, 2, "efectivo", &d1)]).await;
        seed_day(&store, &d2, vec![sale_entry("A", 5.0, 4, "efectivo", &d2)]).await;
        seed_day(&store, &d3, vec![sale_entry("A", 5.0, 1, "QR", &d3)]).await;
        store.inject_failure(document::HISTORY, d2.as_str()).await;

        let aggregator = HistoryAggregator::new(store);
        let range = aggregator
            .analyze_range(&[d1.clone(), d2.clone(), d3.clone()], None)
            .await;

        // Day 2 contributes zero; the window still covers days 1 and 3.
        assert_eq!(range.daily_stats.len(), 2);
        assert!(!range.daily_stats.contains_key(&d2));
        assert_eq!(range.stats.total_sales, 3);
        assert_eq!(range.stats.total_revenue, 15.0);
        assert_eq!(range.stats.sales_by_method["efectivo"], 1);
    }

    #[tokio::test]
    async fn test_live_override_replaces_fetch() {
        let store = MemoryStore::new();
        let day = DayKey::parse("2026-08-22").unwrap();
        // The stored version says 1 unit; the live bucket says 4.
        seed_day(&store, &day, vec![sale_entry("A", 5.0, 1, "efectivo", &day)]).await;
        let live = vec![sale_entry("A", 5.0, 4, "efectivo", &day)];

        let aggregator = HistoryAggregator::new(store);
        let range = aggregator
            .analyze_range(std::slice::from_ref(&day), Some((&day, &live)))
            .await;
        assert_eq!(range.stats.total_sales, 4);
    }
}
