//! # Report Rows
//!
//! Flattens a day's ledger entries into the normalized rows the history
//! report renders and the spreadsheet exporter consumes.
//!
//! One entry holds one or more changes; the report shows one ROW per change.
//! Rows are built in chronological order so the cumulative cash column can
//! run forward, then reversed so the most recent movement is listed first.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{EntryKind, LedgerEntry, WithdrawalKind};

// =============================================================================
// Row Shape
// =============================================================================

/// One normalized report row (one change of one entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub date: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub description: String,
    pub product_name: String,
    /// Signed delta as recorded on the change.
    pub quantity: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Running cash total up to and including this row. Only sale rows move
    /// it; other rows carry the value forward.
    pub cumulative_cash: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_type: Option<WithdrawalKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<String>,
}

/// History page filter. `Stock` covers products entering stock (new and
/// addition entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFilter {
    #[default]
    All,
    Sales,
    Stock,
    Withdrawals,
}

impl RowFilter {
    pub fn matches(&self, kind: EntryKind) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::Sales => kind == EntryKind::Sale,
            RowFilter::Stock => matches!(kind, EntryKind::New | EntryKind::Addition),
            RowFilter::Withdrawals => kind == EntryKind::Withdrawal,
        }
    }
}

// =============================================================================
// Flattening
// =============================================================================

/// Flattens entries into report rows, most recent first.
///
/// Entries are sorted by timestamp ascending before flattening so the
/// cumulative cash column accumulates in event order regardless of the
/// input ordering, then the finished list is reversed for presentation.
/// The filter is applied AFTER accumulation, so a filtered view still
/// shows the true running cash on its rows.
pub fn flatten_entries(entries: &[LedgerEntry], filter: RowFilter) -> Vec<ReportRow> {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.date);

    let mut cumulative_cash = 0.0;
    let mut rows = Vec::new();
    for entry in ordered {
        for change in &entry.changes {
            if entry.kind == EntryKind::Sale {
                cumulative_cash += change.total.unwrap_or(0.0);
            }
            if !filter.matches(entry.kind) {
                continue;
            }
            rows.push(ReportRow {
                date: entry.date,
                kind: entry.kind,
                description: entry.description.clone(),
                product_name: change.product_name.clone(),
                quantity: change.quantity,
                previous_quantity: change.previous_quantity,
                new_quantity: change.new_quantity,
                method: entry.method.clone(),
                price: change.price,
                total: change.total,
                cumulative_cash,
                withdrawal_type: change.withdrawal_type,
                reason: change.reason.clone(),
                sale_id: change.sale_id.clone(),
            });
        }
    }

    rows.reverse();
    rows
}

// =============================================================================
// Final Stats
// =============================================================================

/// Header figures for the day's report, replayed from the entry list alone
/// (no projection read needed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStats {
    /// Sum of each product's LAST seen `new_quantity`, i.e. the stock level
    /// the ledger implies at end of day.
    pub total_stock_items: i64,
    /// Cash taken over the day (sum of sale line totals).
    pub total_cash: f64,
    /// Units sold.
    pub total_sales: i64,
    /// Units removed through `withdrawal` entries.
    pub total_withdrawals: i64,
    /// Per-product implied stock at end of day.
    pub current_stock: IndexMap<String, i64>,
}

/// Replays the day's entries into the report header figures.
pub fn final_stats(entries: &[LedgerEntry]) -> FinalStats {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.date);

    let mut stats = FinalStats::default();
    for entry in ordered {
        for change in &entry.changes {
            stats
                .current_stock
                .insert(change.product_name.clone(), change.new_quantity);
            match entry.kind {
                EntryKind::Sale => {
                    stats.total_cash += change.total.unwrap_or(0.0);
                    stats.total_sales += change.quantity.abs();
                }
                EntryKind::Withdrawal => {
                    stats.total_withdrawals += change.quantity.abs();
                }
                EntryKind::New | EntryKind::Addition => {}
            }
        }
    }
    stats.total_stock_items = stats.current_stock.values().sum();
    stats
}

// =============================================================================
// Report Sink
// =============================================================================

/// Consumer seam for spreadsheet-style exporters: this crate produces rows
/// and header figures, the caller decides the output format.
pub trait ReportSink {
    type Error;

    fn write_header(&mut self, stats: &FinalStats) -> Result<(), Self::Error>;
    fn write_row(&mut self, row: &ReportRow) -> Result<(), Self::Error>;
}

/// Streams a finished report into a sink: header first, then every row in
/// presentation order.
pub fn export_report<S: ReportSink>(
    sink: &mut S,
    stats: &FinalStats,
    rows: &[ReportRow],
) -> Result<(), S::Error> {
    sink.write_header(stats)?;
    for row in rows {
        sink.write_row(row)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
