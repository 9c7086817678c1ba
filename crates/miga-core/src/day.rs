//! # Day Keys
//!
//! The calendar-day partition key for every ledger document.
//!
//! ## Day Bucket Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Day Bucket Partitioning                           │
//! │                                                                         │
//! │  DayKey "2026-08-23" ──┬── stock/2026-08-23    (projection)             │
//! │                        ├── history/2026-08-23  (ledger entries)         │
//! │                        └── pos/2026-08-23      (sales)                  │
//! │                                                                         │
//! │  The three documents are logically ONE day bucket: every operation      │
//! │  resolves its DayKey exactly once and uses it for all writes.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Local Time, Not UTC
//! The bakery's day starts when the bakery's clock says so. Day keys are
//! derived from the local calendar date; only entry timestamps are UTC.

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Format shared by every day key: `YYYY-MM-DD`.
const DAY_FORMAT: &str = "%Y-%m-%d";

/// A calendar date string (`YYYY-MM-DD`, local time) used as the partition
/// key for stock, history and sales documents.
///
/// Lexicographic order on the string equals calendar order, so the derived
/// `Ord` is the calendar ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    /// Today's day key from the local clock.
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// Builds a day key from a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        DayKey(date.format(DAY_FORMAT).to_string())
    }

    /// Parses and validates a `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let date =
            NaiveDate::parse_from_str(s, DAY_FORMAT).map_err(|e| ValidationError::InvalidFormat {
                field: "dayKey".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_date(date))
    }

    /// The underlying `YYYY-MM-DD` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The calendar date behind this key.
    pub fn date(&self) -> NaiveDate {
        // Only constructed through from_date/parse, so this cannot fail.
        NaiveDate::parse_from_str(&self.0, DAY_FORMAT).unwrap_or_default()
    }

    /// The year of this day key.
    pub fn year(&self) -> i32 {
        self.date().year()
    }

    /// The last `n` day keys ending today, most recent first.
    ///
    /// This is the dashboard's "last 7 days" window: index 0 is today,
    /// index 1 yesterday, and so on.
    pub fn last_n_days(n: usize) -> Vec<DayKey> {
        let today = Local::now().date_naive();
        (0..n)
            .map(|i| Self::from_date(today - Duration::days(i as i64)))
            .collect()
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Detects a calendar-day rollover.
///
/// Returns the new day key when "now" has moved past `previous`, `None`
/// while the day is unchanged. This is the pure half of the day resolver;
/// the store crate polls it on an interval and re-points subscriptions.
pub fn rollover(previous: &DayKey) -> Option<DayKey> {
    let now = DayKey::today();
    if now != *previous {
        Some(now)
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
