//! # miga-core: Pure Business Logic for the Miga Stock Ledger
//!
//! This crate is the **heart** of Miga. It contains the day-bucket ledger
//! model and all derivation logic as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Miga Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI / Reporting Layer                         │   │
//! │  │    Stock form ──► POS ──► History report ──► Dashboard          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    miga-store (Services)                        │   │
//! │  │    LedgerService, HistoryAggregator, DayWatcher, repositories   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ miga-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │ projection│  │ analytics │  │   rows    │   │   │
//! │  │   │  entries  │  │  stock    │  │ day/range │  │  report   │   │   │
//! │  │   │   sales   │  │  map      │  │  stats    │  │  rows     │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LedgerEntry, StockChange, Sale, Product)
//! - [`day`] - Day keys and rollover detection
//! - [`projection`] - The per-day stock quantity mapping
//! - [`sales`] - Running totals over a day's sales
//! - [`analytics`] - Day and multi-day statistics
//! - [`rows`] - Report row flattening and final stats
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every derivation is deterministic over its inputs
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Day Buckets**: All state is partitioned by local calendar date
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod day;
pub mod error;
pub mod projection;
pub mod rows;
pub mod sales;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use miga_core::DayKey` instead of
// `use miga_core::day::DayKey`

pub use analytics::{analyze_day, DayStats, ProductStats, RangeAccumulator, RangeStats};
pub use day::{rollover, DayKey};
pub use error::{CoreError, CoreResult, ValidationError};
pub use projection::{StockLevel, StockProjection};
pub use rows::{final_stats, flatten_entries, FinalStats, ReportRow, ReportSink, RowFilter};
pub use sales::{ProductRank, SalesLedger};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Low-stock warning threshold (units).
///
/// ## Business Reason
/// A tray of bread sells out fast; the dashboard flags anything at 5 units
/// or fewer so the baker can restock before the shelf goes empty.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Number of products shown in the best-sellers ranking.
pub const BEST_SELLERS_LIMIT: usize = 5;

/// Number of days in the default dashboard window.
pub const DEFAULT_RANGE_DAYS: usize = 7;
