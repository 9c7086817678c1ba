//! # miga-store: Day-Bucket Document Store for Miga POS
//!
//! Persistence and orchestration over the pure logic in `miga-core`. Every
//! await point in the workspace lives here: document reads and writes,
//! range-aggregation fetches and the day-rollover poll task.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          miga-store                                     │
//! │                                                                         │
//! │  ┌───────────────────┐  ┌────────────────────┐  ┌──────────────────┐   │
//! │  │   LedgerService   │  │ HistoryAggregator  │  │    DayWatcher    │   │
//! │  │  add / withdraw   │  │  day + range stats │  │  rollover poll   │   │
//! │  │  checkout/report  │  │  skip-on-failure   │  │  watch channel   │   │
//! │  └─────────┬─────────┘  └─────────┬──────────┘  └──────────────────┘   │
//! │            │                      │                                     │
//! │  ┌─────────▼──────────────────────▼──────────┐                         │
//! │  │  Repositories: stock / history / sales /  │                         │
//! │  │  catalog (whole-document read-modify-write)│                        │
//! │  └─────────┬──────────────────────────────────┘                        │
//! │            │  DocumentStore trait                                      │
//! │  ┌─────────▼─────────┐      ┌───────────────────┐                      │
//! │  │    MemoryStore    │      │    SqliteStore    │                      │
//! │  │  (tests, volatile)│      │  (WAL, documents) │                      │
//! │  └───────────────────┘      └───────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`document`] - The `(collection, key) → JSON` store trait and [`Lookup`]
//! - [`memory`] - In-memory backend with failure injection
//! - [`sqlite`] - SQLite JSON-document backend (WAL)
//! - [`repository`] - Per-collection day-bucket repositories
//! - [`service`] - Counter-facing orchestration
//! - [`aggregator`] - Multi-day analytics with the skip-on-failure policy
//! - [`rollover`] - Midnight rollover watcher
//! - [`error`] - Store and service error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregator;
pub mod document;
pub mod error;
pub mod memory;
pub mod repository;
pub mod rollover;
pub mod service;
pub mod sqlite;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregator::HistoryAggregator;
pub use document::{DocumentStore, Lookup};
pub use error::{LedgerError, LedgerResult, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repository::{HistoryRepository, ProductCatalog, SalesRepository, StockRepository};
pub use rollover::DayWatcher;
pub use service::{AddStockRequest, LedgerService, OpStatus, WithdrawRequest};
pub use sqlite::{SqliteStore, StoreConfig};
