//! # Day-Bucket Repositories
//!
//! One repository per collection, all generic over the [`DocumentStore`]
//! backend:
//!
//! - [`stock::StockRepository`] - the day's quantity projection
//! - [`history::HistoryRepository`] - the day's append-only entry list
//! - [`sales::SalesRepository`] - the day's POS document
//! - [`catalog::ProductCatalog`] - the global product catalog
//!
//! Every mutation is a read-modify-write of one whole document. Two
//! counters mutating the same day concurrently can lose an update; the
//! deployment is a single counter, so this is documented rather than
//! guarded against.
//!
//! [`DocumentStore`]: crate::document::DocumentStore

pub mod catalog;
pub mod history;
pub mod sales;
pub mod stock;

pub use catalog::ProductCatalog;
pub use history::HistoryRepository;
pub use sales::SalesRepository;
pub use stock::StockRepository;
