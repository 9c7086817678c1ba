//! # Store Error Types
//!
//! Error types for document store and service operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend error (sqlx::Error / injected)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerError ← Union with CoreError at the service surface              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (UI layer) displays a user-facing message                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A MISSING DOCUMENT is never an error. The store models it as
//! [`Lookup::NotFound`](crate::document::Lookup) and callers branch on it;
//! only transport and serialization failures surface here.

use miga_core::CoreError;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Document store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A read or write against the backend failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The backend is unreachable (network drop, pool closed, or an
    /// injected failure in tests).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be decoded, or a document could not be
    /// encoded for writing.
    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to StoreError.
///
/// `RowNotFound` is deliberately absent from the mapping: document reads
/// use `fetch_optional` and fold absence into `Lookup::NotFound` before an
/// error can arise.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                StoreError::Unavailable("connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Ledger Error
// =============================================================================

/// Service-level error union: business rule violations from miga-core plus
/// transport failures from the store.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Business rule or validation violation. Raised before any write, so
    /// it never leaves partial state behind.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transport or serialization failure. May leave a day bucket partially
    /// written (the writes are independent, not a transaction); the caller
    /// is expected to surface the failure, not retry blindly.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<miga_core::ValidationError> for LedgerError {
    fn from(err: miga_core::ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

/// Result type for service operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================
