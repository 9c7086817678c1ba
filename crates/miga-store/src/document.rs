//! # Document Store Abstraction
//!
//! The storage seam: everything above this trait sees per-day JSON
//! documents addressed by `(collection, key)`, nothing more.
//!
//! ## Collections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Document Layout                                     │
//! │                                                                         │
//! │  stock/{day}     ──► flat { productName: quantity } map                 │
//! │  history/{day}   ──► { entries: [...], cleared?, clearedAt?, ... }      │
//! │  pos/{day}       ──► { sales: [...], totalSales, createdAt?, ... }      │
//! │  products/{id}   ──► catalog product (global, not day-scoped)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Absence Is Not an Error
//! `get` returns [`Lookup`], never a not-found error. Day buckets come into
//! existence on first write; a bucket that was never written reads as
//! `NotFound` and every caller has a defined branch for it (create the
//! document, or treat the day as empty).

use serde_json::Value;

use crate::error::StoreResult;

// =============================================================================
// Collections
// =============================================================================

/// Day-keyed stock projections.
pub const STOCK: &str = "stock";
/// Day-keyed history documents (ledger entries).
pub const HISTORY: &str = "history";
/// Day-keyed POS documents (sales).
pub const POS: &str = "pos";
/// Global product catalog, keyed by product id.
pub const PRODUCTS: &str = "products";

// =============================================================================
// Lookup
// =============================================================================

/// The result of a document read: present or absent, as data.
///
/// Callers branch on this instead of catching a not-found error, so the
/// update-vs-create decision is ordinary control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Exists(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// Maps the `Exists` payload, preserving `NotFound`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Exists(value) => Lookup::Exists(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }

    /// The payload, or `default` when the document was absent.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Lookup::Exists(value) => value,
            Lookup::NotFound => default,
        }
    }

    /// The payload, or the type's default when the document was absent.
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.unwrap_or_else(T::default)
    }

    /// The payload, or `f()` when the document was absent.
    pub fn unwrap_or_else(self, f: impl FnOnce() -> T) -> T {
        match self {
            Lookup::Exists(value) => value,
            Lookup::NotFound => f(),
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, Lookup::Exists(_))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => Lookup::Exists(value),
            None => Lookup::NotFound,
        }
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// A backend holding JSON documents addressed by `(collection, key)`.
///
/// Writes replace the whole document; there are no partial updates and no
/// multi-document transactions. Implementations are cheap to clone (they
/// share the underlying pool or map).
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Clone + Send + Sync {
    /// Reads a document. Absence is `Lookup::NotFound`, not an error.
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Lookup<Value>>;

    /// Writes (creates or replaces) a document.
    async fn put(&self, collection: &str, key: &str, body: Value) -> StoreResult<()>;

    /// Deletes a document. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()>;

    /// Lists a collection's `(key, document)` pairs, ordered by key.
    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_branches() {
        let found: Lookup<i64> = Lookup::Exists(7);
        assert!(found.exists());
        assert_eq!(found.clone().map(|v| v * 2), Lookup::Exists(14));
        assert_eq!(found.unwrap_or(0), 7);

        let missing: Lookup<i64> = Lookup::NotFound;
        assert!(!missing.exists());
        assert_eq!(missing.clone().map(|v| v * 2), Lookup::NotFound);
        assert_eq!(missing.unwrap_or_default(), 0);
    }

    #[test]
    fn test_lookup_from_option() {
        assert_eq!(Lookup::from(Some(1)), Lookup::Exists(1));
        assert_eq!(Lookup::<i64>::from(None), Lookup::NotFound);
    }
}
