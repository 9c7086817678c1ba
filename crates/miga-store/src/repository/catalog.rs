//! # Product Catalog
//!
//! The global product catalog: names, categories and price schemes. Unlike
//! the ledger collections it is NOT day-scoped; one document per product,
//! keyed by id.
//!
//! The ledger only consumes names and `price_for` lookups from here; stock
//! quantities never live in the catalog.

use miga_core::Product;
use tracing::debug;
use uuid::Uuid;

use crate::document::{self, DocumentStore, Lookup};
use crate::error::StoreResult;

/// Repository for the `products` collection.
#[derive(Debug, Clone)]
pub struct ProductCatalog<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ProductCatalog<S> {
    pub fn new(store: S) -> Self {
        ProductCatalog { store }
    }

    /// Creates or replaces a product. A blank id gets a fresh one assigned;
    /// the (possibly updated) product is returned.
    pub async fn upsert(&self, mut product: Product) -> StoreResult<Product> {
        if product.id.trim().is_empty() {
            product.id = Uuid::new_v4().to_string();
        }
        let body = serde_json::to_value(&product)?;
        self.store.put(document::PRODUCTS, &product.id, body).await?;
        debug!(id = %product.id, name = %product.name, "product upserted");
        Ok(product)
    }

    /// Fetches a product by id.
    pub async fn get(&self, id: &str) -> StoreResult<Lookup<Product>> {
        match self.store.get(document::PRODUCTS, id).await? {
            Lookup::Exists(body) => Ok(Lookup::Exists(serde_json::from_value(body)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    /// All catalog products, ordered by document key.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let mut products = Vec::new();
        for (_, body) in self.store.list(document::PRODUCTS).await? {
            products.push(serde_json::from_value(body)?);
        }
        Ok(products)
    }

    /// Finds a product by its (ledger) name.
    pub async fn get_by_name(&self, name: &str) -> StoreResult<Lookup<Product>> {
        let found = self.list().await?.into_iter().find(|p| p.name == name);
        Ok(found.into())
    }

    /// Removes a product from the catalog. Past ledger entries keep the
    /// name; only future sales lose the price lookup.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.store.delete(document::PRODUCTS, id).await?;
        debug!(id, "product removed from catalog");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
