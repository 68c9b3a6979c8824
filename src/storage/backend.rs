//! Storage backend abstraction.
//!
//! The [`Storage`] trait covers what the worker needs from the local catalog
//! cache: swap in a freshly fetched catalog, read it back, and append records
//! created locally. Every backend also serves as the offline
//! [`CatalogService`] and as the [`ProductStore`] for local uploads.

use crate::catalog::submission::ProductStore;
use crate::domain::error::Result;
use crate::domain::ProductRecord;
use crate::feed::source::CatalogService;

pub trait Storage: Send {
    /// Replaces the cached catalog, keeping source order.
    ///
    /// Returns the number of stored products. Storing an identical catalog
    /// is not a write.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    fn replace_products(&mut self, products: Vec<ProductRecord>) -> Result<usize>;

    /// All cached products in source order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read operation fails.
    fn get_all_products(&self) -> Result<Vec<ProductRecord>>;

    /// # Errors
    ///
    /// Returns an error if the read operation fails.
    fn get_product(&self, id: &str) -> Result<Option<ProductRecord>>;

    /// Appends a new record, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the id already exists or the write fails.
    fn insert_product(&mut self, product: ProductRecord) -> Result<()>;

    /// When the cached catalog was last replaced (RFC 3339).
    fn fetched_at(&self) -> Option<String>;
}

impl<S: Storage + ?Sized> CatalogService for S {
    fn list_products(&mut self) -> Result<Vec<ProductRecord>> {
        self.get_all_products()
    }
}

impl<S: Storage + ?Sized> ProductStore for S {
    fn create(&mut self, record: ProductRecord) -> Result<ProductRecord> {
        self.insert_product(record.clone())?;
        Ok(record)
    }
}
