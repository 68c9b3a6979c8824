//! Collaborator seams for the feed store.
//!
//! The store never performs I/O. Whoever drives it fulfils its
//! [`FetchRequest`](crate::feed::FetchRequest)s against implementations of
//! these traits: the background worker over the local index, the HTTP shim
//! for the live catalog, or plain in-memory fakes in tests.

use serde::{Deserialize, Serialize};

use crate::domain::{Model, ProductRecord, Result};

/// One batch returned by a paged source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub models: Vec<Model>,
    /// No batch follows this one.
    pub exhausted: bool,
}

/// The whole catalog, unfiltered and unpaged.
pub trait CatalogService {
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or decoded.
    fn list_products(&mut self) -> Result<Vec<ProductRecord>>;
}

/// Source of the `other` feed. Pages are 1-based.
pub trait PageSource {
    /// # Errors
    ///
    /// Returns an error if the batch cannot be produced.
    fn other_page(&self, page: u32, batch_size: usize) -> Result<Page>;
}

/// Query-scoped paged search. Pages are 1-based.
pub trait SearchProvider {
    /// # Errors
    ///
    /// Returns an error if the search backend fails.
    fn search(&self, query: &str, page: u32, batch_size: usize) -> Result<Page>;
}
