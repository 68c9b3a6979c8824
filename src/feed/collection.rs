//! Paginated model collection.
//!
//! A [`PagedCollection`] backs the `other` feed and the search results. Items
//! are appended in load order, `page` counts successful batches, and
//! `has_more` drops to `false` at the page cap or when the source runs dry.
//! At most one batch is in flight: `loading` is set by [`begin_load`] and
//! cleared by whichever of [`append_page`] or [`finish_failed`] resolves it.
//!
//! [`begin_load`]: PagedCollection::begin_load
//! [`append_page`]: PagedCollection::append_page
//! [`finish_failed`]: PagedCollection::finish_failed

use crate::domain::Model;
use crate::feed::source::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedCollection {
    pub items: Vec<Model>,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
}

impl Default for PagedCollection {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            has_more: true,
            loading: false,
        }
    }
}

impl PagedCollection {
    /// Whether another batch may be requested right now.
    #[must_use]
    pub const fn can_load_more(&self) -> bool {
        self.has_more && !self.loading
    }

    /// Marks a batch as in flight and returns the page number to request.
    ///
    /// Returns `None`, leaving the collection untouched, when a batch is
    /// already loading or nothing is left to load.
    pub fn begin_load(&mut self) -> Option<u32> {
        if !self.can_load_more() {
            return None;
        }
        self.loading = true;
        Some(self.page + 1)
    }

    /// Appends a resolved batch.
    ///
    /// An empty batch counts as the source signalling exhaustion.
    pub fn append_page(&mut self, page: Page, page_cap: u32) {
        let exhausted = page.exhausted || page.models.is_empty();
        self.items.extend(page.models);
        self.page += 1;
        self.has_more = !exhausted && self.page < page_cap;
        self.loading = false;
    }

    /// Replaces the contents with an externally supplied first page.
    pub fn set_first_page(&mut self, models: Vec<Model>) {
        self.items = models;
        self.page = 1;
        self.has_more = true;
        self.loading = false;
    }

    /// Resolves a failed batch. Items, page, and `has_more` are kept so the
    /// same trigger can be retried.
    pub fn finish_failed(&mut self) {
        self.loading = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies `f` to every item whose id matches, returning how many matched.
    pub fn update_where(&mut self, id: &str, mut f: impl FnMut(&mut Model)) -> usize {
        let mut touched = 0;
        for model in self.items.iter_mut().filter(|m| m.id == id) {
            f(model);
            touched += 1;
        }
        touched
    }
}
