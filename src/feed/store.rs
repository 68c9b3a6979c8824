//! Feed & search state store.
//!
//! [`FeedStore`] owns the four model collections the browser shows:
//!
//! - `recent` and `popular`, replaced wholesale on every catalog reload
//! - `other`, grown one batch at a time by infinite scroll
//! - `search`, grown the same way but scoped to the active query
//!
//! The store is sans-IO. Operations that need data return a [`FetchRequest`]
//! and mark the collection as loading; the caller performs the fetch however
//! it likes and hands the [`FetchOutcome`] to [`FeedStore::complete`].
//! Outcomes whose ticket is no longer the one outstanding are dropped as
//! [`Completion::Stale`].
//!
//! Likes and downloads are applied as an optimistic local overlay across all
//! collections and reconciled by the next catalog reload.

use tracing::{debug, instrument, warn};

use crate::domain::Model;
use crate::feed::collection::PagedCollection;
use crate::feed::ranking;
use crate::feed::request::{FetchOutcome, FetchRequest, Ticket};

/// Tuning knobs of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    /// Maximum number of batches loaded into `other` or `search`.
    pub page_cap: u32,
    /// Models per `other` or `search` batch.
    pub batch_size: usize,
    /// Models shown in `recent` and `popular`.
    pub feed_size: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_cap: 5,
            batch_size: 8,
            feed_size: 8,
        }
    }
}

/// What [`FeedStore::complete`] did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The payload was merged into the store.
    Applied,
    /// The fetch failed; loading was cleared and the message recorded.
    Failed(String),
    /// Nobody was waiting for this ticket any more. State is untouched.
    Stale,
}

/// Which counter a local overlay increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Downloads,
}

#[derive(Debug, Clone, Default)]
pub struct FeedStore {
    settings: FeedSettings,
    recent: Vec<Model>,
    popular: Vec<Model>,
    other: PagedCollection,
    search: PagedCollection,
    query: String,
    is_searching: bool,
    loading: bool,
    error: Option<String>,
    next_ticket: u64,
    pending_catalog: Option<Ticket>,
    pending_other: Option<Ticket>,
    pending_search: Option<Ticket>,
}

impl FeedStore {
    #[must_use]
    pub fn new(settings: FeedSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn settings(&self) -> FeedSettings {
        self.settings
    }

    #[must_use]
    pub fn recent(&self) -> &[Model] {
        &self.recent
    }

    #[must_use]
    pub fn popular(&self) -> &[Model] {
        &self.popular
    }

    #[must_use]
    pub const fn other(&self) -> &PagedCollection {
        &self.other
    }

    #[must_use]
    pub const fn search(&self) -> &PagedCollection {
        &self.search
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// True while a catalog reload is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Starts a full catalog reload.
    ///
    /// Returns `None` while a reload is already in flight.
    #[instrument(level = "debug", skip(self))]
    pub fn load_initial_feeds(&mut self) -> Option<FetchRequest> {
        if self.loading {
            debug!("catalog reload already in flight");
            return None;
        }
        let ticket = self.issue_ticket();
        self.loading = true;
        self.pending_catalog = Some(ticket);
        Some(FetchRequest::Catalog { ticket })
    }

    /// Requests the next `other` batch, or `None` if one is loading or the
    /// feed is exhausted.
    #[instrument(level = "debug", skip(self), fields(page = self.other.page))]
    pub fn load_more_other(&mut self) -> Option<FetchRequest> {
        let page = self.other.begin_load()?;
        let ticket = self.issue_ticket();
        self.pending_other = Some(ticket);
        Some(FetchRequest::OtherPage {
            ticket,
            page,
            batch_size: self.settings.batch_size,
        })
    }

    /// Replaces `other` with an externally obtained first batch.
    pub fn set_other_models(&mut self, models: Vec<Model>) {
        self.pending_other = None;
        self.other.set_first_page(models);
    }

    /// Empties `other` so the next [`load_more_other`](Self::load_more_other)
    /// starts again from page one. Any in-flight batch becomes stale.
    pub fn reset_other(&mut self) {
        self.pending_other = None;
        self.other.reset();
    }

    /// Enters search mode for `query` and requests its first page.
    ///
    /// A query that is empty after trimming is ignored: search mode, the
    /// current query and the current results all stay as they were.
    #[instrument(level = "debug", skip(self))]
    pub fn start_search(&mut self, query: &str) -> Option<FetchRequest> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.is_searching = true;
        self.query = query.to_string();
        self.search.reset();
        let page = self.search.begin_load()?;
        let ticket = self.issue_ticket();
        self.pending_search = Some(ticket);
        Some(FetchRequest::SearchPage {
            ticket,
            query: self.query.clone(),
            page,
            batch_size: self.settings.batch_size,
        })
    }

    /// Requests the next page for the active query.
    #[instrument(level = "debug", skip(self), fields(query = %self.query, page = self.search.page))]
    pub fn load_more_search(&mut self) -> Option<FetchRequest> {
        if self.query.is_empty() {
            return None;
        }
        let page = self.search.begin_load()?;
        let ticket = self.issue_ticket();
        self.pending_search = Some(ticket);
        Some(FetchRequest::SearchPage {
            ticket,
            query: self.query.clone(),
            page,
            batch_size: self.settings.batch_size,
        })
    }

    /// Leaves search mode and drops all search state, including any page
    /// still in flight.
    pub fn clear_search(&mut self) {
        self.is_searching = false;
        self.query.clear();
        self.search.reset();
        self.pending_search = None;
    }

    /// Adds one like to every copy of model `id`. Returns the number of
    /// copies touched.
    pub fn record_like(&mut self, id: &str) -> usize {
        self.bump(id, Counter::Likes)
    }

    /// Adds one download to every copy of model `id`. Returns the number of
    /// copies touched.
    pub fn record_download(&mut self, id: &str) -> usize {
        self.bump(id, Counter::Downloads)
    }

    fn bump(&mut self, id: &str, counter: Counter) -> usize {
        let apply = |model: &mut Model| match counter {
            Counter::Likes => model.likes = model.likes.saturating_add(1),
            Counter::Downloads => model.downloads = model.downloads.saturating_add(1),
        };

        let mut touched = 0;
        for model in self
            .recent
            .iter_mut()
            .chain(self.popular.iter_mut())
            .filter(|m| m.id == id)
        {
            apply(model);
            touched += 1;
        }
        touched += self.other.update_where(id, apply);
        touched += self.search.update_where(id, apply);
        debug!(id, ?counter, touched, "applied local counter overlay");
        touched
    }

    /// Looks a model up in whatever collection holds it first.
    #[must_use]
    pub fn find_model(&self, id: &str) -> Option<&Model> {
        self.recent
            .iter()
            .chain(&self.popular)
            .chain(&self.other.items)
            .chain(&self.search.items)
            .find(|m| m.id == id)
    }

    /// Merges the resolution of an earlier request.
    #[instrument(level = "debug", skip(self, outcome), fields(ticket = %outcome.ticket()))]
    pub fn complete(&mut self, outcome: FetchOutcome) -> Completion {
        match outcome {
            FetchOutcome::Catalog { ticket, result } => {
                if self.pending_catalog != Some(ticket) {
                    debug!("discarding stale catalog response");
                    return Completion::Stale;
                }
                self.pending_catalog = None;
                self.loading = false;
                match result {
                    Ok(products) => {
                        self.recent = ranking::recent(&products, self.settings.feed_size);
                        self.popular = ranking::popular(&products, self.settings.feed_size);
                        self.error = None;
                        debug!(
                            products = products.len(),
                            recent = self.recent.len(),
                            popular = self.popular.len(),
                            "catalog applied"
                        );
                        Completion::Applied
                    }
                    Err(message) => self.fail(message),
                }
            }
            FetchOutcome::OtherPage { ticket, result } => {
                if self.pending_other != Some(ticket) {
                    debug!("discarding stale other page");
                    return Completion::Stale;
                }
                self.pending_other = None;
                match result {
                    Ok(page) => {
                        self.other.append_page(page, self.settings.page_cap);
                        Completion::Applied
                    }
                    Err(message) => {
                        self.other.finish_failed();
                        self.fail(message)
                    }
                }
            }
            FetchOutcome::SearchPage {
                ticket,
                query,
                result,
            } => {
                if self.pending_search != Some(ticket) || !self.is_searching || query != self.query {
                    debug!(%query, "discarding stale search page");
                    return Completion::Stale;
                }
                self.pending_search = None;
                match result {
                    Ok(page) => {
                        self.search.append_page(page, self.settings.page_cap);
                        Completion::Applied
                    }
                    Err(message) => {
                        self.search.finish_failed();
                        self.fail(message)
                    }
                }
            }
        }
    }

    fn fail(&mut self, message: String) -> Completion {
        warn!(error = %message, "fetch failed");
        self.error = Some(message.clone());
        Completion::Failed(message)
    }
}
