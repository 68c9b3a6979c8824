//! Fetch requests issued by the store and the outcomes fed back into it.
//!
//! Every request carries a [`Ticket`]. The store remembers the ticket it is
//! waiting on per collection and discards any outcome carrying another one,
//! so a response that lands after `clear_search` or a newer query is ignored.
//!
//! Payload errors are plain strings because outcomes travel across the worker
//! boundary as JSON.

use serde::{Deserialize, Serialize};

use crate::domain::ProductRecord;
use crate::feed::source::{CatalogService, Page, PageSource, SearchProvider};

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticket(pub u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A suspended fetch the store is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchRequest {
    /// Full catalog reload feeding `recent` and `popular`.
    Catalog { ticket: Ticket },

    /// Next batch of the `other` feed.
    OtherPage {
        ticket: Ticket,
        page: u32,
        batch_size: usize,
    },

    /// Next batch of search results for `query`.
    SearchPage {
        ticket: Ticket,
        query: String,
        page: u32,
        batch_size: usize,
    },
}

/// The resolution of a [`FetchRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    Catalog {
        ticket: Ticket,
        result: Result<Vec<ProductRecord>, String>,
    },
    OtherPage {
        ticket: Ticket,
        result: Result<Page, String>,
    },
    SearchPage {
        ticket: Ticket,
        query: String,
        result: Result<Page, String>,
    },
}

impl FetchRequest {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::Catalog { ticket }
            | Self::OtherPage { ticket, .. }
            | Self::SearchPage { ticket, .. } => *ticket,
        }
    }

    /// Short name used in log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Catalog { .. } => "catalog",
            Self::OtherPage { .. } => "other",
            Self::SearchPage { .. } => "search",
        }
    }

    /// Builds the outcome for this request from a catalog result.
    ///
    /// Used by the HTTP path, which obtains the products outside any
    /// [`CatalogService`].
    #[must_use]
    pub fn resolve_catalog(self, result: Result<Vec<ProductRecord>, String>) -> FetchOutcome {
        FetchOutcome::Catalog {
            ticket: self.ticket(),
            result,
        }
    }

    /// Resolves the request as failed without running it.
    ///
    /// The outcome keeps the ticket (and the query of a search page), so the
    /// store clears `loading` and the same trigger can retry.
    #[must_use]
    pub fn fail(self, message: impl Into<String>) -> FetchOutcome {
        let message = message.into();
        match self {
            Self::Catalog { ticket } => FetchOutcome::Catalog {
                ticket,
                result: Err(message),
            },
            Self::OtherPage { ticket, .. } => FetchOutcome::OtherPage {
                ticket,
                result: Err(message),
            },
            Self::SearchPage { ticket, query, .. } => FetchOutcome::SearchPage {
                ticket,
                query,
                result: Err(message),
            },
        }
    }

    /// Runs the request synchronously against the given collaborators.
    pub fn fulfil<C, P, S>(self, catalog: &mut C, pages: &P, search: &S) -> FetchOutcome
    where
        C: CatalogService + ?Sized,
        P: PageSource + ?Sized,
        S: SearchProvider + ?Sized,
    {
        match self {
            Self::Catalog { ticket } => FetchOutcome::Catalog {
                ticket,
                result: catalog.list_products().map_err(|e| e.to_string()),
            },
            Self::OtherPage {
                ticket,
                page,
                batch_size,
            } => FetchOutcome::OtherPage {
                ticket,
                result: pages.other_page(page, batch_size).map_err(|e| e.to_string()),
            },
            Self::SearchPage {
                ticket,
                query,
                page,
                batch_size,
            } => {
                let result = search
                    .search(&query, page, batch_size)
                    .map_err(|e| e.to_string());
                FetchOutcome::SearchPage {
                    ticket,
                    query,
                    result,
                }
            }
        }
    }
}

impl FetchOutcome {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::Catalog { ticket, .. }
            | Self::OtherPage { ticket, .. }
            | Self::SearchPage { ticket, .. } => *ticket,
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        match self {
            Self::Catalog { result, .. } => result.is_ok(),
            Self::OtherPage { result, .. } | Self::SearchPage { result, .. } => result.is_ok(),
        }
    }
}
