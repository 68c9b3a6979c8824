//! Feed and search pagination.
//!
//! - `collection`: append-only paged collection with a page cap
//! - `request`: tickets, fetch requests and their outcomes
//! - `source`: collaborator traits the requests are fulfilled against
//! - `ranking`: derivation of the `recent` and `popular` feeds
//! - `store`: the state machine tying them together

pub mod collection;
pub mod ranking;
pub mod request;
pub mod source;
pub mod store;

pub use collection::PagedCollection;
pub use request::{FetchOutcome, FetchRequest, Ticket};
pub use source::{CatalogService, Page, PageSource, SearchProvider};
pub use store::{Completion, Counter, FeedSettings, FeedStore};
