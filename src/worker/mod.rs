//! Background worker for catalog caching, paging and search.
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation and message processing logic

pub mod handler;
pub mod messages;

pub use handler::MedshelfWorker;
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
