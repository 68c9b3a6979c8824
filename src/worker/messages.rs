//! Worker thread message types for cross-thread communication.
//!
//! Request and response protocol between the plugin and its background worker,
//! which owns the catalog cache and the search index. Messages carry the
//! caller's trace context so worker spans join the plugin's trace.

use crate::catalog::{CreateResponse, ProductDraft};
use crate::domain::ProductRecord;
use crate::feed::{FetchOutcome, FetchRequest};
use serde::{Deserialize, Serialize};

/// Distributed tracing context for cross-thread span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry to maintain
/// trace continuity when passing messages to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the OpenTelemetry ids of the active span.
    ///
    /// Returns `None` when no valid span context is active, e.g. when tracing
    /// is disabled.
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();

        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// Generates `WorkerMessage` constructors that attach the current trace context.
macro_rules! worker_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with current trace context")]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

worker_message_builders! {
    index_catalog(IndexCatalog { products: Vec<ProductRecord> }),
    fetch(Fetch { request: FetchRequest }),
    submit(Submit { draft: ProductDraft }),
}

/// Messages sent from the plugin to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// Replace the cached catalog and rebuild the search index from it.
    IndexCatalog {
        products: Vec<ProductRecord>,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Fulfil a feed request against the cache and index.
    Fetch {
        request: FetchRequest,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Create a product from files on the host.
    Submit {
        draft: ProductDraft,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::IndexCatalog { trace_context, .. }
            | Self::Fetch { trace_context, .. }
            | Self::Submit { trace_context, .. } => trace_context.as_ref(),
        }
    }

    /// Variant name for log fields; payloads can be large.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::IndexCatalog { .. } => "index_catalog",
            Self::Fetch { .. } => "fetch",
            Self::Submit { .. } => "submit",
        }
    }
}

/// Responses sent from the worker back to the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerResponse {
    /// The index now holds `count` published models.
    CatalogIndexed { count: usize },

    /// A feed request was fulfilled, successfully or not.
    Fetched { outcome: FetchOutcome },

    /// Result of a product submission.
    Submitted { response: CreateResponse },

    /// The worker could not process a message.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Ticket;

    #[test]
    fn builders_skip_missing_trace_context() {
        let message = WorkerMessage::fetch(FetchRequest::Catalog { ticket: Ticket(1) });
        assert!(message.trace_context().is_none());
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("trace_context"));
        let back: WorkerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn kind_names_variants() {
        assert_eq!(WorkerMessage::index_catalog(Vec::new()).kind(), "index_catalog");
        assert_eq!(WorkerMessage::submit(ProductDraft::default()).kind(), "submit");
    }
}
