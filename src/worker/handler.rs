//! Worker thread owning the catalog cache and the search index.
//!
//! The plugin thread never touches the filesystem. It posts
//! [`WorkerMessage`]s here and receives [`WorkerResponse`]s back through
//! Zellij's worker API. Storage is opened lazily on the first message and the
//! index is seeded from whatever catalog was cached last, so `other` pages
//! and search work before the live catalog has been fetched.

use std::path::PathBuf;

use crate::catalog::{create_product, CreateResponse, MediaFile, ProductDraft};
use crate::domain::error::{MedshelfError, Result};
use crate::domain::ProductRecord;
use crate::feed::FetchRequest;
use crate::infrastructure::paths;
use crate::search::CatalogIndex;
use crate::storage::backend::Storage;
use crate::storage::{DirectoryMediaStore, JsonStorage};
use crate::worker::{WorkerMessage, WorkerResponse};
use serde::{Deserialize, Serialize};
use zellij_tile::prelude::{PluginMessage, ZellijWorker};
use zellij_tile::shim::post_message_to_plugin;

#[derive(Serialize, Deserialize, Default)]
pub struct MedshelfWorker {
    #[serde(skip)]
    storage: Option<Box<dyn Storage>>,

    #[serde(skip)]
    index: CatalogIndex,

    #[serde(skip)]
    media: Option<DirectoryMediaStore>,
}

impl MedshelfWorker {
    /// Creates a worker over the given backends and seeds its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the cached catalog cannot be read.
    pub fn with_backends(storage: Box<dyn Storage>, media_root: PathBuf) -> Result<Self> {
        let cached = storage.get_all_products()?;
        tracing::debug!(cached = cached.len(), "seeding index from cache");
        Ok(Self {
            index: CatalogIndex::new(&cached),
            storage: Some(storage),
            media: Some(DirectoryMediaStore::new(media_root)),
        })
    }

    /// Opens the default cache and media directory under the data dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub fn open_default() -> Result<Self> {
        let storage: Box<dyn Storage> = Box::new(JsonStorage::new(paths::catalog_file())?);
        Self::with_backends(storage, paths::media_dir())
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.storage.is_some()
    }

    #[must_use]
    pub const fn index(&self) -> &CatalogIndex {
        &self.index
    }

    fn not_ready() -> MedshelfError {
        MedshelfError::Worker("Storage not initialized".to_string())
    }

    /// Logs a failed operation and turns it into an error response.
    fn handle_result<T, F>(operation: &str, result: Result<T>, on_success: F) -> WorkerResponse
    where
        F: FnOnce(T) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation, "worker operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "worker operation failed");
                WorkerResponse::Error {
                    message: format!("{operation}: {e}"),
                }
            }
        }
    }

    fn handle_index_catalog(&mut self, products: Vec<ProductRecord>) -> WorkerResponse {
        self.index.rebuild(&products);
        let count = self.index.len();

        let stored = self
            .storage
            .as_mut()
            .ok_or_else(Self::not_ready)
            .and_then(|storage| storage.replace_products(products));

        Self::handle_result("cache catalog", stored, |_| WorkerResponse::CatalogIndexed { count })
    }

    fn handle_fetch(&mut self, request: FetchRequest) -> WorkerResponse {
        let _span = tracing::debug_span!("worker_fetch",
            kind = request.kind(),
            ticket = %request.ticket()
        )
        .entered();

        let Some(storage) = self.storage.as_mut() else {
            return WorkerResponse::Fetched {
                outcome: request.fail(Self::not_ready().to_string()),
            };
        };

        let outcome = request.fulfil(storage.as_mut(), &self.index, &self.index);
        tracing::debug!(ok = outcome.is_ok(), "fetch fulfilled");
        WorkerResponse::Fetched { outcome }
    }

    fn read_media(path: &str) -> Result<MediaFile> {
        let full = paths::sandbox_path(path);
        let bytes = std::fs::read(&full)
            .map_err(|e| MedshelfError::Upload(format!("cannot read {path}: {e}")))?;
        let file_name = full
            .file_name()
            .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned());
        Ok(MediaFile::new(file_name, bytes))
    }

    fn handle_submit(&mut self, draft: ProductDraft) -> WorkerResponse {
        let (Some(storage), Some(media)) = (self.storage.as_mut(), self.media.as_mut()) else {
            return WorkerResponse::Error {
                message: Self::not_ready().to_string(),
            };
        };

        let response = match draft.load(Self::read_media) {
            Ok(submission) => create_product(submission, media, storage.as_mut()),
            Err(e) => CreateResponse::rejected(e.to_string()),
        };
        WorkerResponse::Submitted { response }
    }

    /// Attaches the trace context carried by `message` so worker spans link
    /// to the plugin span that posted it.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;
        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        Some(opentelemetry::Context::current().with_remote_span_context(span_context).attach())
    }

    /// Answers `message` without handling it.
    ///
    /// A fetch is always answered with its failed outcome so the plugin can
    /// settle the pending request.
    fn refuse(message: WorkerMessage, reason: String) -> WorkerResponse {
        match message {
            WorkerMessage::Fetch { request, .. } => WorkerResponse::Fetched {
                outcome: request.fail(reason),
            },
            WorkerMessage::IndexCatalog { .. } | WorkerMessage::Submit { .. } => {
                WorkerResponse::Error { message: reason }
            }
        }
    }

    /// Processes one message, opening storage first if needed.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);
        let _guard = tracing::debug_span!("worker_handle_message", message_type = message.kind()).entered();

        if !self.is_ready() {
            match Self::open_default() {
                Ok(worker) => *self = worker,
                Err(e) => {
                    tracing::error!(error = %e, "failed to initialize storage");
                    return Self::refuse(message, format!("Failed to initialize storage: {e}"));
                }
            }
        }

        match message {
            WorkerMessage::IndexCatalog { products, .. } => self.handle_index_catalog(products),
            WorkerMessage::Fetch { request, .. } => self.handle_fetch(request),
            WorkerMessage::Submit { draft, .. } => self.handle_submit(draft),
        }
    }
}

fn init_worker_tracing() {
    use crate::observability;
    use crate::Config;

    observability::init_tracing(&Config::default());
}

static WORKER_TRACING_INITIALIZED: std::sync::atomic::AtomicBool =
    std::sync::atomic::AtomicBool::new(false);

impl ZellijWorker<'_> for MedshelfWorker {
    /// Deserializes a [`WorkerMessage`], handles it, and posts the response
    /// back under the same message name.
    fn on_message(&mut self, message: String, payload: String) {
        if !WORKER_TRACING_INITIALIZED.swap(true, std::sync::atomic::Ordering::Relaxed) {
            init_worker_tracing();
        }

        let response = match serde_json::from_str::<WorkerMessage>(&payload) {
            Ok(worker_message) => self.handle_message(worker_message),
            Err(e) => {
                tracing::warn!(error = %e, "failed to deserialize worker message");
                WorkerResponse::Error {
                    message: format!("unreadable worker message: {e}"),
                }
            }
        };

        match serde_json::to_string(&response) {
            Ok(payload) => post_message_to_plugin(PluginMessage {
                name: message,
                payload,
                worker_name: None,
            }),
            Err(e) => tracing::error!(error = %e, "failed to serialize worker response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelStatus;
    use crate::feed::{FetchOutcome, Ticket};

    fn published(id: &str, title: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            title: title.to_string(),
            status: ModelStatus::Published,
            ..ProductRecord::default()
        }
    }

    fn worker(dir: &tempfile::TempDir) -> MedshelfWorker {
        let storage = JsonStorage::new(dir.path().join("catalog.json")).unwrap();
        MedshelfWorker::with_backends(Box::new(storage), dir.path().join("media")).unwrap()
    }

    #[test]
    fn indexing_caches_catalog_and_serves_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = worker(&dir);

        let response = worker.handle_message(WorkerMessage::index_catalog(vec![
            published("1", "Left Femur"),
            published("2", "Skull"),
        ]));
        assert_eq!(response, WorkerResponse::CatalogIndexed { count: 2 });

        let response = worker.handle_message(WorkerMessage::fetch(FetchRequest::SearchPage {
            ticket: Ticket(4),
            query: "femur".to_string(),
            page: 1,
            batch_size: 8,
        }));
        match response {
            WorkerResponse::Fetched {
                outcome: FetchOutcome::SearchPage { ticket, result, .. },
            } => {
                assert_eq!(ticket, Ticket(4));
                assert_eq!(result.unwrap().models[0].id, "1");
            }
            other => panic!("unexpected response: {other:?}"),
        }

        let reopened = self::worker(&dir);
        assert_eq!(reopened.index().len(), 2);
    }

    #[test]
    fn offline_catalog_comes_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = worker(&dir);
        worker.handle_message(WorkerMessage::index_catalog(vec![published("1", "Heart")]));

        let response =
            worker.handle_message(WorkerMessage::fetch(FetchRequest::Catalog { ticket: Ticket(9) }));
        match response {
            WorkerResponse::Fetched {
                outcome: FetchOutcome::Catalog { result, .. },
            } => assert_eq!(result.unwrap().len(), 1),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn fetch_without_storage_settles_with_failed_outcome() {
        let mut worker = MedshelfWorker::default();
        let response = worker.handle_fetch(FetchRequest::OtherPage {
            ticket: Ticket(2),
            page: 1,
            batch_size: 8,
        });
        assert_eq!(
            response,
            WorkerResponse::Fetched {
                outcome: FetchOutcome::OtherPage {
                    ticket: Ticket(2),
                    result: Err("Worker communication error: Storage not initialized".to_string()),
                },
            }
        );
    }

    #[test]
    fn storage_failure_still_answers_fetches() {
        let reason = "Failed to initialize storage: failed to parse JSON".to_string();
        let request = FetchRequest::SearchPage {
            ticket: Ticket(6),
            query: "femur".to_string(),
            page: 1,
            batch_size: 8,
        };

        let response = MedshelfWorker::refuse(WorkerMessage::fetch(request.clone()), reason.clone());
        assert_eq!(
            response,
            WorkerResponse::Fetched {
                outcome: request.fail(reason.clone()),
            }
        );

        let response = MedshelfWorker::refuse(WorkerMessage::index_catalog(vec![]), reason.clone());
        assert_eq!(response, WorkerResponse::Error { message: reason });
    }

    #[test]
    fn blank_title_submission_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = worker(&dir);
        let response = worker.handle_message(WorkerMessage::submit(ProductDraft::default()));
        match response {
            WorkerResponse::Submitted { response } => {
                assert!(!response.success);
                assert_eq!(response.message.as_deref(), Some("Missing required field: title"));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
