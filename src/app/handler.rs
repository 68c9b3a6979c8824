//! Event handling and state transitions.
//!
//! [`handle_event`] is the only place application state changes. It maps an
//! [`Event`] to store operations and returns whether to re-render plus the
//! [`Action`]s the runtime should carry out.
//!
//! Fetch requests leave through [`route_fetch`]: catalog reloads go to the
//! network when a catalog URL is configured, everything else is served by the
//! worker from its index.

use crate::app::modes::{InputMode, SearchFocus};
use crate::app::state::STATUS_CLEAR_SECS;
use crate::app::{Action, AppState};
use crate::catalog::ProductDraft;
use crate::domain::error::Result;
use crate::feed::{Completion, FetchOutcome, FetchRequest};
use crate::worker::{WorkerMessage, WorkerResponse};

/// Events from user input, the network, the worker and timers.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Permissions are granted. Kicks off the first catalog load.
    Start,

    KeyDown,
    KeyUp,
    NextSection,
    PrevSection,

    /// Opens the search bar with typing focus.
    SearchMode,
    /// Returns from result navigation to editing the query.
    FocusSearchBar,
    Char(char),
    Backspace,
    /// Runs the draft query.
    SubmitSearch,
    /// Closes the detail overlay, otherwise backs out of search.
    Escape,

    OpenDetail,
    Like,
    Download,
    LoadMore,
    /// Reloads the catalog and restarts `other` from page one.
    Refresh,
    CloseFocus,

    /// A catalog fetch performed by the runtime has resolved.
    FetchCompleted(FetchOutcome),
    WorkerResponse(WorkerResponse),

    /// A product draft piped in by the user.
    Submit(ProductDraft),

    /// A model download command has exited.
    DownloadFinished {
        id: String,
        success: bool,
        message: String,
    },

    /// The status line timer fired.
    ClearStatus,
}

/// Sends `request` to whoever serves it.
#[must_use]
pub fn route_fetch(state: &AppState, request: FetchRequest) -> Action {
    match request {
        FetchRequest::Catalog { .. } if state.online => Action::RequestCatalog(request),
        request => Action::PostToWorker(WorkerMessage::fetch(request)),
    }
}

/// Processes an event, mutates state and returns the actions to execute.
///
/// The boolean tells the runtime whether the UI needs a re-render.
///
/// # Errors
///
/// Currently infallible. The `Result` keeps room for operations that can
/// fail before any action is emitted.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::Start => {
            let actions = state
                .feed
                .load_initial_feeds()
                .map(|request| route_fetch(state, request))
                .into_iter()
                .collect();
            Ok((true, actions))
        }
        Event::KeyDown => {
            if state.detail.is_some() {
                return Ok((false, vec![]));
            }
            state.move_selection_down();
            let actions = if state.near_end() {
                tracing::debug!(selected = state.selected_index, "scrolled near end of list");
                load_more(state)
            } else {
                vec![]
            };
            Ok((true, actions))
        }
        Event::KeyUp => {
            if state.detail.is_some() {
                return Ok((false, vec![]));
            }
            state.move_selection_up();
            Ok((true, vec![]))
        }
        Event::NextSection | Event::PrevSection => {
            if state.input_mode != InputMode::Normal || state.feed.is_searching() {
                return Ok((false, vec![]));
            }
            state.cycle_section(matches!(event, Event::NextSection));
            tracing::debug!(section = ?state.section, "section changed");
            let actions = if state.near_end() && state.feed.other().page == 0 {
                load_more(state)
            } else {
                vec![]
            };
            Ok((true, actions))
        }
        Event::SearchMode => {
            state.detail = None;
            state.input_mode = InputMode::Search(SearchFocus::Typing);
            state.draft_query = state.feed.query().to_string();
            Ok((true, vec![]))
        }
        Event::FocusSearchBar => {
            if state.input_mode != InputMode::Search(SearchFocus::Navigating) {
                return Ok((false, vec![]));
            }
            state.input_mode = InputMode::Search(SearchFocus::Typing);
            Ok((true, vec![]))
        }
        Event::Char(c) => {
            if state.input_mode != InputMode::Search(SearchFocus::Typing) {
                return Ok((false, vec![]));
            }
            state.draft_query.push(*c);
            tracing::trace!(query = %state.draft_query, "draft query updated");
            Ok((true, vec![]))
        }
        Event::Backspace => {
            if state.input_mode != InputMode::Search(SearchFocus::Typing) {
                return Ok((false, vec![]));
            }
            state.draft_query.pop();
            Ok((true, vec![]))
        }
        Event::SubmitSearch => {
            if state.input_mode != InputMode::Search(SearchFocus::Typing) {
                return Ok((false, vec![]));
            }
            let Some(request) = state.feed.start_search(&state.draft_query) else {
                tracing::debug!("blank query ignored");
                if state.feed.is_searching() {
                    state.draft_query = state.feed.query().to_string();
                    state.input_mode = InputMode::Search(SearchFocus::Navigating);
                } else {
                    state.draft_query.clear();
                    state.input_mode = InputMode::Normal;
                }
                return Ok((true, vec![]));
            };
            state.draft_query = state.feed.query().to_string();
            state.input_mode = InputMode::Search(SearchFocus::Navigating);
            state.selected_index = 0;
            Ok((true, vec![route_fetch(state, request)]))
        }
        Event::Escape => {
            if state.detail.take().is_some() {
                return Ok((true, vec![]));
            }
            match state.input_mode {
                InputMode::Search(SearchFocus::Typing) if state.feed.is_searching() => {
                    state.draft_query = state.feed.query().to_string();
                    state.input_mode = InputMode::Search(SearchFocus::Navigating);
                }
                InputMode::Search(_) => {
                    tracing::debug!(query = %state.feed.query(), "leaving search");
                    state.feed.clear_search();
                    state.draft_query.clear();
                    state.input_mode = InputMode::Normal;
                    state.selected_index = 0;
                }
                InputMode::Normal => return Ok((false, vec![])),
            }
            Ok((true, vec![]))
        }
        Event::OpenDetail => {
            let Some(model) = state.selected_model() else {
                return Ok((false, vec![]));
            };
            state.detail = Some(model.id);
            Ok((true, vec![]))
        }
        Event::Like => Ok(like(state)),
        Event::Download => Ok(download(state)),
        Event::LoadMore => {
            let actions = load_more(state);
            Ok((!actions.is_empty(), actions))
        }
        Event::Refresh => {
            state.feed.reset_other();
            state.clamp_selection();
            let actions = state
                .feed
                .load_initial_feeds()
                .map(|request| route_fetch(state, request))
                .into_iter()
                .collect();
            Ok((true, actions))
        }
        Event::CloseFocus => Ok((false, vec![Action::CloseFocus])),
        Event::FetchCompleted(outcome) => Ok(apply_outcome(state, outcome.clone())),
        Event::WorkerResponse(response) => Ok(handle_worker_response(state, response)),
        Event::Submit(draft) => {
            tracing::debug!(title = %draft.title, "submitting product");
            state.set_status(format!("Submitting {}…", draft.title.trim()), false);
            Ok((
                true,
                vec![Action::PostToWorker(WorkerMessage::submit(draft.clone()))],
            ))
        }
        Event::DownloadFinished {
            id,
            success,
            message,
        } => {
            let title = state
                .feed
                .find_model(id)
                .map_or_else(|| id.clone(), |m| m.title.clone());
            if *success {
                state.set_status(format!("Downloaded {title}"), false);
            } else {
                tracing::warn!(id = %id, error = %message, "download failed");
                state.set_status(format!("Download of {title} failed: {message}"), true);
            }
            Ok((true, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)]))
        }
        Event::ClearStatus => {
            if state.status.is_none() {
                return Ok((false, vec![]));
            }
            state.status = None;
            state.feed.clear_error();
            Ok((true, vec![]))
        }
    }
}

fn load_more(state: &mut AppState) -> Vec<Action> {
    state
        .load_more()
        .map(|request| route_fetch(state, request))
        .into_iter()
        .collect()
}

/// The model a command applies to: the open detail, else the cursor row.
fn target_model(state: &AppState) -> Option<(String, String)> {
    match state.detail.as_deref() {
        Some(id) => {
            let title = state
                .feed
                .find_model(id)
                .map(|m| m.title.clone())
                .or_else(|| state.record(id).map(|r| r.title.clone()))?;
            Some((id.to_string(), title))
        }
        None => state.selected_model().map(|m| (m.id, m.title)),
    }
}

fn like(state: &mut AppState) -> (bool, Vec<Action>) {
    let Some((id, title)) = target_model(state) else {
        return (false, vec![]);
    };
    let touched = state.feed.record_like(&id);
    if let Some(record) = state.catalog.iter_mut().find(|r| r.id == id) {
        record.likes = record.likes.saturating_add(1);
    }
    tracing::debug!(%id, touched, "model liked");
    state.set_status(format!("Liked {title}"), false);
    (true, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)])
}

fn download(state: &mut AppState) -> (bool, Vec<Action>) {
    let Some((id, title)) = target_model(state) else {
        return (false, vec![]);
    };
    let Some(record) = state.record(&id).filter(|r| !r.model_url.is_empty()) else {
        state.set_status(format!("No model file for {title}"), true);
        return (true, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)]);
    };

    let url = record.model_url.clone();
    let destination = state.download_destination(record);

    let touched = state.feed.record_download(&id);
    if let Some(record) = state.catalog.iter_mut().find(|r| r.id == id) {
        record.downloads = record.downloads.saturating_add(1);
    }
    tracing::debug!(%id, touched, %destination, "downloading model");
    state.set_status(format!("Downloading {title} to {destination}…"), false);
    (true, vec![Action::DownloadModel { id, url, destination }])
}

/// Merges a fetch outcome and chains the follow-up requests.
///
/// A freshly applied catalog is handed to the worker for indexing and, if
/// `other` is still empty, its first page is requested right behind it. The
/// worker handles messages in order, so the page is cut from the new index.
fn apply_outcome(state: &mut AppState, outcome: FetchOutcome) -> (bool, Vec<Action>) {
    let products = match &outcome {
        FetchOutcome::Catalog {
            result: Ok(products),
            ..
        } => Some(products.clone()),
        _ => None,
    };

    match state.feed.complete(outcome) {
        Completion::Applied => {
            let mut actions = vec![];
            if let Some(products) = products {
                if state.online {
                    actions.push(Action::PostToWorker(WorkerMessage::index_catalog(
                        products.clone(),
                    )));
                }
                state.catalog = products;
                if state.feed.other().page == 0 {
                    if let Some(request) = state.feed.load_more_other() {
                        actions.push(route_fetch(state, request));
                    }
                }
            }
            state.clamp_selection();
            (true, actions)
        }
        Completion::Failed(message) => {
            state.set_status(message, true);
            (true, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)])
        }
        Completion::Stale => (false, vec![]),
    }
}

fn handle_worker_response(state: &mut AppState, response: &WorkerResponse) -> (bool, Vec<Action>) {
    match response {
        WorkerResponse::CatalogIndexed { count } => {
            tracing::debug!(count, "worker indexed catalog");
            (false, vec![])
        }
        WorkerResponse::Fetched { outcome } => apply_outcome(state, outcome.clone()),
        WorkerResponse::Submitted { response } => {
            match (&response.model, response.success) {
                (Some(model), true) => {
                    state.set_status(format!("Submitted {} for review", model.title), false);
                    state.catalog.push(model.clone());
                }
                _ => {
                    let message = response.message.as_deref().unwrap_or("Submission failed");
                    state.set_status(message, true);
                }
            }
            (true, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)])
        }
        WorkerResponse::Error { message } => {
            tracing::warn!(error = %message, "worker reported error");
            state.set_status(message.clone(), true);
            (true, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::modes::Section;
    use crate::domain::{Model, ModelStatus, ProductRecord};
    use crate::feed::{FeedSettings, Page, Ticket};
    use crate::ui::theme::Theme;

    fn state(online: bool) -> AppState {
        let mut state = AppState::new(FeedSettings::default(), Theme::default());
        state.online = online;
        state
    }

    fn record(id: &str, url: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            title: format!("Model {id}"),
            status: ModelStatus::Published,
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
            model_url: url.to_string(),
            ..ProductRecord::default()
        }
    }

    fn catalog_ticket(actions: &[Action]) -> Ticket {
        match actions {
            [Action::RequestCatalog(request)] => request.ticket(),
            other => panic!("expected a catalog request, got {other:?}"),
        }
    }

    #[test]
    fn online_catalog_is_indexed_before_first_other_page() {
        let mut state = state(true);
        let (_, actions) = handle_event(&mut state, &Event::Start).unwrap();
        let ticket = catalog_ticket(&actions);

        let outcome = FetchOutcome::Catalog {
            ticket,
            result: Ok(vec![record("1", "")]),
        };
        let (render, actions) =
            handle_event(&mut state, &Event::FetchCompleted(outcome)).unwrap();
        assert!(render);
        assert_eq!(state.feed.recent().len(), 1);
        match actions.as_slice() {
            [Action::PostToWorker(WorkerMessage::IndexCatalog { products, .. }), Action::PostToWorker(WorkerMessage::Fetch {
                request: FetchRequest::OtherPage { page: 1, .. },
                ..
            })] => assert_eq!(products.len(), 1),
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn offline_catalog_goes_to_worker() {
        let mut state = state(false);
        let (_, actions) = handle_event(&mut state, &Event::Start).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::Fetch {
                request: FetchRequest::Catalog { .. },
                ..
            })]
        ));
    }

    #[test]
    fn failed_catalog_sets_error_status() {
        let mut state = state(true);
        let (_, actions) = handle_event(&mut state, &Event::Start).unwrap();
        let ticket = catalog_ticket(&actions);
        let outcome = FetchOutcome::Catalog {
            ticket,
            result: Err("Catalog error: HTTP 502".to_string()),
        };
        let (_, actions) = handle_event(&mut state, &Event::FetchCompleted(outcome)).unwrap();
        assert_eq!(actions, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)]);
        assert!(state.status.as_ref().is_some_and(|s| s.is_error));
        assert!(!state.feed.is_loading());

        handle_event(&mut state, &Event::ClearStatus).unwrap();
        assert!(state.status.is_none());
        assert!(state.feed.last_error().is_none());
    }

    #[test]
    fn failed_worker_fetch_clears_loading_and_allows_retry() {
        let mut state = state(false);
        let (_, actions) = handle_event(&mut state, &Event::Start).unwrap();
        let [Action::PostToWorker(WorkerMessage::Fetch { request, .. })] = actions.as_slice() else {
            panic!("expected a worker fetch, got {actions:?}");
        };
        let failed = WorkerResponse::Fetched {
            outcome: request
                .clone()
                .fail("Failed to initialize storage: failed to parse JSON"),
        };
        handle_event(&mut state, &Event::WorkerResponse(failed)).unwrap();
        assert!(!state.feed.is_loading());
        assert!(state.status.as_ref().is_some_and(|s| s.is_error));

        let (_, actions) = handle_event(&mut state, &Event::Refresh).unwrap();
        let [Action::PostToWorker(WorkerMessage::Fetch {
            request: FetchRequest::Catalog { .. },
            ..
        })] = actions.as_slice()
        else {
            panic!("refresh did not retry the catalog: {actions:?}");
        };

        state.section = Section::Other;
        let Some(request) = state.feed.load_more_other() else {
            panic!("other page not requested");
        };
        let failed = WorkerResponse::Fetched {
            outcome: request.fail("Worker communication error: Storage not initialized"),
        };
        handle_event(&mut state, &Event::WorkerResponse(failed)).unwrap();
        assert!(!state.feed.other().loading);

        let (_, actions) = handle_event(&mut state, &Event::LoadMore).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::Fetch {
                request: FetchRequest::OtherPage { page: 1, .. },
                ..
            })]
        ));
    }

    #[test]
    fn failed_search_page_is_retried_by_load_more() {
        let mut state = state(true);
        handle_event(&mut state, &Event::SearchMode).unwrap();
        for c in "skull".chars() {
            handle_event(&mut state, &Event::Char(c)).unwrap();
        }
        let (_, actions) = handle_event(&mut state, &Event::SubmitSearch).unwrap();
        let [Action::PostToWorker(WorkerMessage::Fetch { request, .. })] = actions.as_slice() else {
            panic!("expected a search fetch, got {actions:?}");
        };
        let failed = WorkerResponse::Fetched {
            outcome: request.clone().fail("index unavailable"),
        };
        handle_event(&mut state, &Event::WorkerResponse(failed)).unwrap();
        assert!(!state.feed.search().loading);
        assert!(state.feed.is_searching());

        let (_, actions) = handle_event(&mut state, &Event::LoadMore).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::Fetch {
                request: FetchRequest::SearchPage { page: 1, .. },
                ..
            })]
        ));
    }

    #[test]
    fn blank_submit_leaves_search_mode_untouched() {
        let mut state = state(true);
        handle_event(&mut state, &Event::SearchMode).unwrap();
        handle_event(&mut state, &Event::Char(' ')).unwrap();
        let (_, actions) = handle_event(&mut state, &Event::SubmitSearch).unwrap();
        assert!(actions.is_empty());
        assert!(!state.feed.is_searching());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn search_flow_posts_page_and_escape_clears_it() {
        let mut state = state(true);
        handle_event(&mut state, &Event::SearchMode).unwrap();
        for c in "femur".chars() {
            handle_event(&mut state, &Event::Char(c)).unwrap();
        }
        let (_, actions) = handle_event(&mut state, &Event::SubmitSearch).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::Fetch {
                request: FetchRequest::SearchPage { page: 1, .. },
                ..
            })]
        ));
        assert_eq!(state.input_mode, InputMode::Search(SearchFocus::Navigating));
        assert_eq!(state.feed.query(), "femur");

        handle_event(&mut state, &Event::Escape).unwrap();
        assert!(!state.feed.is_searching());
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.draft_query.is_empty());
    }

    #[test]
    fn scrolling_into_the_tail_loads_more() {
        let mut state = state(true);
        state.section = Section::Other;
        let Some(request) = state.feed.load_more_other() else {
            panic!("other page not requested");
        };
        let models = (0..8).map(|i| Model::new(i.to_string(), "m", "a")).collect();
        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::Fetched {
                outcome: FetchOutcome::OtherPage {
                    ticket: request.ticket(),
                    result: Ok(Page {
                        models,
                        exhausted: false,
                    }),
                },
            }),
        )
        .unwrap();

        state.selected_index = 4;
        let (_, actions) = handle_event(&mut state, &Event::KeyDown).unwrap();
        assert!(actions.is_empty());
        let (_, actions) = handle_event(&mut state, &Event::KeyDown).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::Fetch {
                request: FetchRequest::OtherPage { page: 2, .. },
                ..
            })]
        ));
        // Re-entrant trigger while the batch is in flight.
        let (_, actions) = handle_event(&mut state, &Event::KeyDown).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn download_without_model_file_reports_error() {
        let mut state = state(true);
        state.catalog = vec![record("7", "")];
        state.feed.set_other_models(vec![Model::new("7", "Model 7", "a")]);
        state.section = Section::Other;

        let (_, actions) = handle_event(&mut state, &Event::Download).unwrap();
        assert_eq!(actions, vec![Action::ScheduleStatusClear(STATUS_CLEAR_SECS)]);
        assert!(state.status.as_ref().is_some_and(|s| s.is_error));
        assert_eq!(state.feed.other().items[0].downloads, 0);
    }

    #[test]
    fn download_records_and_emits_command() {
        let mut state = state(true);
        state.catalog = vec![record("7", "https://cdn.example.org/skull.stl")];
        state.feed.set_other_models(vec![Model::new("7", "Model 7", "a")]);
        state.section = Section::Other;

        let (_, actions) = handle_event(&mut state, &Event::Download).unwrap();
        assert_eq!(
            actions,
            vec![Action::DownloadModel {
                id: "7".to_string(),
                url: "https://cdn.example.org/skull.stl".to_string(),
                destination: "Downloads/medshelf/skull.stl".to_string(),
            }]
        );
        assert_eq!(state.feed.other().items[0].downloads, 1);
        assert_eq!(state.catalog[0].downloads, 1);
    }

    #[test]
    fn like_applies_to_open_detail() {
        let mut state = state(true);
        state.feed.set_other_models(vec![Model::new("3", "Heart", "a")]);
        state.section = Section::Other;
        handle_event(&mut state, &Event::OpenDetail).unwrap();
        assert_eq!(state.detail.as_deref(), Some("3"));

        handle_event(&mut state, &Event::Like).unwrap();
        assert_eq!(state.feed.other().items[0].likes, 1);

        handle_event(&mut state, &Event::Escape).unwrap();
        assert!(state.detail.is_none());
    }

    #[test]
    fn accepted_submission_joins_uploads() {
        let mut state = state(true);
        state.username = Some("ana".to_string());
        let model = ProductRecord {
            id: "new".to_string(),
            title: "Aorta".to_string(),
            username: "ana".to_string(),
            ..ProductRecord::default()
        };
        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::Submitted {
                response: crate::catalog::CreateResponse::created(model),
            }),
        )
        .unwrap();
        assert_eq!(state.uploads().verification.len(), 1);
        assert!(state.status.as_ref().is_some_and(|s| !s.is_error));
    }
}
