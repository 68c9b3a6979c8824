//! Zellij plugin wrapper and entry point.
//!
//! Thin integration layer between the medshelf library and the Zellij
//! plugin system. It implements `ZellijPlugin` and registers the worker,
//! turns Zellij events into library events and carries out the returned
//! actions with Zellij's host commands.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │   Zellij Main Thread    │
//! │  ┌──────────────────┐   │
//! │  │  State (plugin)  │   │  ← UI state, feed store, HTTP
//! │  └──────────────────┘   │
//! │          │              │
//! │          │ IPC          │
//! │          ▼              │
//! │  ┌──────────────────┐   │
//! │  │  MedshelfWorker  │   │  ← Catalog cache, search index
//! │  │ (worker thread)  │   │  ← Pages, submissions
//! │  └──────────────────┘   │
//! └─────────────────────────┘
//! ```
//!
//! # Plugin Lifecycle
//!
//! 1. **Load**: Parse config, initialize tracing, create `AppState`
//! 2. **Permissions**: Once granted, `Event::Start` loads the catalog
//! 3. **Update**: Translate events, delegate to `handle_event`, run actions
//! 4. **Render**: Call the library render function
//!
//! # Host Commands
//!
//! - Catalog reloads use `web_request`, tagged with the fetch ticket
//! - Downloads run `curl` through `run_command`, tagged with the model id
//! - Status messages are cleared with `set_timeout`
//!
//! # Keybindings
//!
//! In normal mode:
//! - `j`/`Down`, `k`/`Up`: Move
//! - `Tab`/`Shift+Tab`: Next/previous section
//! - `Enter`: Open details
//! - `l`: Like, `d`: Download
//! - `m`: Load more, `r`: Refresh
//! - `/`: Search, `Esc`: Close details
//! - `q`: Close plugin
//!
//! In search mode, typing goes to the query. `Enter` runs it, `Esc` leaves
//! search, and `/` returns from the results to the query.

#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeMap;
use zellij_tile::prelude::*;
use zellij_tile::shim::post_message_to;

use medshelf::catalog::{endpoint, parse_list_response, ProductDraft, LIST_PATH};
use medshelf::feed::FetchRequest;
use medshelf::worker::{MedshelfWorker, WorkerMessage, WorkerResponse};
use medshelf::{handle_event, Action, Config, Event, InputMode, SearchFocus, SUBMIT_PIPE_NAME};

register_plugin!(State);
register_worker!(MedshelfWorker, medshelf_worker, MEDSHELF_WORKER);

/// Context key carrying the fetch ticket of a catalog request.
const TICKET_KEY: &str = "ticket";
/// Context key carrying the model id of a download command.
const DOWNLOAD_KEY: &str = "download";

/// Plugin state wrapper.
///
/// Wraps the library's `AppState` with Zellij-specific concerns like worker
/// communication and the catalog endpoint.
struct State {
    app: medshelf::AppState,

    /// Worker thread identifier for IPC messaging.
    worker_name: String,

    /// Catalog service base URL, if online.
    catalog_url: Option<String>,

    /// Fills in drafts that arrive without an author.
    username: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        let default_config = Config::default();
        Self {
            app: medshelf::initialize(&default_config),
            worker_name: "medshelf".to_string(),
            catalog_url: None,
            username: None,
        }
    }
}

impl ZellijPlugin for State {
    /// Parses configuration, initializes tracing and state, then requests
    /// permissions and subscribes to events.
    ///
    /// # Permissions
    ///
    /// - `ReadApplicationState`, `ChangeApplicationState`: Hide the pane
    /// - `RunCommands`: Download model files with `curl`
    /// - `WebAccess`: Fetch the live catalog
    /// - `FullHdAccess`: Read files referenced by submissions
    /// - `ReadCliPipes`: Receive submissions over `zellij pipe`
    fn load(&mut self, configuration: BTreeMap<String, String>) {
        let config = Config::from_zellij(&configuration);
        medshelf::observability::init_tracing(&config);

        let span = tracing::debug_span!("plugin_load");
        let _guard = span.entered();

        tracing::debug!(
            catalog_url = ?config.catalog_url,
            username = ?config.username,
            settings = ?config.feed,
            "parsed configuration"
        );
        self.app = medshelf::initialize(&config);
        self.catalog_url.clone_from(&config.catalog_url);
        self.username.clone_from(&config.username);

        request_permission(&[
            PermissionType::ReadApplicationState,
            PermissionType::ChangeApplicationState,
            PermissionType::RunCommands,
            PermissionType::WebAccess,
            PermissionType::FullHdAccess,
            PermissionType::ReadCliPipes,
        ]);

        subscribe(&[
            EventType::Key,
            EventType::CustomMessage,
            EventType::WebRequestResult,
            EventType::RunCommandResult,
            EventType::Timer,
            EventType::PermissionRequestResult,
        ]);

        tracing::debug!("plugin load complete - waiting for permissions");
    }

    /// Translates a Zellij event, delegates to `handle_event` and executes
    /// the resulting actions. Returns `true` if the UI should re-render.
    fn update(&mut self, event: zellij_tile::prelude::Event) -> bool {
        let event_name = Self::get_event_name(&event);
        let span = tracing::debug_span!("plugin_update_event", event_type = %event_name);
        let _guard = span.entered();

        let our_event = match event {
            zellij_tile::prelude::Event::Key(ref key) => match self.map_key_event(key) {
                Some(event) => event,
                None => return false,
            },
            zellij_tile::prelude::Event::CustomMessage(message, payload) => {
                match self.map_custom_message_event(&message, &payload) {
                    Some(event) => event,
                    None => return false,
                }
            }
            zellij_tile::prelude::Event::WebRequestResult(status, _headers, body, context) => {
                match Self::map_web_request_event(status, &body, &context) {
                    Some(event) => event,
                    None => return false,
                }
            }
            zellij_tile::prelude::Event::RunCommandResult(exit_code, _stdout, stderr, context) => {
                match Self::map_command_result_event(exit_code, &stderr, &context) {
                    Some(event) => event,
                    None => return false,
                }
            }
            zellij_tile::prelude::Event::Timer(_) => Event::ClearStatus,
            zellij_tile::prelude::Event::PermissionRequestResult(permissions) => {
                match permissions {
                    PermissionStatus::Granted => {
                        tracing::debug!("permissions granted - loading catalog");
                        Event::Start
                    }
                    PermissionStatus::Denied => {
                        tracing::warn!("permissions denied - plugin functionality limited");
                        return false;
                    }
                }
            }
            _ => return false,
        };

        self.dispatch(&our_event)
    }

    /// Accepts product drafts piped in with `zellij pipe --name medshelf-submit`.
    fn pipe(&mut self, pipe_message: PipeMessage) -> bool {
        if pipe_message.name != SUBMIT_PIPE_NAME {
            return false;
        }
        if let PipeSource::Cli(pipe_id) = &pipe_message.source {
            unblock_cli_pipe_input(pipe_id);
        }

        let Some(payload) = pipe_message.payload else {
            tracing::debug!("submission pipe carried no payload");
            return false;
        };
        match serde_json::from_str::<ProductDraft>(&payload) {
            Ok(mut draft) => {
                if draft.username.is_none() {
                    draft.username.clone_from(&self.username);
                }
                if draft.author.is_none() {
                    draft.author.clone_from(&self.username);
                }
                self.dispatch(&Event::Submit(draft))
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to parse product draft");
                self.app.set_status(format!("Unreadable submission: {e}"), true);
                self.execute_action(&Action::ScheduleStatusClear(medshelf::app::STATUS_CLEAR_SECS));
                true
            }
        }
    }

    fn render(&mut self, rows: usize, cols: usize) {
        medshelf::ui::render(&self.app, rows, cols);
    }
}

impl State {
    /// Runs `event` through the library and executes the returned actions.
    fn dispatch(&mut self, event: &Event) -> bool {
        match handle_event(&mut self.app, event) {
            Ok((should_render, actions)) => {
                tracing::debug!(
                    action_count = actions.len(),
                    should_render = should_render,
                    "event handled successfully"
                );
                for a in actions {
                    self.execute_action(&a);
                }
                should_render
            }
            Err(e) => {
                tracing::debug!(error = %e, "error handling event");
                false
            }
        }
    }

    /// Gets a string name for a Zellij event for logging purposes.
    fn get_event_name(event: &zellij_tile::prelude::Event) -> String {
        match event {
            zellij_tile::prelude::Event::Key(key) => format!("Key({:?})", key.bare_key),
            zellij_tile::prelude::Event::CustomMessage(msg, _) => format!("CustomMessage({msg})"),
            zellij_tile::prelude::Event::WebRequestResult(status, ..) => {
                format!("WebRequestResult({status})")
            }
            zellij_tile::prelude::Event::RunCommandResult(..) => "RunCommandResult".to_string(),
            zellij_tile::prelude::Event::Timer(..) => "Timer".to_string(),
            zellij_tile::prelude::Event::PermissionRequestResult(..) => {
                "PermissionRequestResult".to_string()
            }
            _ => "Other".to_string(),
        }
    }

    /// Maps keyboard events to application events.
    fn map_key_event(&self, key: &KeyWithModifier) -> Option<Event> {
        tracing::trace!(bare_key = ?key.bare_key, "key event");

        if key.bare_key == BareKey::Char('n') && key.has_modifiers(&[KeyModifier::Ctrl]) {
            return Some(Event::KeyDown);
        }
        if key.bare_key == BareKey::Char('p') && key.has_modifiers(&[KeyModifier::Ctrl]) {
            return Some(Event::KeyUp);
        }

        let typing = self.app.input_mode == InputMode::Search(SearchFocus::Typing);
        if typing {
            return Some(match key.bare_key {
                BareKey::Enter => Event::SubmitSearch,
                BareKey::Esc => Event::Escape,
                BareKey::Backspace => Event::Backspace,
                BareKey::Down => Event::KeyDown,
                BareKey::Up => Event::KeyUp,
                BareKey::Char(c) => Event::Char(c),
                _ => return None,
            });
        }

        Some(match key.bare_key {
            BareKey::Down | BareKey::Char('j') => Event::KeyDown,
            BareKey::Up | BareKey::Char('k') => Event::KeyUp,
            BareKey::Tab if key.has_modifiers(&[KeyModifier::Shift]) => Event::PrevSection,
            BareKey::Tab => Event::NextSection,
            BareKey::Esc => Event::Escape,
            BareKey::Enter => Event::OpenDetail,
            BareKey::Char('/') => match self.app.input_mode {
                InputMode::Normal => Event::SearchMode,
                InputMode::Search(_) => Event::FocusSearchBar,
            },
            BareKey::Char('l') => Event::Like,
            BareKey::Char('d') => Event::Download,
            BareKey::Char('m') => Event::LoadMore,
            BareKey::Char('r') => Event::Refresh,
            BareKey::Char('q') => Event::CloseFocus,
            _ => return None,
        })
    }

    /// Maps worker messages to application events.
    fn map_custom_message_event(&self, message: &str, payload: &str) -> Option<Event> {
        tracing::debug!(message_name = %message, payload_len = payload.len(), "custom message event");

        if message != self.worker_name {
            tracing::debug!(message_name = %message, "ignoring custom message with unknown name");
            return None;
        }
        match serde_json::from_str::<WorkerResponse>(payload) {
            Ok(response) => Some(Event::WorkerResponse(response)),
            Err(e) => {
                tracing::debug!(error = %e, "failed to deserialize worker response");
                None
            }
        }
    }

    /// Maps a finished catalog request to a fetch outcome.
    fn map_web_request_event(
        status: u16,
        body: &[u8],
        context: &BTreeMap<String, String>,
    ) -> Option<Event> {
        let Some(ticket) = context
            .get(TICKET_KEY)
            .and_then(|t| t.parse::<u64>().ok())
            .map(medshelf::feed::Ticket)
        else {
            tracing::debug!("web request result without a ticket");
            return None;
        };
        tracing::debug!(status, %ticket, body_len = body.len(), "catalog response");

        let result = parse_list_response(status, body).map_err(|e| e.to_string());
        Some(Event::FetchCompleted(
            FetchRequest::Catalog { ticket }.resolve_catalog(result),
        ))
    }

    /// Maps a finished download command to an application event.
    fn map_command_result_event(
        exit_code: Option<i32>,
        stderr: &[u8],
        context: &BTreeMap<String, String>,
    ) -> Option<Event> {
        let id = context.get(DOWNLOAD_KEY)?.clone();
        tracing::debug!(exit_code = ?exit_code, model_id = %id, "download finished");

        let success = exit_code == Some(0);
        let message = if success {
            String::new()
        } else {
            String::from_utf8_lossy(stderr).trim().to_string()
        };
        Some(Event::DownloadFinished {
            id,
            success,
            message,
        })
    }

    /// Serializes `message` as JSON and posts it to the worker.
    fn post_worker_message(&self, message: &WorkerMessage) {
        match serde_json::to_string(&message) {
            Ok(payload) => {
                tracing::debug!(kind = message.kind(), payload_len = payload.len(), "posting message to worker");
                post_message_to(PluginMessage {
                    worker_name: Some(self.worker_name.clone()),
                    name: self.worker_name.clone(),
                    payload,
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to serialize worker message");
            }
        }
    }

    /// Translates a library action to Zellij API calls.
    #[tracing::instrument(level = "debug", skip(self))]
    fn execute_action(&self, action: &Action) {
        match action {
            Action::CloseFocus => hide_self(),
            Action::RequestCatalog(request) => {
                let Some(base_url) = &self.catalog_url else {
                    tracing::debug!("catalog request without a catalog url");
                    return;
                };
                let mut context = BTreeMap::new();
                context.insert(TICKET_KEY.to_string(), request.ticket().0.to_string());
                let mut headers = BTreeMap::new();
                headers.insert("Accept".to_string(), "application/json".to_string());
                web_request(endpoint(base_url, LIST_PATH), HttpVerb::Get, headers, vec![], context);
            }
            Action::PostToWorker(message) => self.post_worker_message(message),
            Action::DownloadModel {
                id,
                url,
                destination,
            } => {
                let mut context = BTreeMap::new();
                context.insert(DOWNLOAD_KEY.to_string(), id.clone());
                run_command(
                    &["curl", "-fsSL", "--create-dirs", "-o", destination.as_str(), url.as_str()],
                    context,
                );
            }
            Action::ScheduleStatusClear(seconds) => set_timeout(*seconds),
        }
    }
}
