//! Medshelf: a Zellij plugin for browsing a 3D medical model catalog.
//!
//! The plugin shows the newest and most popular published models, an
//! infinitely scrolling list of everything else, fuzzy search across the
//! catalog and, for a configured user, their own uploads by review status.
//! Models can be liked, downloaded and submitted from the terminal.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Zellij Plugin Shim (main.rs)                       │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Events → Actions
//! │  Feed Store (feed/)                                 │  ← Paging state machine
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Worker Layer  │   │ Catalog       │
//! │ (ui/)         │   │ (worker/)     │   │ (catalog/)    │
//! │ - Rendering   │   │ - Search index│   │ - Wire format │
//! │ - Theming     │   │ - Cache I/O   │   │ - Submissions │
//! │ - Components  │   │ - Uploads     │   │ - Profiles    │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────┐
//! │  Storage (storage/), Search (search/), Domain,      │
//! │  Infrastructure (paths), Observability (tracing)    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The [`feed::FeedStore`] is sans-IO: operations hand back
//! [`feed::FetchRequest`]s and the runtime feeds the matching
//! [`feed::FetchOutcome`]s back in. Catalog reloads are fetched over HTTP
//! when a `catalog_url` is configured. Everything else (`other` pages,
//! search pages, offline catalog reloads, submissions) is served by the
//! worker from its cached catalog and index.
//!
//! # Configuration
//!
//! ```kdl
//! pane {
//!     plugin location="file:/path/to/medshelf.wasm" {
//!         catalog_url "https://models.example.org"
//!         username "ana"
//!         page_cap "5"
//!         batch_size "8"
//!         feed_size "8"
//!         download_dir "~/Downloads/medshelf"
//!         theme "catppuccin-mocha"
//!         trace_level "info"
//!     }
//! }
//! ```
//!
//! # Submitting a model
//!
//! ```sh
//! zellij pipe --name medshelf-submit -- \
//!   '{"title":"Left Femur","modelFile":"~/scans/femur.stl","tags":"bone, leg"}'
//! ```

pub mod app;
pub mod catalog;
pub mod domain;
pub mod feed;
pub mod infrastructure;
pub mod observability;
pub mod search;
pub mod storage;
pub mod ui;
pub mod worker;

pub use app::{handle_event, Action, AppState, Event, InputMode, SearchFocus, Section};
pub use domain::{MedshelfError, Model, ProductRecord, Result};
pub use feed::{FeedSettings, FeedStore};
pub use ui::Theme;

use std::collections::BTreeMap;

/// Name of the pipe that accepts product drafts.
pub const SUBMIT_PIPE_NAME: &str = "medshelf-submit";

/// Plugin configuration parsed from Zellij's configuration system.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Base URL of the catalog service. Without it the plugin runs offline
    /// from the cached catalog.
    pub catalog_url: Option<String>,

    /// User whose uploads are listed in the uploads section.
    pub username: Option<String>,

    pub feed: FeedSettings,

    /// Host directory for downloaded model files.
    pub download_dir: Option<String>,

    /// Built-in theme name. Ignored if `theme_file` is set.
    pub theme_name: Option<String>,

    /// Path to a custom TOML theme file.
    pub theme_file: Option<String>,

    /// `EnvFilter` directive, e.g. `"debug"` or `"medshelf=trace"`.
    pub trace_level: Option<String>,
}

impl Config {
    /// Parses configuration from Zellij's configuration map.
    ///
    /// Blank values count as missing. Numbers that do not parse, and zero
    /// caps or sizes, fall back to the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use medshelf::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("catalog_url".to_string(), "https://models.example.org/".to_string());
    /// map.insert("page_cap".to_string(), "3".to_string());
    /// map.insert("batch_size".to_string(), "lots".to_string());
    ///
    /// let config = Config::from_zellij(&map);
    /// assert_eq!(config.catalog_url.as_deref(), Some("https://models.example.org/"));
    /// assert_eq!(config.feed.page_cap, 3);
    /// assert_eq!(config.feed.batch_size, 8);
    /// ```
    #[must_use]
    pub fn from_zellij(config: &BTreeMap<String, String>) -> Self {
        let text = |key: &str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        let defaults = FeedSettings::default();

        Self {
            catalog_url: text("catalog_url"),
            username: text("username"),
            feed: FeedSettings {
                page_cap: positive(config, "page_cap").unwrap_or(defaults.page_cap),
                batch_size: positive(config, "batch_size").unwrap_or(defaults.batch_size),
                feed_size: positive(config, "feed_size").unwrap_or(defaults.feed_size),
            },
            download_dir: text("download_dir"),
            theme_name: text("theme"),
            theme_file: text("theme_file"),
            trace_level: text("trace_level"),
        }
    }

    /// Resolves the theme: file first, then built-in name, then the default.
    #[must_use]
    pub fn theme(&self) -> Theme {
        if let Some(theme_file) = &self.theme_file {
            match Theme::from_file(theme_file) {
                Ok(theme) => return theme,
                Err(e) => {
                    tracing::debug!(theme_file = %theme_file, error = %e, "failed to load theme from file, using default");
                }
            }
        }
        self.theme_name.as_ref().map_or_else(Theme::default, |theme_name| {
            Theme::from_name(theme_name).unwrap_or_else(|| {
                tracing::debug!(theme_name = %theme_name, "unknown theme, using default");
                Theme::default()
            })
        })
    }
}

fn positive<T: std::str::FromStr + Default + PartialEq>(
    config: &BTreeMap<String, String>,
    key: &str,
) -> Option<T> {
    config
        .get(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v != T::default())
}

/// Builds the initial application state from `config`.
///
/// Nothing is fetched yet. The first catalog load starts with
/// [`Event::Start`] once permissions are granted.
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(online = config.catalog_url.is_some(), "initializing medshelf plugin");

    let mut state = AppState::new(config.feed, config.theme());
    state.online = config.catalog_url.is_some();
    state.username.clone_from(&config.username);
    if let Some(dir) = &config.download_dir {
        state.download_dir.clone_from(dir);
    }
    state
}
