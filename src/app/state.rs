//! Application state and view model computation.
//!
//! [`AppState`] wraps the [`FeedStore`] with everything the terminal browser
//! adds on top: the active section, the cursor, the draft query being typed,
//! the detail overlay and a transient status line. The store stays the single
//! owner of model collections. Lists shown on screen are borrowed from it.

use std::borrow::Cow;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::modes::{InputMode, SearchFocus, Section};
use crate::catalog::ProfileModels;
use crate::domain::{Model, ProductRecord};
use crate::feed::{FeedSettings, FeedStore, FetchRequest, PagedCollection};
use crate::infrastructure::paths;
use crate::ui::helpers;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{
    DetailInfo, DisplayItem, EmptyState, FooterInfo, HeaderInfo, SearchBarInfo, StatusInfo,
    TabInfo, UIViewModel,
};

/// Rows from the end of a paged list at which the next batch is requested.
pub const LOAD_AHEAD: usize = 2;

/// Seconds a status message stays on screen.
pub const STATUS_CLEAR_SECS: f64 = 5.0;

const DEFAULT_DOWNLOAD_DIR: &str = "~/Downloads/medshelf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub feed: FeedStore,

    /// Last catalog received, in source order. Backs the uploads section and
    /// the detail overlay.
    pub catalog: Vec<ProductRecord>,

    pub section: Section,
    pub selected_index: usize,
    pub input_mode: InputMode,

    /// Query text being edited. Becomes the store's query on submit.
    pub draft_query: String,

    /// Id of the model shown in the detail overlay.
    pub detail: Option<String>,
    pub status: Option<StatusLine>,
    pub theme: Theme,

    /// Owner of the uploads section.
    pub username: Option<String>,

    /// Whether catalog reloads go to the network or to the local cache.
    pub online: bool,

    /// Host directory receiving downloaded model files.
    pub download_dir: String,
}

impl AppState {
    #[must_use]
    pub fn new(settings: FeedSettings, theme: Theme) -> Self {
        Self {
            feed: FeedStore::new(settings),
            catalog: Vec::new(),
            section: Section::Recent,
            selected_index: 0,
            input_mode: InputMode::Normal,
            draft_query: String::new(),
            detail: None,
            status: None,
            theme,
            username: None,
            online: false,
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
        }
    }

    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        Section::available(self.username.is_some())
    }

    /// Moves to the next or previous tab, wrapping around.
    pub fn cycle_section(&mut self, forward: bool) {
        let sections = self.sections();
        let current = sections.iter().position(|s| *s == self.section).unwrap_or(0);
        let next = if forward {
            (current + 1) % sections.len()
        } else {
            (current + sections.len() - 1) % sections.len()
        };
        self.section = sections[next];
        self.selected_index = 0;
        self.detail = None;
    }

    /// The configured user's uploads. Empty without a username.
    #[must_use]
    pub fn uploads(&self) -> ProfileModels {
        self.username.as_deref().map_or_else(ProfileModels::default, |user| {
            ProfileModels::for_user(&self.catalog, user, true)
        })
    }

    /// The list the cursor moves over: search results while searching,
    /// otherwise the active section.
    #[must_use]
    pub fn current_models(&self) -> Cow<'_, [Model]> {
        if self.feed.is_searching() {
            return Cow::Borrowed(&self.feed.search().items);
        }
        match self.section {
            Section::Recent => Cow::Borrowed(self.feed.recent()),
            Section::Popular => Cow::Borrowed(self.feed.popular()),
            Section::Other => Cow::Borrowed(&self.feed.other().items),
            Section::Uploads => Cow::Owned(self.uploads().iter().map(Model::from).collect()),
        }
    }

    /// The paged collection behind the current list, if it is one.
    #[must_use]
    pub fn current_collection(&self) -> Option<&PagedCollection> {
        if self.feed.is_searching() {
            Some(self.feed.search())
        } else if self.section.is_paged() {
            Some(self.feed.other())
        } else {
            None
        }
    }

    #[must_use]
    pub fn selected_model(&self) -> Option<Model> {
        self.current_models().get(self.selected_index).cloned()
    }

    #[must_use]
    pub fn record(&self, id: &str) -> Option<&ProductRecord> {
        self.catalog.iter().find(|r| r.id == id)
    }

    /// Moves the cursor down. Paged lists stop at the last row so the next
    /// batch can land below it. Other lists wrap.
    pub fn move_selection_down(&mut self) {
        let len = self.current_models().len();
        if len == 0 {
            return;
        }
        if self.current_collection().is_some() {
            self.selected_index = (self.selected_index + 1).min(len - 1);
        } else {
            self.selected_index = (self.selected_index + 1) % len;
        }
    }

    pub fn move_selection_up(&mut self) {
        let len = self.current_models().len();
        if len == 0 {
            return;
        }
        self.selected_index = if self.selected_index == 0 {
            if self.current_collection().is_some() { 0 } else { len - 1 }
        } else {
            self.selected_index - 1
        };
    }

    /// Keeps the cursor inside the current list.
    pub fn clamp_selection(&mut self) {
        let len = self.current_models().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    /// True when the cursor is within [`LOAD_AHEAD`] rows of the end of a
    /// paged list that can still grow.
    #[must_use]
    pub fn near_end(&self) -> bool {
        let Some(collection) = self.current_collection() else {
            return false;
        };
        collection.can_load_more() && self.selected_index + LOAD_AHEAD >= collection.items.len()
    }

    /// Requests the next batch of whichever paged list is on screen.
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        if self.feed.is_searching() {
            self.feed.load_more_search()
        } else if self.section.is_paged() {
            self.feed.load_more_other()
        } else {
            None
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error,
        });
    }

    /// Host-relative file path a model download is written to.
    #[must_use]
    pub fn download_destination(&self, record: &ProductRecord) -> String {
        let url_name = record
            .model_url
            .split(|c: char| c == '?' || c == '#')
            .next()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty() && !name.contains(':'));
        let file_name = url_name.map_or_else(|| format!("{}.stl", record.id), ToString::to_string);
        let dir = self.download_dir.trim_end_matches('/');
        paths::host_relative(&paths::sandbox_path(&format!("{dir}/{file_name}")))
    }

    /// Computes the view model for a `rows` x `cols` pane.
    ///
    /// The list is windowed around the cursor, keeping it centered until
    /// either end of the list is reached.
    #[must_use]
    pub fn compute_viewmodel(&self, rows: usize, cols: usize) -> UIViewModel {
        let models = self.current_models();
        let available_rows = self.calculate_available_rows(rows);

        let mut visible_start = self.selected_index.saturating_sub(available_rows / 2);
        let visible_end = (visible_start + available_rows).min(models.len());
        if visible_end.saturating_sub(visible_start) < available_rows && models.len() >= available_rows {
            visible_start = visible_end.saturating_sub(available_rows);
        }
        let visible_start = visible_start.min(visible_end);

        let matcher = self.feed.is_searching().then(SkimMatcherV2::default);
        let display_items = models[visible_start..visible_end]
            .iter()
            .enumerate()
            .map(|(relative_idx, model)| {
                self.compute_display_item(model, visible_start + relative_idx, cols, matcher.as_ref())
            })
            .collect();

        UIViewModel {
            header: self.compute_header(),
            search_bar: self.compute_search_bar(),
            display_items,
            selected_index: self.selected_index.saturating_sub(visible_start),
            list_note: self.compute_list_note(models.is_empty()),
            empty_state: models.is_empty().then(|| self.compute_empty_state()),
            detail: self.compute_detail(),
            footer: self.compute_footer(),
        }
    }

    fn compute_display_item(
        &self,
        model: &Model,
        absolute_idx: usize,
        cols: usize,
        matcher: Option<&SkimMatcherV2>,
    ) -> DisplayItem {
        let title_width = helpers::title_column_width(cols);
        let title = truncate(&model.title, title_width);

        let badge = if self.section == Section::Uploads && !self.feed.is_searching() {
            self.record(&model.id)
                .map(|r| r.status.label().to_string())
                .unwrap_or_default()
        } else {
            model.category.clone().unwrap_or_default()
        };

        let highlight_ranges = matcher.map_or_else(Vec::new, |m| {
            highlight_ranges(&title, self.feed.query(), m)
        });

        DisplayItem {
            title,
            author: truncate(&model.author, 20),
            likes: model.likes,
            downloads: model.downloads,
            badge,
            is_selected: absolute_idx == self.selected_index,
            highlight_ranges,
        }
    }

    fn compute_header(&self) -> HeaderInfo {
        let title = if self.feed.is_searching() {
            format!(
                " Search results for \"{}\" ({}) ",
                self.feed.query(),
                self.feed.search().items.len()
            )
        } else {
            " Medshelf ".to_string()
        };

        let tabs = self
            .sections()
            .into_iter()
            .map(|section| {
                let count = match section {
                    Section::Recent => self.feed.recent().len(),
                    Section::Popular => self.feed.popular().len(),
                    Section::Other => self.feed.other().items.len(),
                    Section::Uploads => self.uploads().total(),
                };
                TabInfo {
                    label: format!("{} ({count})", section.title()),
                    is_active: !self.feed.is_searching() && section == self.section,
                }
            })
            .collect();

        HeaderInfo { title, tabs }
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = if self.detail.is_some() {
            "ESC: close  l: like  d: download  q: quit"
        } else {
            match self.input_mode {
                InputMode::Search(SearchFocus::Typing) => {
                    "ESC: cancel  Enter: search  Type to edit query"
                }
                InputMode::Search(SearchFocus::Navigating) => {
                    "ESC: clear search  /: edit query  j/k: navigate  Enter: open  l: like  d: download"
                }
                InputMode::Normal => {
                    "j/k: navigate  Tab: section  /: search  Enter: open  l: like  d: download  m: more  r: refresh  q: quit"
                }
            }
        };

        let status = self
            .status
            .as_ref()
            .map(|s| StatusInfo {
                text: s.text.clone(),
                is_error: s.is_error,
            })
            .or_else(|| {
                self.feed.is_loading().then(|| StatusInfo {
                    text: "Loading catalog…".to_string(),
                    is_error: false,
                })
            });

        FooterInfo {
            keybindings: keybindings.to_string(),
            status,
        }
    }

    fn compute_search_bar(&self) -> Option<SearchBarInfo> {
        match self.input_mode {
            InputMode::Search(focus) => Some(SearchBarInfo {
                query: self.draft_query.clone(),
                is_typing: focus == SearchFocus::Typing,
            }),
            InputMode::Normal => None,
        }
    }

    fn compute_list_note(&self, is_empty: bool) -> Option<String> {
        let collection = self.current_collection()?;
        if is_empty {
            return None;
        }
        if collection.loading {
            Some("Loading more…".to_string())
        } else if !collection.has_more {
            Some(if self.feed.is_searching() {
                "You've reached the end of search results!".to_string()
            } else {
                "You've reached the end of the models!".to_string()
            })
        } else {
            None
        }
    }

    fn compute_empty_state(&self) -> EmptyState {
        let loading = self.feed.is_loading() || self.current_collection().is_some_and(|c| c.loading);
        if loading {
            return EmptyState {
                message: "Loading models…".to_string(),
                subtitle: String::new(),
            };
        }
        if self.feed.is_searching() {
            return EmptyState {
                message: format!("No results found for \"{}\"", self.feed.query()),
                subtitle: "Try a different search term. ESC: clear search".to_string(),
            };
        }
        match self.section {
            Section::Uploads => EmptyState {
                message: "No uploads yet".to_string(),
                subtitle: format!("Submit a model with `zellij pipe --name {}`", crate::SUBMIT_PIPE_NAME),
            },
            Section::Other if !self.feed.other().has_more => EmptyState {
                message: "You've reached the end of the models!".to_string(),
                subtitle: "r: refresh".to_string(),
            },
            Section::Other => EmptyState {
                message: "No models loaded".to_string(),
                subtitle: "m: load more  r: refresh".to_string(),
            },
            Section::Recent | Section::Popular => EmptyState {
                message: "No published models".to_string(),
                subtitle: "r: refresh".to_string(),
            },
        }
    }

    fn compute_detail(&self) -> Option<DetailInfo> {
        let id = self.detail.as_deref()?;
        let model = self.feed.find_model(id).cloned().or_else(|| {
            self.record(id).map(Model::from)
        })?;
        let record = self.record(id);

        let mut fields = vec![
            ("Author".to_string(), model.author.clone()),
            ("Likes".to_string(), model.likes.to_string()),
            ("Downloads".to_string(), model.downloads.to_string()),
        ];
        if let Some(category) = &model.category {
            fields.push(("Category".to_string(), category.clone()));
        }
        if !model.tags.is_empty() {
            fields.push(("Tags".to_string(), model.tags.join(", ")));
        }
        if let Some(record) = record {
            if !record.license.is_empty() {
                fields.push(("License".to_string(), record.license.clone()));
            }
            fields.push(("Status".to_string(), record.status.label().to_string()));
            let age = record.age();
            if !age.is_empty() {
                fields.push(("Uploaded".to_string(), age));
            }
            if !record.model_url.is_empty() {
                fields.push(("Model URL".to_string(), record.model_url.clone()));
            }
            if let Some(reason) = record.rejection_reason.as_deref().filter(|r| !r.is_empty()) {
                fields.push(("Rejection".to_string(), reason.to_string()));
            }
        }

        Some(DetailInfo {
            title: model.title,
            fields,
            description: record.map(|r| r.description.clone()).unwrap_or_default(),
        })
    }

    /// Rows left for the list after header, tabs, column headers, border,
    /// footer and status (7), plus the search bar (3) when shown.
    const fn calculate_available_rows(&self, total_rows: usize) -> usize {
        match self.input_mode {
            InputMode::Normal => total_rows.saturating_sub(7),
            InputMode::Search(_) => total_rows.saturating_sub(10),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// Coalesces the matcher's character indices into `(start, end)` runs.
fn highlight_ranges(text: &str, query: &str, matcher: &SkimMatcherV2) -> Vec<(usize, usize)> {
    let Some((_score, indices)) = matcher.fuzzy_indices(text, query) else {
        return vec![];
    };

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}
