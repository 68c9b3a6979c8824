//! Render-ready snapshot of the browser.
//!
//! [`AppState::compute_viewmodel`](crate::app::AppState::compute_viewmodel)
//! does all windowing, truncation and highlighting up front. The renderer
//! only positions the cursor and prints these values.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UIViewModel {
    pub header: HeaderInfo,
    pub search_bar: Option<SearchBarInfo>,

    /// Visible window of the current list.
    pub display_items: Vec<DisplayItem>,
    /// Selected row within `display_items`.
    pub selected_index: usize,

    /// Shown below the rows of a paged list ("Loading more…", end of list).
    pub list_note: Option<String>,
    pub empty_state: Option<EmptyState>,
    pub detail: Option<DetailInfo>,
    pub footer: FooterInfo,
}

/// One model row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub title: String,
    pub author: String,
    pub likes: u64,
    pub downloads: u64,
    /// Category, or review status in the uploads section.
    pub badge: String,
    pub is_selected: bool,
    /// Character ranges of `title` matched by the active query.
    pub highlight_ranges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
    pub tabs: Vec<TabInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub label: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    pub keybindings: String,
    pub status: Option<StatusInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBarInfo {
    pub query: String,
    /// Draws the cursor at the end of the query.
    pub is_typing: bool,
}

/// Overlay describing the opened model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailInfo {
    pub title: String,
    /// `(label, value)` pairs in display order.
    pub fields: Vec<(String, String)>,
    pub description: String,
}
