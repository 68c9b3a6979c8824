//! Input modes and browser sections.
//!
//! The browser is either in normal navigation or in search. Search has two
//! focuses: typing the query and moving through its results. Outside search
//! the list shows one [`Section`] at a time.

/// Focus state within search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    /// Keys edit the draft query. Enter submits it.
    Typing,

    /// Keys move through the results. `/` returns to typing.
    Navigating,
}

/// Current input handling mode.
///
/// Determines the active keybindings and the footer hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Section navigation and model commands.
    Normal,

    /// Search with a focus state.
    Search(SearchFocus),
}

/// A tab of the browser outside search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Newest published models.
    Recent,
    /// Highest scoring published models.
    Popular,
    /// Everything else, loaded batch by batch.
    Other,
    /// The configured user's own uploads grouped by review status.
    Uploads,
}

impl Section {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Recent => "Recent",
            Self::Popular => "Popular",
            Self::Other => "Other",
            Self::Uploads => "My uploads",
        }
    }

    /// Sections in tab order. `Uploads` is only offered with a username.
    #[must_use]
    pub fn available(has_user: bool) -> Vec<Self> {
        let mut sections = vec![Self::Recent, Self::Popular, Self::Other];
        if has_user {
            sections.push(Self::Uploads);
        }
        sections
    }

    /// Whether scrolling near the end of this section loads another batch.
    #[must_use]
    pub const fn is_paged(self) -> bool {
        matches!(self, Self::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_tab_requires_a_user() {
        assert_eq!(Section::available(false).len(), 3);
        assert_eq!(Section::available(true).last(), Some(&Section::Uploads));
    }

    #[test]
    fn only_other_is_paged() {
        assert!(Section::Other.is_paged());
        assert!(!Section::Recent.is_paged());
        assert!(!Section::Uploads.is_paged());
    }
}
