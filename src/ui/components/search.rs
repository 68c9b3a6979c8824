//! Search input box.

use crate::ui::helpers::{char_len, fit, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::SearchBarInfo;

/// Horizontal margin for the search box (spaces on left and right).
const SEARCH_BOX_MARGIN: usize = 5;

/// Renders the 3-line search box at `row` and returns `row + 3`.
///
/// ```text
///      ┌──────────────────────────┐
///      │ Search: femur▏           │
///      └──────────────────────────┘
/// ```
///
/// The cursor mark is only drawn while typing. Long queries keep their tail
/// visible.
pub fn render_search_bar(row: usize, search: &SearchBarInfo, theme: &Theme, cols: usize) -> usize {
    let inner_width = cols.saturating_sub(SEARCH_BOX_MARGIN * 2 + 2);
    let border = Theme::fg(&theme.colors.search_bar_border);
    let rule = "─".repeat(inner_width);

    let cursor = if search.is_typing { "▏" } else { "" };
    let prefix = " Search: ";
    let room = inner_width.saturating_sub(char_len(prefix) + char_len(cursor));
    let tail: String = search
        .query
        .chars()
        .skip(char_len(&search.query).saturating_sub(room))
        .collect();
    let body = format!(
        "{}{}{border}",
        Theme::fg(&theme.colors.text_normal),
        fit(&format!("{prefix}{tail}{cursor}"), inner_width)
    );

    for (offset, (left, middle, right)) in [("┌", rule.as_str(), "┐"), ("│", body.as_str(), "│"), ("└", rule.as_str(), "┘")]
        .into_iter()
        .enumerate()
    {
        position_cursor(row + offset, SEARCH_BOX_MARGIN + 1);
        print!("{border}{left}{middle}{right}{}", Theme::reset());
    }

    row + 3
}
