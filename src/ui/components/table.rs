//! Model table: title, author, likes, downloads and a badge column.

use crate::ui::helpers::{self, char_len, fit, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::DisplayItem;

const AUTHOR_WIDTH: usize = 20;
const LIKES_WIDTH: usize = 7;
const DOWNLOADS_WIDTH: usize = 10;

/// Renders the column headers and returns the next row.
pub fn render_table_headers(row: usize, theme: &Theme, cols: usize) -> usize {
    let title_width = helpers::title_column_width(cols);
    let line = format!(
        "{}  {}  {:>LIKES_WIDTH$} {:>DOWNLOADS_WIDTH$}  {}",
        fit("TITLE", title_width),
        fit("AUTHOR", AUTHOR_WIDTH),
        "LIKES",
        "DOWNLOADS",
        "CATEGORY"
    );

    position_cursor(row, 1);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.header_fg));
    print!("{}", fit(&line, cols));
    print!("{}", Theme::reset());
    row + 1
}

/// Renders every item, one per row, and returns the row after the last.
pub fn render_table_rows(row: usize, items: &[DisplayItem], theme: &Theme, cols: usize) -> usize {
    let mut current_row = row;
    for item in items {
        current_row = render_table_row(current_row, item, theme, cols);
    }
    current_row
}

/// Selected rows get the selection colors across the whole line. Other rows
/// show match highlights in the title and dim the secondary columns.
fn render_table_row(row: usize, item: &DisplayItem, theme: &Theme, cols: usize) -> usize {
    let title_width = helpers::title_column_width(cols);
    position_cursor(row, 1);

    let (primary, secondary) = if item.is_selected {
        print!("{}", Theme::bg(&theme.colors.selection_bg));
        (&theme.colors.selection_fg, &theme.colors.selection_fg)
    } else {
        (&theme.colors.text_normal, &theme.colors.text_dim)
    };

    print!("{}", Theme::fg(primary));
    helpers::render_highlighted_text(&item.title, &item.highlight_ranges, theme, item.is_selected);
    if !item.is_selected && !item.highlight_ranges.is_empty() {
        print!("{}", Theme::fg(primary));
    }
    print!("{}", " ".repeat(title_width.saturating_sub(char_len(&item.title))));

    let counters = format!(
        "  {}  {:>LIKES_WIDTH$} {:>DOWNLOADS_WIDTH$}  ",
        fit(&item.author, AUTHOR_WIDTH),
        item.likes,
        item.downloads
    );
    print!("{}", Theme::fg(secondary));
    print!("{counters}");

    let used = title_width + char_len(&counters);
    let badge_width = cols.saturating_sub(used);
    if !item.is_selected {
        print!("{}", Theme::fg(&theme.colors.badge_fg));
    }
    print!("{}", fit(&item.badge, badge_width));

    print!("{}", Theme::reset());
    row + 1
}
