//! Composable UI component renderers.
//!
//! - [`header`]: title and section tabs
//! - [`search`]: search input box
//! - [`table`]: model list with columns
//! - [`empty`]: message for an empty list
//! - [`detail`]: overlay for the opened model
//! - [`footer`]: key hints and status line
//!
//! Layout, top to bottom:
//!
//! ```text
//! [Header]
//! [Border]
//! [Search Bar - 3 lines, search mode only]
//! [Table Headers]
//! [Table Rows | Empty State | Detail Overlay]
//! [List Note]
//! [Border]
//! [Footer]
//! [Status]
//! ```

mod detail;
mod empty;
mod footer;
mod header;
mod search;
mod table;

use crate::ui::helpers::{position_cursor, print_centered};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::UIViewModel;

use detail::render_detail;
use empty::render_empty_state;
use footer::render_footer;
use header::render_header;
use search::render_search_bar;
use table::{render_table_headers, render_table_rows};

/// Renders a horizontal border line and returns the next row.
fn render_border(row: usize, color: &str, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(color));
    print!("{}", "─".repeat(cols));
    print!("{}", Theme::reset());
    row + 1
}

/// Renders the whole screen for `vm`.
pub fn render_layout(vm: &UIViewModel, theme: &Theme, cols: usize, rows: usize) {
    let mut current_row = 1;

    current_row = render_header(current_row, &vm.header, theme, cols);
    current_row = render_border(current_row, &theme.colors.border, cols);
    if let Some(search) = &vm.search_bar {
        current_row = render_search_bar(current_row, search, theme, cols);
    }
    let headers_row = current_row;
    current_row = render_table_headers(current_row, theme, cols);

    let list_top = current_row;
    let status_row = rows;
    let footer_row = status_row.saturating_sub(1);
    let border_row = footer_row.saturating_sub(1);
    let note_row = border_row.saturating_sub(1);

    if let Some(empty) = &vm.empty_state {
        if list_top + 3 < note_row {
            render_empty_state(list_top + 2, empty, theme, cols);
        }
    } else {
        render_table_rows(list_top, &vm.display_items, theme, cols);
    }

    if let Some(note) = &vm.list_note {
        if note_row >= list_top {
            position_cursor(note_row, 1);
            print!("{}", Theme::dim());
            print!("{}", Theme::fg(&theme.colors.text_dim));
            print_centered(note, cols);
            print!("{}", Theme::reset());
        }
    }

    if let Some(detail) = &vm.detail {
        render_detail(headers_row, border_row, detail, theme, cols);
    }

    render_border(border_row, &theme.colors.border, cols);
    render_footer(footer_row, &vm.footer, theme, cols);
}
