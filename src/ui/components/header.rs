//! Header bar: plugin title followed by the section tabs.

use crate::ui::helpers::{char_len, fit, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::HeaderInfo;

/// Renders the header at `row` and returns the next free row.
///
/// ```text
///  Medshelf   Recent (8)   Popular (8)   Other (16)
/// ```
///
/// The active tab is drawn in the tab colors. Tabs that do not fit in
/// `cols` are dropped from the right.
pub fn render_header(row: usize, header: &HeaderInfo, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.header_fg));
    if let Some(bg) = &theme.colors.header_bg {
        print!("{}", Theme::bg(bg));
    }

    let mut used = char_len(&header.title).min(cols);
    print!("{}", fit(&header.title, used));

    for tab in &header.tabs {
        let label = format!(" {} ", tab.label);
        let width = char_len(&label) + 2;
        if used + width > cols {
            break;
        }
        print!("  ");
        if tab.is_active {
            print!("{}", Theme::fg(&theme.colors.tab_active_fg));
            print!("{}", Theme::bg(&theme.colors.tab_active_bg));
            print!("{label}");
            print!("{}", Theme::reset());
            print!("{}", Theme::bold());
            print!("{}", Theme::fg(&theme.colors.header_fg));
            if let Some(bg) = &theme.colors.header_bg {
                print!("{}", Theme::bg(bg));
            }
        } else {
            print!("{label}");
        }
        used += width;
    }

    print!("{}", " ".repeat(cols.saturating_sub(used)));
    print!("{}", Theme::reset());
    row + 1
}
