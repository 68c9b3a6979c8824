//! Footer: key hints and the status line.

use crate::ui::helpers::{position_cursor, print_centered};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::FooterInfo;

/// Renders key hints at `row` and the status line right below.
///
/// Returns the row after the status line. Without a status the second line
/// is blanked.
pub fn render_footer(row: usize, footer: &FooterInfo, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(&theme.colors.text_dim));
    print_centered(&footer.keybindings, cols);
    print!("{}", Theme::reset());

    position_cursor(row + 1, 1);
    match &footer.status {
        Some(status) => {
            let color = if status.is_error {
                &theme.colors.error_fg
            } else {
                &theme.colors.success_fg
            };
            print!("{}", Theme::fg(color));
            print_centered(&status.text, cols);
            print!("{}", Theme::reset());
        }
        None => print!("{}", " ".repeat(cols)),
    }
    row + 2
}
