//! Shared rendering utilities.
//!
//! Widths are counted in characters, not bytes, so titles with accents or
//! symbols line up with plain ASCII ones.

use crate::ui::theme::Theme;

/// Moves the cursor to a 1-indexed `row`/`col`.
pub fn position_cursor(row: usize, col: usize) {
    print!("\u{1b}[{row};{col}H");
}

/// Width of the title column for a pane `cols` wide.
#[must_use]
pub fn title_column_width(cols: usize) -> usize {
    cols.saturating_sub(50).clamp(12, 48)
}

/// Number of characters in `text`.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cuts `text` to `width` characters and pads it with spaces to exactly
/// `width`.
///
/// # Examples
///
/// ```
/// use medshelf::ui::helpers::fit;
///
/// assert_eq!(fit("femur", 7), "femur  ");
/// assert_eq!(fit("clavicle", 4), "clav");
/// ```
#[must_use]
pub fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = char_len(&out);
    out.push_str(&" ".repeat(width - len));
    out
}

/// Prints `text` with the given character ranges highlighted.
///
/// Ranges are `(start, end)` character indices with exclusive end. Selected
/// rows are printed without highlights so the selection colors stay intact.
pub fn render_highlighted_text(
    text: &str,
    ranges: &[(usize, usize)],
    theme: &Theme,
    is_selected: bool,
) {
    if ranges.is_empty() || is_selected {
        print!("{text}");
        return;
    }

    let chars: Vec<char> = text.chars().collect();
    let mut current_pos = 0;

    for &(start, end) in ranges {
        let start = start.min(chars.len());
        let end = end.min(chars.len());
        if start < current_pos || start >= end {
            continue;
        }
        if start > current_pos {
            let normal_section: String = chars[current_pos..start].iter().collect();
            print!("{normal_section}");
        }

        print!("{}", Theme::fg(&theme.colors.match_highlight_fg));
        print!("{}", Theme::bg(&theme.colors.match_highlight_bg));
        let highlighted_section: String = chars[start..end].iter().collect();
        print!("{highlighted_section}");
        print!("{}", Theme::reset());
        print!("{}", Theme::fg(&theme.colors.text_normal));

        current_pos = end;
    }

    if current_pos < chars.len() {
        let remaining: String = chars[current_pos..].iter().collect();
        print!("{remaining}");
    }
}

/// Prints `text` centered in a line of `cols` characters.
pub fn print_centered(text: &str, cols: usize) {
    let len = char_len(text).min(cols);
    let padding = cols.saturating_sub(len) / 2;
    print!("{}", " ".repeat(padding));
    print!("{}", fit(text, len));
    print!("{}", " ".repeat(cols.saturating_sub(padding + len)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_counts_characters() {
        assert_eq!(fit("fémur", 6), "fémur ");
        assert_eq!(char_len(&fit("…", 3)), 3);
        assert_eq!(fit("", 0), "");
    }
}
