//! Detail overlay for the opened model.

use crate::ui::helpers::{char_len, fit, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::DetailInfo;

const LABEL_WIDTH: usize = 11;

/// Draws a framed box over rows `top..bottom` (exclusive).
///
/// Fields come first, one per line, then the description wrapped to the box
/// width. Whatever does not fit is cut off.
pub fn render_detail(top: usize, bottom: usize, detail: &DetailInfo, theme: &Theme, cols: usize) {
    if bottom <= top + 2 || cols < 8 {
        return;
    }
    let inner = cols.saturating_sub(4);

    let mut lines: Vec<(Option<&str>, String)> = detail
        .fields
        .iter()
        .map(|(label, value)| (Some(label.as_str()), value.clone()))
        .collect();
    if !detail.description.is_empty() {
        lines.push((None, String::new()));
        lines.extend(wrap(&detail.description, inner).into_iter().map(|l| (None, l)));
    }

    position_cursor(top, 1);
    print!("{}", Theme::fg(&theme.colors.border));
    let title = format!(" {} ", detail.title);
    let title_len = char_len(&title).min(inner);
    print!("┌─");
    print!("{}{}", Theme::bold(), Theme::fg(&theme.colors.header_fg));
    print!("{}", fit(&title, title_len));
    print!("{}{}", Theme::reset(), Theme::fg(&theme.colors.border));
    print!("{}┐", "─".repeat(cols.saturating_sub(3 + title_len)));

    let body_rows = bottom - top - 2;
    for offset in 0..body_rows {
        position_cursor(top + 1 + offset, 1);
        print!("{}│ ", Theme::fg(&theme.colors.border));
        match lines.get(offset) {
            Some((Some(label), value)) => {
                print!("{}", Theme::fg(&theme.colors.text_dim));
                print!("{}", fit(label, LABEL_WIDTH));
                print!("{}", Theme::fg(&theme.colors.text_normal));
                print!("{}", fit(value, inner.saturating_sub(LABEL_WIDTH)));
            }
            Some((None, text)) => {
                print!("{}", Theme::fg(&theme.colors.text_normal));
                print!("{}", fit(text, inner));
            }
            None => print!("{}", " ".repeat(inner)),
        }
        print!("{} │", Theme::fg(&theme.colors.border));
    }

    position_cursor(bottom - 1, 1);
    print!("└{}┘", "─".repeat(cols.saturating_sub(2)));
    print!("{}", Theme::reset());
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while char_len(&word) > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                lines.push(head);
            }
            let needed = usize::from(!line.is_empty()) + char_len(&word);
            if char_len(&line) + needed > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    lines
}
