use ratatui::style::Style;
use ratatui::text::Span;

use crate::util::unicode;

pub(super) fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Pad `left` with `style` spaces so `right` ends at column `width`.
/// Drops `right` when both do not fit.
pub(super) fn push_right_aligned<'a>(
    left: &mut Vec<Span<'a>>,
    right: Vec<Span<'a>>,
    width: usize,
    style: Style,
) {
    let used = spans_width(left);
    let right_width = spans_width(&right);
    if used + right_width < width {
        left.push(Span::styled(" ".repeat(width - used - right_width), style));
        left.extend(right);
    } else if used < width {
        left.push(Span::styled(" ".repeat(width - used), style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_alignment_fills_the_row() {
        let mut left = vec![Span::raw("ab")];
        push_right_aligned(&mut left, vec![Span::raw("xy")], 8, Style::default());
        let line: String = left.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(line, "ab    xy");
    }

    #[test]
    fn right_side_dropped_when_crowded() {
        let mut left = vec![Span::raw("abcdef")];
        push_right_aligned(&mut left, vec![Span::raw("xyz")], 8, Style::default());
        let line: String = left.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(line, "abcdef  ");
    }
}
