use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '\u{2026}';

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_width).sum()
}

/// Cut `s` to at most `max_cells` cells, ending in `…` when something was cut.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let w = grapheme_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push(ELLIPSIS);
    out
}

/// Byte offset of the grapheme after the one at `offset`, or None at the end.
pub fn next_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let g = s.get(offset..)?.graphemes(true).next()?;
    Some(offset + g.len())
}

/// Byte offset where the grapheme before `offset` starts, or None at the start.
pub fn prev_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let g = s.get(..offset)?.graphemes(true).next_back()?;
    Some(offset - g.len())
}

/// Start of the word before `offset`, skipping any whitespace in between.
pub fn word_boundary_left(s: &str, offset: usize) -> usize {
    let Some(prefix) = s.get(..offset) else {
        return 0;
    };
    let mut start = offset;
    let mut in_word = false;
    for (i, g) in prefix.grapheme_indices(true).rev() {
        let blank = g.chars().all(char::is_whitespace);
        if blank && in_word {
            break;
        }
        in_word |= !blank;
        start = i;
    }
    start
}

/// Cells occupied by `s[..offset]`, for placing the terminal cursor.
pub fn byte_offset_to_display_col(s: &str, offset: usize) -> usize {
    display_width(&s[..offset.min(s.len())])
}

fn grapheme_width(g: &str) -> usize {
    if g == "\t" { 4 } else { UnicodeWidthStr::width(g) }
}
