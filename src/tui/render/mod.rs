pub mod header;
pub mod helpers;
pub mod list_view;
pub mod status_row;
pub mod tab_bar;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::Regex;

use crate::ops::view::find_matches;

use super::app::App;

/// Main render function: lays out the screen and calls the sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title + counts
            Constraint::Length(2), // stats + progress bar
            Constraint::Length(2), // filter tabs + separator
            Constraint::Min(1),    // task list
            Constraint::Length(1), // status row
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);
    header::render_stats(frame, app, chunks[1]);
    tab_bar::render_tab_bar(frame, app, chunks[2]);
    list_view::render_list_view(frame, app, chunks[3]);
    status_row::render_status_row(frame, app, chunks[4]);
}

/// Push spans for text with regex match highlighting. Without a regex or a
/// match, pushes a single span with `base_style`.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let matches = search_re.map(|re| find_matches(re, text)).unwrap_or_default();
    let mut last_end = 0;
    for m in matches {
        if m.start > last_end {
            spans.push(Span::styled(text[last_end..m.start].to_string(), base_style));
        }
        spans.push(Span::styled(text[m.clone()].to_string(), highlight_style));
        last_end = m.end;
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}
