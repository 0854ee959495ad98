use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::view::StatusFilter;
use crate::tui::app::App;

/// Render the filter tabs, with a separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let bg = app.theme.background;
    let mut spans = vec![Span::styled(" ", Style::default().bg(bg))];
    for filter in StatusFilter::ALL {
        spans.push(Span::styled(
            format!(" {} ", filter.label()),
            tab_style(app, filter == app.filter),
        ));
        spans.push(Span::styled(" ", Style::default().bg(bg)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let separator = Span::styled(
        "\u{2500}".repeat(area.width as usize),
        Style::default().fg(app.theme.dim).bg(bg),
    );
    frame.render_widget(Paragraph::new(Line::from(separator)), chunks[1]);
}

fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn tabs_and_separator() {
        let app = app_with_tasks(&[]);
        let out = render_to_string(32, 2, |frame, area| render_tab_bar(frame, &app, area));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "  All   Active   Completed");
        assert_eq!(lines[1], "\u{2500}".repeat(32));
    }

    #[test]
    fn current_tab_is_highlighted() {
        let mut app = app_with_tasks(&[]);
        app.filter = StatusFilter::Active;
        let buf = render_to_buffer(32, 2, |frame, area| render_tab_bar(frame, &app, area));
        // " " + " All " + " " puts " Active " at column 7
        assert_eq!(buf[(8, 0)].bg, app.theme.selection_bg);
        assert_eq!(buf[(2, 0)].bg, app.theme.background);
    }
}
