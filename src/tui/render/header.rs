use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::config::ThemeMode;
use crate::tui::app::App;

use super::helpers::push_right_aligned;

/// Title row: app name on the left, counts and theme indicator on the right
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let stats = app.controller.stats();

    let mut spans = vec![
        Span::styled(" \u{2713} ", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(
            "My Tasks",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    let theme_icon = match app.theme.mode {
        ThemeMode::Dark => "\u{263E}",
        ThemeMode::Light => "\u{2600}",
    };
    let right = vec![
        Span::styled(
            format!("{} active \u{00B7} {} completed  ", stats.active, stats.completed),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
        Span::styled(theme_icon, Style::default().fg(app.theme.yellow).bg(bg)),
        Span::styled(" ", Style::default().bg(bg)),
    ];
    push_right_aligned(&mut spans, right, area.width as usize, Style::default().bg(bg));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Stats strip: counts and completion percentage, then a progress bar
pub fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let stats = app.controller.stats();
    let label = Style::default().fg(app.theme.dim).bg(bg);
    let value = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let numbers = Line::from(vec![
        Span::styled(" Active ", label),
        Span::styled(stats.active.to_string(), value),
        Span::styled("   Completed ", label),
        Span::styled(stats.completed.to_string(), value),
        Span::styled("   Progress ", label),
        Span::styled(format!("{}%", stats.completion_rate), value),
    ]);

    let bar_width = (area.width as usize).saturating_sub(2);
    let filled = progress_cells(stats.completion_rate, bar_width);
    let fill_color = if stats.completion_rate == 100 {
        app.theme.green
    } else {
        app.theme.highlight
    };
    let bar = Line::from(vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            "\u{2588}".repeat(filled),
            Style::default().fg(fill_color).bg(bg),
        ),
        Span::styled(
            "\u{2591}".repeat(bar_width - filled),
            Style::default().fg(app.theme.track).bg(bg),
        ),
    ]);

    frame.render_widget(Paragraph::new(vec![numbers, bar]), area);
}

/// Filled cells for a completion rate, rounded to the nearest cell
fn progress_cells(rate: u32, width: usize) -> usize {
    (rate.min(100) as usize * width + 50) / 100
}
