use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};

use super::helpers::{push_right_aligned, spans_width};

const NAVIGATE_HINTS: &[&str] = &[
    "a add",
    "space toggle",
    "e edit",
    "d delete",
    "/ search",
    "q quit",
    "p priority",
    "D due",
    "C clear done",
    "t theme",
];
const ADD_HINTS: &[&str] = &["Enter save", "Esc cancel", "Tab priority", "^D due"];
const EDIT_HINTS: &[&str] = &["Enter save", "Esc cancel"];
const DUE_HINTS: &[&str] = &["Enter set", "Esc cancel", "YYYY-MM-DD, empty clears"];
const SEARCH_HINTS: &[&str] = &["Enter keep", "Esc clear"];

/// Leading hints joined by two spaces, as many as fit in `room` cells
/// (counting one trailing space).
fn fit_hints(hints: &[&str], room: usize) -> String {
    let mut out = String::new();
    for hint in hints {
        let extra = if out.is_empty() { 0 } else { 2 };
        if out.len() + extra + hint.len() + 1 > room {
            break;
        }
        if extra > 0 {
            out.push_str("  ");
        }
        out.push_str(hint);
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let line = if let Some((notice, _)) = &app.toast {
        Line::from(vec![
            Span::styled(
                format!(" {} ", notice.title),
                Style::default()
                    .fg(app.theme.background)
                    .bg(app.theme.notice_color(notice.kind))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", notice.message),
                Style::default().fg(app.theme.text).bg(bg),
            ),
        ])
    } else {
        match app.mode {
            Mode::Navigate => {
                let mut spans = Vec::new();
                // An active search stays visible after leaving the prompt
                if !app.search.text.is_empty() {
                    spans.push(Span::styled(format!(" /{}", app.search.text), dim));
                }
                let hints = if app.ui_config.show_key_hints {
                    let room = width.saturating_sub(spans_width(&spans) + 1);
                    vec![Span::styled(fit_hints(NAVIGATE_HINTS, room), dim)]
                } else {
                    Vec::new()
                };
                push_right_aligned(&mut spans, hints, width, Style::default().bg(bg));
                Line::from(spans)
            }
            Mode::Search => {
                // Search prompt: /pattern▌
                let mut spans = vec![
                    Span::styled(
                        format!(" /{}", app.search.text),
                        Style::default().fg(app.theme.text_bright).bg(bg),
                    ),
                    Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
                ];
                let room = width.saturating_sub(spans_width(&spans) + 1);
                let hint = vec![Span::styled(fit_hints(SEARCH_HINTS, room), dim)];
                push_right_aligned(&mut spans, hint, width, Style::default().bg(bg));
                Line::from(spans)
            }
            Mode::Due => {
                let mut spans = vec![
                    Span::styled(" Due: ", Style::default().fg(app.theme.highlight).bg(bg)),
                    Span::styled(
                        app.due_input.text.clone(),
                        Style::default().fg(app.theme.text_bright).bg(bg),
                    ),
                    Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
                ];
                let room = width.saturating_sub(spans_width(&spans) + 1);
                let hint = vec![Span::styled(fit_hints(DUE_HINTS, room), dim)];
                push_right_aligned(&mut spans, hint, width, Style::default().bg(bg));
                Line::from(spans)
            }
            Mode::Add | Mode::Edit => {
                let hints = if app.mode == Mode::Add {
                    ADD_HINTS
                } else {
                    EDIT_HINTS
                };
                let mut spans = Vec::new();
                push_right_aligned(
                    &mut spans,
                    vec![Span::styled(fit_hints(hints, width), dim)],
                    width,
                    Style::default().bg(bg),
                );
                Line::from(spans)
            }
        }
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::notice::NoticeKind;
    use crate::tui::app::LineInput;
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn navigate_shows_key_hints() {
        let app = app_with_tasks(&[]);
        let out = render(&app);
        assert!(out.ends_with("D due"));
        assert!(out.contains("a add  space toggle"));
    }

    #[test]
    fn hints_drop_from_the_end_when_narrow() {
        assert_eq!(fit_hints(&["a add", "q quit"], 20), "a add  q quit ");
        assert_eq!(fit_hints(&["a add", "q quit"], 10), "a add ");
        assert_eq!(fit_hints(&["a add"], 3), "");
    }

    #[test]
    fn hints_can_be_turned_off() {
        let mut app = app_with_tasks(&[]);
        app.ui_config.show_key_hints = false;
        assert_eq!(render(&app), "");
    }

    #[test]
    fn toast_replaces_hints() {
        let mut app = app_with_tasks(&[]);
        app.show_notice(NoticeKind::Info, "Task added", "\"Buy milk\" was added.");
        assert_eq!(render(&app), " Task added  \"Buy milk\" was added.");
    }

    #[test]
    fn error_toast_uses_red() {
        let mut app = app_with_tasks(&[]);
        app.show_notice(NoticeKind::Error, "Oops", "bad");
        let buf = render_to_buffer(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(buf[(1, 0)].bg, app.theme.red);
    }

    #[test]
    fn search_prompt() {
        let mut app = app_with_tasks(&[]);
        app.mode = Mode::Search;
        app.search = LineInput::with_text("milk");
        let out = render(&app);
        assert!(out.starts_with(" /milk\u{258C}"));
        assert!(out.ends_with("Enter keep  Esc clear"));
    }

    #[test]
    fn kept_search_shown_while_navigating() {
        let mut app = app_with_tasks(&[]);
        app.search = LineInput::with_text("milk");
        let out = render(&app);
        assert!(out.starts_with(" /milk "));
        assert!(out.contains("a add"));
    }

    #[test]
    fn due_prompt() {
        let mut app = app_with_tasks(&[]);
        app.mode = Mode::Due;
        app.due_input = LineInput::with_text("2025-03-01");
        assert!(render(&app).starts_with(" Due: 2025-03-01\u{258C}"));
    }

    #[test]
    fn add_hints() {
        let mut app = app_with_tasks(&[]);
        app.mode = Mode::Add;
        assert!(render(&app).ends_with("Enter save  Esc cancel  Tab priority  ^D due"));
    }
}
