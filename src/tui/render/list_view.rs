use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::model::task::{self, Priority, Task};
use crate::tui::app::{App, LineInput, Mode};
use crate::util::unicode;

use super::helpers::{checkbox, push_right_aligned, spans_width};
use super::push_highlighted_spans;

/// Width of " [ ] " before the task text
const ROW_PREFIX_W: usize = 5;

/// Render the task list. Takes `&mut App` to keep the cursor row scrolled
/// into view.
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let adding = app.mode == Mode::Add;

    // The add row takes the first line while adding
    let list_height = (area.height as usize).saturating_sub(adding as usize);
    let count = app.visible().len();
    adjust_scroll(app, count, list_height);

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    let mut cursor_pos: Option<(u16, u16)> = None;

    if adding {
        let (line, col) = render_add_row(app, width);
        cursor_pos = Some((area.x + col, area.y));
        lines.push(line);
    }

    if count == 0 {
        let msg = if app.search.text.trim().is_empty() {
            app.filter.empty_message()
        } else {
            "No tasks match your search."
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", msg),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    } else {
        let now = Utc::now();
        let search_re = app.search_re();
        let visible = app.visible();
        let end = count.min(app.scroll + list_height);
        for (task, row) in visible[app.scroll..end].iter().zip(app.scroll..end) {
            let is_cursor = row == app.cursor;
            if is_cursor && app.mode == Mode::Edit {
                let (line, col) = render_edit_row(app, task, width);
                let y = area.y + lines.len() as u16;
                cursor_pos = Some((area.x + col, y));
                lines.push(line);
            } else {
                lines.push(render_task_row(app, task, is_cursor, width, now, search_re.as_ref()));
            }
        }
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);

    if let Some(pos) = cursor_pos {
        frame.set_cursor_position(pos);
    }
}

fn adjust_scroll(app: &mut App, count: usize, height: usize) {
    if count == 0 || height == 0 {
        app.scroll = 0;
        return;
    }
    let cursor = app.cursor.min(count - 1);
    if cursor < app.scroll {
        app.scroll = cursor;
    } else if cursor >= app.scroll + height {
        app.scroll = cursor + 1 - height;
    }
    app.scroll = app.scroll.min(count.saturating_sub(height));
}

/// Priority and due-date badges shown at the right edge of a row
fn meta_spans<'a>(
    app: &App,
    priority: Option<Priority>,
    due_label: Option<String>,
    overdue: bool,
    bg_style: Style,
) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    if let Some(p) = priority {
        spans.push(Span::styled(
            format!("!{}", p.as_str()),
            bg_style.fg(app.theme.priority_color(p)),
        ));
    }
    if let Some(label) = due_label {
        if !spans.is_empty() {
            spans.push(Span::styled(" ", bg_style));
        }
        let color = if overdue { app.theme.red } else { app.theme.dim };
        spans.push(Span::styled(format!("due {}", label), bg_style.fg(color)));
    }
    if !spans.is_empty() {
        spans.push(Span::styled(" ", bg_style));
    }
    spans
}

fn render_task_row<'a>(
    app: &App,
    task: &Task,
    is_cursor: bool,
    width: usize,
    now: chrono::DateTime<Utc>,
    search_re: Option<&Regex>,
) -> Line<'a> {
    let row_bg = if is_cursor {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let bg_style = Style::default().bg(row_bg);

    let box_color = if task.completed {
        app.theme.green
    } else if is_cursor {
        app.theme.highlight
    } else {
        app.theme.dim
    };
    let mut text_style = bg_style.fg(if task.completed {
        app.theme.dim
    } else {
        app.theme.text
    });
    if task.completed {
        text_style = text_style.add_modifier(Modifier::CROSSED_OUT);
    } else if is_cursor {
        text_style = text_style.fg(app.theme.text_bright);
    }
    let match_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);

    let right = meta_spans(
        app,
        task.priority,
        task.due_label(),
        task.is_overdue(now),
        bg_style,
    );
    let text_room = width
        .saturating_sub(ROW_PREFIX_W + spans_width(&right))
        .saturating_sub(1);
    let text = unicode::truncate_to_width(&task.text, text_room);

    let mut spans = vec![
        Span::styled(" ", bg_style),
        Span::styled(checkbox(task.completed), bg_style.fg(box_color)),
        Span::styled(" ", bg_style),
    ];
    push_highlighted_spans(&mut spans, &text, text_style, match_style, search_re);
    push_right_aligned(&mut spans, right, width, bg_style);
    Line::from(spans)
}

/// Row holding the edit buffer in place of the task text. Returns the line
/// and the terminal cursor column.
fn render_edit_row<'a>(app: &App, task: &Task, width: usize) -> (Line<'a>, u16) {
    let bg_style = Style::default().bg(app.theme.selection_bg);
    let mut spans = vec![
        Span::styled(" ", bg_style),
        Span::styled(checkbox(task.completed), bg_style.fg(app.theme.highlight)),
        Span::styled(" ", bg_style),
    ];
    let col = push_input_spans(app, &mut spans, &app.input, ROW_PREFIX_W, width, bg_style);
    push_right_aligned(&mut spans, Vec::new(), width, bg_style);
    (Line::from(spans), col)
}

/// The new-task row shown at the top of the list while adding
fn render_add_row<'a>(app: &App, width: usize) -> (Line<'a>, u16) {
    let bg_style = Style::default().bg(app.theme.selection_bg);
    let mut spans = vec![Span::styled(
        " +   ",
        bg_style.fg(app.theme.highlight).add_modifier(Modifier::BOLD),
    )];
    let right = meta_spans(
        app,
        app.pending.priority,
        app.pending.due_date.as_deref().and_then(task::due_label),
        false,
        bg_style,
    );
    let room = width.saturating_sub(spans_width(&right));
    let col = push_input_spans(app, &mut spans, &app.input, ROW_PREFIX_W, room, bg_style);
    push_right_aligned(&mut spans, right, width, bg_style);
    (Line::from(spans), col)
}

/// Push the visible part of `input`, starting at column `start` and ending
/// before column `end`. Long input scrolls so the cursor stays on screen.
/// Returns the cursor column.
fn push_input_spans<'a>(
    app: &App,
    spans: &mut Vec<Span<'a>>,
    input: &LineInput,
    start: usize,
    end: usize,
    bg_style: Style,
) -> u16 {
    let room = end.saturating_sub(start + 1).max(1);
    let cursor_col = unicode::byte_offset_to_display_col(&input.text, input.cursor);

    let mut skip = 0;
    let mut offset = 0;
    while cursor_col.saturating_sub(skip) >= room {
        let Some(next) = unicode::next_grapheme_boundary(&input.text, offset) else {
            break;
        };
        skip += unicode::display_width(&input.text[offset..next]);
        offset = next;
    }
    let shown = unicode::truncate_to_width(&input.text[offset..], room);
    spans.push(Span::styled(shown, bg_style.fg(app.theme.text_bright)));
    (start + cursor_col.saturating_sub(skip)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::view::StatusFilter;
    use crate::tui::render::test_helpers::*;

    fn render(app: &mut App, h: u16) -> String {
        render_to_string(40, h, |frame, area| render_list_view(frame, app, area))
    }

    #[test]
    fn rows_show_checkbox_and_text() {
        let mut app = app_with_tasks(&["Buy milk", "Walk dog"]);
        app.cursor = 1;
        app.toggle_selected();
        let out = render(&mut app, 3);
        assert_eq!(out, " [ ] Buy milk\n [x] Walk dog");
    }

    #[test]
    fn priority_right_aligned() {
        let mut app = app_with_tasks(&["Pay rent"]);
        app.cycle_selected_priority();
        let out = render(&mut app, 1);
        assert!(out.starts_with(" [ ] Pay rent"));
        assert!(out.ends_with("!high"));
        assert_eq!(unicode::display_width(&out), 39);
    }

    #[test]
    fn completed_rows_are_struck_through() {
        let mut app = app_with_tasks(&["Done thing", "Other"]);
        app.toggle_selected();
        app.cursor = 1;
        let buf = render_to_buffer(40, 2, |frame, area| render_list_view(frame, &mut app, area));
        assert!(buf[(5, 0)].modifier.contains(Modifier::CROSSED_OUT));
        assert!(!buf[(5, 1)].modifier.contains(Modifier::CROSSED_OUT));
        assert_eq!(buf[(5, 1)].bg, app.theme.selection_bg);
    }

    #[test]
    fn empty_states() {
        let mut app = app_with_tasks(&[]);
        assert_eq!(render(&mut app, 2), " No tasks yet. Add one to get started!");

        let mut app = app_with_tasks(&["Buy milk"]);
        app.set_filter(StatusFilter::Completed);
        assert_eq!(render(&mut app, 2), " No completed tasks yet.");

        app.set_filter(StatusFilter::All);
        app.search = LineInput::with_text("zzz");
        assert_eq!(render(&mut app, 2), " No tasks match your search.");
    }

    #[test]
    fn search_matches_are_highlighted() {
        let mut app = app_with_tasks(&["Buy milk"]);
        app.search = LineInput::with_text("milk");
        let buf = render_to_buffer(40, 1, |frame, area| render_list_view(frame, &mut app, area));
        assert_eq!(buf[(9, 0)].bg, app.theme.search_match_bg);
        assert_ne!(buf[(5, 0)].bg, app.theme.search_match_bg);
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut app = app_with_tasks(&["a", "b", "c", "d", "e"]);
        app.cursor = 4;
        let out = render(&mut app, 2);
        assert_eq!(app.scroll, 3);
        assert_eq!(out, " [ ] d\n [ ] e");

        app.cursor = 0;
        render(&mut app, 2);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn add_row_sits_above_the_list() {
        let mut app = app_with_tasks(&["Existing"]);
        app.mode = Mode::Add;
        app.input = LineInput::with_text("New");
        app.pending.priority = Some(Priority::Low);
        let out = render(&mut app, 3);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with(" +   New"));
        assert!(lines[0].ends_with("!low"));
        assert_eq!(lines[1], " [ ] Existing");
    }

    #[test]
    fn edit_row_shows_buffer() {
        let mut app = app_with_tasks(&["Old text"]);
        app.mode = Mode::Edit;
        app.input = LineInput::with_text("New text");
        assert_eq!(render(&mut app, 1), " [ ] New text");
    }

    #[test]
    fn long_input_scrolls_to_cursor() {
        let app = app_with_tasks(&[]);
        let mut spans = Vec::new();
        let input = LineInput::with_text("abcdefghij");
        let col = push_input_spans(&app, &mut spans, &input, 0, 6, Style::default());
        assert_eq!(spans[0].content, "ghij");
        assert_eq!(col, 4);
    }

    #[test]
    fn cursor_inside_a_flag_in_a_one_cell_input() {
        let app = app_with_tasks(&[]);
        let mut spans = Vec::new();
        // The flag is one grapheme two cells wide; its first half alone is one cell
        let mut input = LineInput::with_text("\u{1F1EF}\u{1F1F5}");
        input.cursor = '\u{1F1EF}'.len_utf8();
        let col = push_input_spans(&app, &mut spans, &input, 3, 5, Style::default());
        assert_eq!(col, 3);
    }
}
