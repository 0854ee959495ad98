use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::Priority;
use crate::ops::notice::NoticeKind;
use crate::ops::task_ops;
use crate::tui::app::{App, LineInput, Mode};
use crate::util::unicode;

/// Apply a line-editing key to `input`. Returns false for keys it does not
/// handle (Enter, Esc, Tab, ...), which the caller interprets.
pub(super) fn edit_line(input: &mut LineInput, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        // Word backspace (Alt or Ctrl), and Ctrl-W
        KeyCode::Backspace if ctrl || alt => delete_word_left(input),
        KeyCode::Char('w') if ctrl => delete_word_left(input),
        KeyCode::Backspace => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&input.text, input.cursor) {
                input.text.drain(prev..input.cursor);
                input.cursor = prev;
            }
        }
        KeyCode::Delete => {
            if let Some(next) = unicode::next_grapheme_boundary(&input.text, input.cursor) {
                input.text.drain(input.cursor..next);
            }
        }
        KeyCode::Left => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&input.text, input.cursor) {
                input.cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = unicode::next_grapheme_boundary(&input.text, input.cursor) {
                input.cursor = next;
            }
        }
        KeyCode::Home => input.cursor = 0,
        KeyCode::Char('a') if ctrl => input.cursor = 0,
        KeyCode::End => input.cursor = input.text.len(),
        KeyCode::Char('e') if ctrl => input.cursor = input.text.len(),
        KeyCode::Char('u') if ctrl => input.clear(),
        KeyCode::Char(c) if !ctrl && !alt => {
            input.text.insert(input.cursor, c);
            input.cursor += c.len_utf8();
        }
        _ => return false,
    }
    true
}

fn delete_word_left(input: &mut LineInput) {
    let start = unicode::word_boundary_left(&input.text, input.cursor);
    input.text.drain(start..input.cursor);
    input.cursor = start;
}

/// Due date as typed in the prompt: the local calendar date
pub(super) fn due_prompt_text(due: Option<&str>) -> String {
    due.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

pub(super) fn handle_add(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if app.add_from_input() {
                app.mode = Mode::Navigate;
            }
        }
        KeyCode::Esc => {
            app.input.clear();
            app.pending = Default::default();
            app.mode = Mode::Navigate;
        }
        KeyCode::Tab => app.pending.priority = Priority::cycle(app.pending.priority),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.due_input = LineInput::with_text(&due_prompt_text(app.pending.due_date.as_deref()));
            app.target_id = None;
            app.mode = Mode::Due;
        }
        _ => {
            edit_line(&mut app.input, key);
        }
    }
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

pub(super) fn enter_edit(app: &mut App) {
    if let Some(task) = app.selected() {
        let (id, text) = (task.id.clone(), task.text.clone());
        app.target_id = Some(id);
        app.input = LineInput::with_text(&text);
        app.mode = Mode::Edit;
    }
}

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if app.edit_from_input() {
                finish_target_edit(app);
            }
        }
        KeyCode::Esc => finish_target_edit(app),
        _ => {
            edit_line(&mut app.input, key);
        }
    }
}

fn finish_target_edit(app: &mut App) {
    app.input.clear();
    app.target_id = None;
    app.mode = Mode::Navigate;
}

// ---------------------------------------------------------------------------
// Due date
// ---------------------------------------------------------------------------

pub(super) fn enter_due_edit(app: &mut App) {
    if let Some(task) = app.selected() {
        let (id, due) = (task.id.clone(), due_prompt_text(task.due_date.as_deref()));
        app.target_id = Some(id);
        app.due_input = LineInput::with_text(&due);
        app.mode = Mode::Due;
    }
}

/// Empty input clears the date. Without a target the date is staged for the
/// task being added.
pub(super) fn handle_due(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let raw = app.due_input.text.trim().to_string();
            let due = if raw.is_empty() {
                None
            } else {
                match task_ops::parse_due_input(&raw) {
                    Ok(due) => Some(due),
                    Err(e) => {
                        app.show_notice(NoticeKind::Error, "Invalid date", &e.to_string());
                        return;
                    }
                }
            };
            match app.target_id.take() {
                Some(id) => {
                    app.set_due_for(&id, due);
                    app.mode = Mode::Navigate;
                }
                None => {
                    app.pending.due_date = due;
                    app.mode = Mode::Add;
                }
            }
            app.due_input.clear();
        }
        KeyCode::Esc => {
            app.mode = if app.target_id.take().is_some() {
                Mode::Navigate
            } else {
                Mode::Add
            };
            app.due_input.clear();
        }
        _ => {
            edit_line(&mut app.due_input, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::input::{press, type_text};
    use crate::tui::render::test_helpers::app_with_tasks;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn line_editing_keys() {
        let mut input = LineInput::with_text("buy milk");
        edit_line(&mut input, key(KeyCode::Home, KeyModifiers::NONE));
        edit_line(&mut input, key(KeyCode::Char('!'), KeyModifiers::NONE));
        assert_eq!(input.text, "!buy milk");
        edit_line(&mut input, key(KeyCode::Delete, KeyModifiers::NONE));
        assert_eq!(input.text, "!uy milk");
        edit_line(&mut input, key(KeyCode::End, KeyModifiers::NONE));
        edit_line(&mut input, key(KeyCode::Backspace, KeyModifiers::ALT));
        assert_eq!(input.text, "!uy ");
        edit_line(&mut input, key(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input, LineInput::default());
        assert!(!edit_line(&mut input, key(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn cursor_moves_by_grapheme() {
        let mut input = LineInput::with_text("a🎉");
        edit_line(&mut input, key(KeyCode::Left, KeyModifiers::NONE));
        assert_eq!(input.cursor, 1);
        edit_line(&mut input, key(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.text, "🎉");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn add_flow_with_priority_and_due() {
        let mut app = app_with_tasks(&[]);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Pay rent");
        press(&mut app, KeyCode::Tab);
        handle_key_ctrl(&mut app, 'd');
        assert_eq!(app.mode, Mode::Due);
        type_text(&mut app, "2030-01-15");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Add);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Navigate);
        let task = app.selected().unwrap();
        assert_eq!(task.text, "Pay rent");
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(due_prompt_text(task.due_date.as_deref()), "2030-01-15");
    }

    #[test]
    fn blank_add_stays_in_add_mode() {
        let mut app = app_with_tasks(&[]);
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Add);
        assert!(app.controller.tasks().is_empty());
    }

    #[test]
    fn edit_replaces_text() {
        let mut app = app_with_tasks(&["Buy milk"]);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Edit);
        type_text(&mut app, " today");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.selected().unwrap().text, "Buy milk today");
    }

    #[test]
    fn blank_edit_is_rejected() {
        let mut app = app_with_tasks(&["Buy milk"]);
        press(&mut app, KeyCode::Char('e'));
        handle_key_ctrl(&mut app, 'u');
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Edit);
        assert_eq!(app.controller.tasks()[0].text, "Buy milk");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
    }

    #[test]
    fn invalid_due_date_keeps_prompt_open() {
        let mut app = app_with_tasks(&["Taxes"]);
        press(&mut app, KeyCode::Char('D'));
        type_text(&mut app, "someday");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Due);
        assert_eq!(app.toast.as_ref().unwrap().0.title, "Invalid date");
    }

    #[test]
    fn empty_due_date_clears() {
        let mut app = app_with_tasks(&["Taxes"]);
        let id = app.selected_id().unwrap();
        app.set_due_for(&id, Some("2030-01-01T00:00:00.000Z".into()));
        press(&mut app, KeyCode::Char('D'));
        handle_key_ctrl(&mut app, 'u');
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.selected().unwrap().due_date, None);
    }

    fn handle_key_ctrl(app: &mut App, c: char) {
        crate::tui::input::handle_key(app, key(KeyCode::Char(c), KeyModifiers::CONTROL));
    }
}
