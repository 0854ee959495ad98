use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::view::StatusFilter;
use crate::tui::app::{App, LineInput, Mode};

use super::*;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Cursor
        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, -1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.cursor = app.visible().len().saturating_sub(1);
        }

        // Task actions
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected(),
        KeyCode::Char('a') => {
            app.input = LineInput::default();
            app.pending = Default::default();
            app.mode = Mode::Add;
        }
        KeyCode::Char('e') | KeyCode::Enter => enter_edit(app),
        KeyCode::Char('D') => enter_due_edit(app),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('C') => app.clear_completed(),
        KeyCode::Char('p') => app.cycle_selected_priority(),

        // Filters
        KeyCode::Tab => app.set_filter(app.filter.next()),
        KeyCode::BackTab => app.set_filter(app.filter.prev()),
        KeyCode::Char(c @ '1'..='3') => {
            let idx = c as usize - '1' as usize;
            app.set_filter(StatusFilter::ALL[idx]);
        }

        // Search
        KeyCode::Char('/') => {
            app.search.cursor = app.search.text.len();
            app.mode = Mode::Search;
        }
        KeyCode::Esc => {
            if !app.search.text.is_empty() {
                clear_search(app);
            }
        }

        KeyCode::Char('t') => app.toggle_theme(),
        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    let len = app.visible().len();
    if len == 0 {
        app.cursor = 0;
        return;
    }
    app.cursor = app.cursor.saturating_add_signed(delta).min(len - 1);
}
