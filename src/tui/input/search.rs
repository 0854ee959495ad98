use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

use super::*;

/// The search text filters the list as it is typed.
pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.mode = Mode::Navigate,
        KeyCode::Esc => {
            clear_search(app);
            app.mode = Mode::Navigate;
        }
        _ => {
            let keep = app.selected_id();
            if edit_line(&mut app.search, key) {
                app.cursor = 0;
                if let Some(id) = keep {
                    app.select_id(&id);
                }
                app.clamp_cursor();
            }
        }
    }
}

pub(super) fn clear_search(app: &mut App) {
    let keep = app.selected_id();
    app.search.clear();
    if let Some(id) = keep {
        app.select_id(&id);
    }
    app.clamp_cursor();
}
