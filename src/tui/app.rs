use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::store::{FileStore, KeyValueStore};
use crate::io::watcher::StoreWatcher;
use crate::model::config::UiConfig;
use crate::model::task::{Priority, Task};
use crate::ops::controller::Controller;
use crate::ops::notice::{Notice, NoticeKind};
use crate::ops::view::{self, StatusFilter};

use super::input;
use super::render;
use super::theme::Theme;

/// How long a toast stays in the status row
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a new task
    Add,
    /// Editing the selected task's text
    Edit,
    /// Typing the live search filter
    Search,
    /// Typing a due date, for the pending new task or the selected task
    Due,
}

/// Single-line text input with a byte-offset cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    pub text: String,
    pub cursor: usize,
}

impl LineInput {
    pub fn with_text(text: &str) -> Self {
        LineInput {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Metadata staged for the task being added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTask {
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

pub type TaskStore = Box<dyn KeyValueStore>;

/// Main application state
pub struct App {
    pub controller: Controller<TaskStore, Vec<Notice>>,
    /// Data directory to lock around writes (None for in-memory stores)
    pub data_dir: Option<PathBuf>,
    /// Where the theme choice is persisted (None disables persistence)
    pub config_path: Option<PathBuf>,
    pub ui_config: UiConfig,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    pub filter: StatusFilter,
    pub search: LineInput,
    /// Index into the visible list
    pub cursor: usize,
    /// First visible row of the list
    pub scroll: usize,
    /// Text buffer for Add and Edit
    pub input: LineInput,
    /// Text buffer for Due
    pub due_input: LineInput,
    pub pending: PendingTask,
    /// Task being edited (Edit, or Due entered from Navigate)
    pub target_id: Option<String>,
    /// Latest notice and when it was shown
    pub toast: Option<(Notice, Instant)>,
}

impl App {
    pub fn new(store: TaskStore, ui_config: UiConfig) -> Self {
        let theme = Theme::from_config(&ui_config, ui_config.theme);
        App {
            controller: Controller::load(store, Vec::new()),
            data_dir: None,
            config_path: None,
            ui_config,
            theme,
            mode: Mode::Navigate,
            should_quit: false,
            filter: StatusFilter::All,
            search: LineInput::default(),
            cursor: 0,
            scroll: 0,
            input: LineInput::default(),
            due_input: LineInput::default(),
            pending: PendingTask::default(),
            target_id: None,
            toast: None,
        }
    }

    pub fn visible(&self) -> Vec<&Task> {
        self.controller.visible(self.filter, &self.search.text)
    }

    pub fn selected(&self) -> Option<&Task> {
        self.visible().get(self.cursor).copied()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected().map(|t| t.id.clone())
    }

    /// Regex for highlighting the current search in task text
    pub fn search_re(&self) -> Option<Regex> {
        view::search_regex(&self.search.text)
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Put the cursor on the task with this ID, if it is visible.
    pub fn select_id(&mut self, id: &str) {
        if let Some(pos) = self.visible().iter().position(|t| t.id == id) {
            self.cursor = pos;
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        let keep = self.selected_id();
        self.filter = filter;
        self.cursor = 0;
        if let Some(id) = keep {
            self.select_id(&id);
        }
        self.clamp_cursor();
    }

    // -----------------------------------------------------------------------
    // Notices
    // -----------------------------------------------------------------------

    pub fn show_notice(&mut self, kind: NoticeKind, title: &str, message: &str) {
        self.toast = Some((
            Notice {
                kind,
                title: title.to_string(),
                message: message.to_string(),
            },
            Instant::now(),
        ));
    }

    /// Move notices raised by the controller into the toast slot and report
    /// any save failure.
    fn collect_notices(&mut self) {
        if let Some(latest) = self.controller.notifier_mut().drain(..).last() {
            self.toast = Some((latest, Instant::now()));
        }
        if let Some(e) = self.controller.take_save_error() {
            self.show_notice(NoticeKind::Error, "Save failed", &e.to_string());
        }
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if self
            .toast
            .as_ref()
            .is_some_and(|(_, at)| now.duration_since(*at) >= TOAST_DURATION)
        {
            self.toast = None;
        }
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Run a write under the data directory lock, after picking up any change
    /// another process made since the last reload.
    fn write<T>(&mut self, f: impl FnOnce(&mut Controller<TaskStore, Vec<Notice>>) -> T) -> Option<T> {
        let _lock = match self.data_dir.clone() {
            Some(dir) => match FileLock::acquire_default(&dir) {
                Ok(lock) => Some(lock),
                Err(e) => {
                    self.show_notice(NoticeKind::Error, "Busy", &e.to_string());
                    return None;
                }
            },
            None => None,
        };
        self.controller.reload();
        let result = f(&mut self.controller);
        self.collect_notices();
        Some(result)
    }

    pub fn add_from_input(&mut self) -> bool {
        let text = self.input.text.clone();
        let pending = self.pending.clone();
        let created = self
            .write(|c| c.add(&text, pending.priority, pending.due_date))
            .flatten();
        match created {
            Some(task) => {
                self.input.clear();
                self.pending = PendingTask::default();
                self.clamp_cursor();
                self.select_id(&task.id);
                true
            }
            None => false,
        }
    }

    /// Save the edit buffer to the target task. Returns false (stay in Edit)
    /// when the text is blank or the data directory is locked.
    pub fn edit_from_input(&mut self) -> bool {
        let Some(id) = self.target_id.clone() else {
            return false;
        };
        let text = self.input.text.clone();
        if self.write(|c| c.edit(&id, &text)).is_none() {
            return false;
        }
        self.clamp_cursor();
        !text.trim().is_empty()
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.write(|c| c.toggle(&id));
            self.clamp_cursor();
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.write(|c| c.delete(&id));
            self.clamp_cursor();
        }
    }

    pub fn clear_completed(&mut self) {
        self.write(|c| c.clear_completed());
        self.clamp_cursor();
    }

    pub fn cycle_selected_priority(&mut self) {
        if let Some(task) = self.selected() {
            let id = task.id.clone();
            let next = Priority::cycle(task.priority);
            self.write(|c| c.set_priority(&id, next));
        }
    }

    pub fn set_due_for(&mut self, id: &str, due: Option<String>) {
        self.write(|c| c.set_due_date(id, due));
    }

    pub fn toggle_theme(&mut self) {
        let mode = self.theme.mode.toggled();
        self.theme = Theme::from_config(&self.ui_config, mode);
        self.ui_config.theme = mode;
        if let Some(path) = &self.config_path
            && let Err(e) = config_io::save_theme(path, mode)
        {
            self.show_notice(NoticeKind::Error, "Theme not saved", &e.to_string());
        }
    }

    /// Pick up writes made by another process.
    pub fn reload_from_disk(&mut self) {
        let keep = self.selected_id();
        if self.controller.reload() {
            if let Some(id) = keep {
                self.select_id(&id);
            }
            self.clamp_cursor();
        }
    }

    // -----------------------------------------------------------------------
    // UI state
    // -----------------------------------------------------------------------

    pub fn restore_ui_state(&mut self, state: UiState) {
        self.filter = state.filter;
        self.search = LineInput::with_text(state.search.as_deref().unwrap_or_default());
        self.cursor = 0;
        if let Some(id) = state.cursor_id {
            self.select_id(&id);
        }
        self.clamp_cursor();
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            filter: self.filter,
            search: (!self.search.text.is_empty()).then(|| self.search.text.clone()),
            cursor_id: self.selected_id(),
        }
    }
}

/// Run the TUI application
pub fn run(data_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = config_io::open_workspace(data_dir)?;
    let store = FileStore::open(&workspace.data_dir)?;

    let mut app = App::new(Box::new(store), workspace.config.ui.clone());
    app.data_dir = Some(workspace.data_dir.clone());
    app.config_path = Some(workspace.config_path.clone());

    if let Some(state) = read_ui_state(&workspace.data_dir) {
        app.restore_ui_state(state);
    }

    // A missing watcher only costs live reloads
    let watcher = match StoreWatcher::start(&workspace.data_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            app.show_notice(NoticeKind::Error, "Not watching for changes", &e.to_string());
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    let _ = write_ui_state(&workspace.data_dir, &app.ui_state());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            app.reload_from_disk();
        }
        app.expire_toast(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
