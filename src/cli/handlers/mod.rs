mod settings;
pub use settings::{cmd_recovery, cmd_theme};

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::store::FileStore;
use crate::model::task::Task;
use crate::ops::controller::Controller;
use crate::ops::notice::{Notice, NoticeKind, Notifier};
use crate::ops::task_ops;

type CliResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CliResult {
    let json = cli.json;
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        None => {
            eprintln!("no subcommand given (try `tick --help`)");
            Ok(())
        }
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(args, data_dir, json),
            Commands::Show(args) => cmd_show(args, data_dir, json),
            Commands::Stats => cmd_stats(data_dir, json),

            // Write commands
            Commands::Add(args) => cmd_add(args, data_dir, json),
            Commands::Toggle(args) => cmd_toggle(args, data_dir, json),
            Commands::Done(args) => cmd_set_completed(args, true, data_dir, json),
            Commands::Undo(args) => cmd_set_completed(args, false, data_dir, json),
            Commands::Edit(args) => cmd_edit(args, data_dir, json),
            Commands::Priority(args) => cmd_priority(args, data_dir, json),
            Commands::Due(args) => cmd_due(args, data_dir, json),
            Commands::Delete(args) => cmd_delete(args, data_dir, json),
            Commands::Clear => cmd_clear(data_dir, json),

            // Settings and maintenance
            Commands::Theme(args) => cmd_theme(args, json),
            Commands::Recovery(args) => cmd_recovery(args, data_dir, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Session plumbing
// ---------------------------------------------------------------------------

/// Prints notices to stderr. Error notices are held back and turned into the
/// command's error instead, so they surface once as `error: …`.
pub struct ConsoleNotifier {
    quiet: bool,
    failure: Option<Notice>,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        ConsoleNotifier {
            quiet,
            failure: None,
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str) {
        match kind {
            NoticeKind::Error => {
                self.failure = Some(Notice {
                    kind,
                    title: title.to_string(),
                    message: message.to_string(),
                });
            }
            NoticeKind::Info if !self.quiet => eprintln!("{}: {}", title, message),
            NoticeKind::Info => {}
        }
    }
}

type Session = Controller<FileStore, ConsoleNotifier>;

fn open_store(data_dir: Option<&str>) -> Result<FileStore, Box<dyn std::error::Error>> {
    let workspace = config_io::open_workspace(data_dir)?;
    Ok(FileStore::open(&workspace.data_dir)?)
}

/// Load without locking (read commands).
fn open_session(data_dir: Option<&str>, json: bool) -> Result<Session, Box<dyn std::error::Error>> {
    let store = open_store(data_dir)?;
    Ok(Controller::load(store, ConsoleNotifier::new(json)))
}

/// Lock the data directory, then load. The lock is held until the returned
/// guard drops, covering the whole load-modify-save cycle.
fn open_locked_session(
    data_dir: Option<&str>,
    json: bool,
) -> Result<(FileLock, Session), Box<dyn std::error::Error>> {
    let store = open_store(data_dir)?;
    let lock = FileLock::acquire_default(store.dir())?;
    Ok((lock, Controller::load(store, ConsoleNotifier::new(json))))
}

/// Report a save failure as a warning and an error notice as the result.
fn finish(session: &mut Session) -> CliResult {
    if let Some(e) = session.take_save_error() {
        eprintln!(
            "warning: {} (the change is kept in {})",
            e,
            crate::io::recovery::recovery_log_path(session.store().dir()).display()
        );
    }
    match session.notifier_mut().failure.take() {
        Some(notice) => Err(notice.message.into()),
        None => Ok(()),
    }
}

fn resolve(session: &Session, input: &str) -> Result<String, task_ops::TaskError> {
    task_ops::resolve_id(session.tasks(), input).map(|t| t.id.clone())
}

fn print_task(task: &Task, json: bool) -> CliResult {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&task_to_json(task, Utc::now()))?
        );
    } else {
        println!("{}", task.id);
    }
    Ok(())
}

fn print_current(session: &Session, id: &str, json: bool) -> CliResult {
    match task_ops::find_task(session.tasks(), id) {
        Some(task) => print_task(task, json),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, data_dir: Option<&str>, json: bool) -> CliResult {
    let session = open_session(data_dir, json)?;
    let filter = parse_filter_arg(&args.filter)?;
    let search = args.search.unwrap_or_default();
    let tasks = session.visible(filter, &search);
    let now = Utc::now();

    if json {
        let out = TaskListJson {
            filter,
            search: (!search.is_empty()).then_some(search),
            tasks: tasks.iter().map(|t| task_to_json(t, now)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_task_list(&tasks, filter, now) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(args: IdArg, data_dir: Option<&str>, json: bool) -> CliResult {
    let session = open_session(data_dir, json)?;
    let task = task_ops::resolve_id(session.tasks(), &args.id)?;
    let now = Utc::now();

    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task, now))?);
    } else {
        for line in format_task_detail(task, now) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_stats(data_dir: Option<&str>, json: bool) -> CliResult {
    let session = open_session(data_dir, json)?;
    let stats = session.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for line in format_stats(&stats) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, data_dir: Option<&str>, json: bool) -> CliResult {
    let priority = args
        .priority
        .as_deref()
        .map(parse_priority_arg)
        .transpose()?
        .flatten();
    let due = args
        .due
        .as_deref()
        .map(task_ops::parse_due_input)
        .transpose()?;

    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let created = session.add(&args.text, priority, due);
    finish(&mut session)?;

    match created {
        Some(task) => print_task(&task, json),
        None => Ok(()),
    }
}

fn cmd_toggle(args: IdArg, data_dir: Option<&str>, json: bool) -> CliResult {
    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let id = resolve(&session, &args.id)?;
    session.toggle(&id);
    finish(&mut session)?;
    print_current(&session, &id, json)
}

/// `done` / `undo`: toggle only when the task is not already in that state.
fn cmd_set_completed(args: IdArg, completed: bool, data_dir: Option<&str>, json: bool) -> CliResult {
    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let id = resolve(&session, &args.id)?;
    let current = task_ops::find_task(session.tasks(), &id).is_some_and(|t| t.completed);
    if current != completed {
        session.toggle(&id);
    }
    finish(&mut session)?;
    print_current(&session, &id, json)
}

fn cmd_edit(args: EditArgs, data_dir: Option<&str>, json: bool) -> CliResult {
    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let id = resolve(&session, &args.id)?;
    session.edit(&id, &args.text);
    finish(&mut session)?;
    print_current(&session, &id, json)
}

fn cmd_priority(args: PriorityArgs, data_dir: Option<&str>, json: bool) -> CliResult {
    let priority = parse_priority_arg(&args.priority)?;
    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let id = resolve(&session, &args.id)?;
    session.set_priority(&id, priority);
    finish(&mut session)?;
    print_current(&session, &id, json)
}

fn cmd_due(args: DueArgs, data_dir: Option<&str>, json: bool) -> CliResult {
    let due = if args.date.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(task_ops::parse_due_input(&args.date)?)
    };
    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let id = resolve(&session, &args.id)?;
    session.set_due_date(&id, due);
    finish(&mut session)?;
    print_current(&session, &id, json)
}

fn cmd_delete(args: IdArg, data_dir: Option<&str>, json: bool) -> CliResult {
    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let id = resolve(&session, &args.id)?;
    let removed = session.delete(&id);
    finish(&mut session)?;
    match removed {
        Some(task) => print_task(&task, json),
        None => Ok(()),
    }
}

fn cmd_clear(data_dir: Option<&str>, json: bool) -> CliResult {
    let (_lock, mut session) = open_locked_session(data_dir, json)?;
    let removed = session.clear_completed();
    finish(&mut session)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ClearedJson { removed })?);
    } else {
        println!("{}", removed);
    }
    Ok(())
}
