use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tick", about = concat!("[x] tick v", env!("CARGO_PKG_VERSION"), " - a small to-do list for the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the top of the list
    Add(AddArgs),
    /// List tasks
    List(ListArgs),
    /// Show task details
    Show(IdArg),
    /// Flip a task between active and completed
    Toggle(IdArg),
    /// Mark a task completed
    Done(IdArg),
    /// Mark a task active again
    Undo(IdArg),
    /// Change task text
    Edit(EditArgs),
    /// Set or clear task priority
    Priority(PriorityArgs),
    /// Set or clear task due date
    Due(DueArgs),
    /// Delete a task
    Delete(IdArg),
    /// Delete all completed tasks
    Clear,
    /// Show completion statistics
    Stats,
    /// Show or change the color theme
    Theme(ThemeArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    /// Task ID (a unique prefix or suffix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Priority (high, medium, low)
    #[arg(long, short)]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Which tasks to show (all, active, completed)
    #[arg(long, short, default_value = "all")]
    pub filter: String,
    /// Only tasks whose text contains this (case-insensitive)
    #[arg(long, short)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New task text
    pub text: String,
}

#[derive(Args)]
pub struct PriorityArgs {
    /// Task ID
    pub id: String,
    /// high, medium, low, or none
    pub priority: String,
}

#[derive(Args)]
pub struct DueArgs {
    /// Task ID
    pub id: String,
    /// YYYY-MM-DD, an RFC 3339 date-time, or none
    pub date: String,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ThemeArgs {
    /// light, dark, or toggle (omit to show the current theme)
    pub mode: Option<String>,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (RFC 3339)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
