use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::config::ThemeMode;
use crate::model::task::{Priority, Task};
use crate::ops::stats::Stats;
use crate::ops::view::StatusFilter;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub overdue: bool,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub filter: StatusFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ClearedJson {
    pub removed: usize,
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub theme: ThemeMode,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, now: DateTime<Utc>) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        text: task.text.clone(),
        completed: task.completed,
        created_at: task.created_at,
        priority: task.priority,
        due_date: task.due_date.clone(),
        overdue: task.is_overdue(now),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

/// One-line summary: `[ ] <id> Buy milk !high due Mar 1`
pub fn format_task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mut line = format!("{} {} {}", checkbox(task), task.id, task.text);
    if let Some(p) = task.priority {
        line.push_str(&format!(" !{}", p.as_str()));
    }
    if let Some(label) = task.due_label() {
        line.push_str(&format!(" due {}", label));
        if task.is_overdue(now) {
            line.push_str(" (overdue)");
        }
    }
    line
}

pub fn format_task_detail(task: &Task, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format!("{} {} {}", checkbox(task), task.id, task.text)];
    if let Some(created) = task.created() {
        lines.push(format!(
            "created: {}",
            created.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    if let Some(p) = task.priority {
        lines.push(format!("priority: {}", p.as_str()));
    }
    if let Some(due) = &task.due_date {
        let overdue = if task.is_overdue(now) { " (overdue)" } else { "" };
        lines.push(format!("due: {}{}", due, overdue));
    }
    lines
}

/// Listing for a filter, or the filter's empty-state message.
pub fn format_task_list(tasks: &[&Task], filter: StatusFilter, now: DateTime<Utc>) -> Vec<String> {
    if tasks.is_empty() {
        return vec![filter.empty_message().to_string()];
    }
    tasks.iter().map(|t| format_task_line(t, now)).collect()
}

/// Text progress bar, `width` cells between the brackets
pub fn format_progress_bar(rate: u32, width: usize) -> String {
    let filled = (rate.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn format_stats(stats: &Stats) -> Vec<String> {
    vec![
        format!("Active:    {}", stats.active),
        format!("Completed: {}", stats.completed),
        format!(
            "Progress:  {}% {}",
            stats.completion_rate,
            format_progress_bar(stats.completion_rate, 20)
        ),
    ]
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} [{}] {}",
        entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        entry.category,
        entry.description
    )];
    for (key, value) in &entry.fields {
        lines.push(format!("  {}: {}", key, value));
    }
    for line in entry.body.lines() {
        lines.push(format!("  | {}", line));
    }
    lines
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

/// `high|medium|low` sets a priority, `none` clears it.
pub fn parse_priority_arg(s: &str) -> Result<Option<Priority>, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Priority::parse_priority(s)
        .map(Some)
        .ok_or_else(|| format!("unknown priority '{}' (expected: high, medium, low, none)", s))
}

pub fn parse_filter_arg(s: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse_filter(s)
        .ok_or_else(|| format!("unknown filter '{}' (expected: all, active, completed)", s))
}

pub fn parse_timestamp_arg(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
}
