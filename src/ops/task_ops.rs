use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::model::task::{Priority, Task};

/// Error type for task lookups and input parsing
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("ambiguous id {prefix}: matches {}", .candidates.join(", "))]
    Ambiguous {
        prefix: String,
        candidates: Vec<String>,
    },
    #[error("invalid due date '{0}' (expected YYYY-MM-DD or an RFC 3339 date-time)")]
    InvalidDueDate(String),
}

// ---------------------------------------------------------------------------
// Collection transitions
//
// Each operation takes the current collection by reference and returns a new
// one. Lookup misses are silent no-ops.
// ---------------------------------------------------------------------------

/// Add a task at the head of the collection.
///
/// Returns `None` (nothing created) when `text` is empty after trimming.
pub fn add(
    tasks: &[Task],
    text: &str,
    priority: Option<Priority>,
    due_date: Option<String>,
    now_ms: i64,
) -> Option<(Vec<Task>, Task)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let task = Task {
        id: next_id(tasks, now_ms),
        text: text.to_string(),
        completed: false,
        created_at: now_ms,
        priority,
        due_date,
    };

    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.push(task.clone());
    next.extend_from_slice(tasks);
    Some((next, task))
}

/// Flip `completed` on the task with this ID.
pub fn toggle(tasks: &[Task], id: &str) -> Vec<Task> {
    map_task(tasks, id, |t| t.completed = !t.completed)
}

/// The completion state `toggle` would produce, or `None` on a lookup miss.
pub fn toggle_transition(tasks: &[Task], id: &str) -> Option<bool> {
    find_task(tasks, id).map(|t| !t.completed)
}

/// Replace a task's text. No-op when the new text is empty after trimming.
pub fn edit(tasks: &[Task], id: &str, new_text: &str) -> Vec<Task> {
    let new_text = new_text.trim();
    if new_text.is_empty() {
        return tasks.to_vec();
    }
    map_task(tasks, id, |t| t.text = new_text.to_string())
}

/// Remove the task with this ID.
pub fn delete(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks.iter().filter(|t| t.id != id).cloned().collect()
}

/// Remove every completed task. Returns the new collection and the number removed.
pub fn clear_completed(tasks: &[Task]) -> (Vec<Task>, usize) {
    let kept: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
    let removed = tasks.len() - kept.len();
    (kept, removed)
}

pub fn set_priority(tasks: &[Task], id: &str, priority: Option<Priority>) -> Vec<Task> {
    map_task(tasks, id, |t| t.priority = priority)
}

pub fn set_due_date(tasks: &[Task], id: &str, due_date: Option<String>) -> Vec<Task> {
    map_task(tasks, id, |t| t.due_date = due_date.clone())
}

fn map_task(tasks: &[Task], id: &str, f: impl Fn(&mut Task)) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == id {
                f(&mut t);
            }
            t
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Resolve a full ID or a unique ID prefix (or suffix, since timestamp IDs
/// share their leading digits) typed by a user.
pub fn resolve_id<'a>(tasks: &'a [Task], input: &str) -> Result<&'a Task, TaskError> {
    let input = input.trim();
    if let Some(task) = find_task(tasks, input) {
        return Ok(task);
    }
    if input.is_empty() {
        return Err(TaskError::NotFound(input.to_string()));
    }

    let mut matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(input)).collect();
    if matches.is_empty() {
        matches = tasks.iter().filter(|t| t.id.ends_with(input)).collect();
    }

    match matches.len() {
        0 => Err(TaskError::NotFound(input.to_string())),
        1 => Ok(matches[0]),
        _ => Err(TaskError::Ambiguous {
            prefix: input.to_string(),
            candidates: matches.iter().map(|t| t.id.clone()).collect(),
        }),
    }
}

/// Next free ID: the creation timestamp, bumped past any numeric ID already
/// in use so IDs stay unique and increasing under rapid successive adds.
/// When the largest ID is `i64::MAX` the search restarts from the timestamp.
fn next_id(tasks: &[Task], now_ms: i64) -> String {
    let used: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let max_existing = tasks
        .iter()
        .filter_map(|t| t.id.parse::<i64>().ok())
        .max();
    let start = match max_existing {
        Some(max) if max >= now_ms => max.checked_add(1).unwrap_or(now_ms),
        _ => now_ms,
    };
    (start..=i64::MAX)
        .chain(i64::MIN..start)
        .map(|n| n.to_string())
        .find(|id| !used.contains(id.as_str()))
        .unwrap_or_else(|| now_ms.to_string())
}

// ---------------------------------------------------------------------------
// Due dates
// ---------------------------------------------------------------------------

/// Parse a user-supplied due date into the stored RFC 3339 form (UTC,
/// millisecond precision).
///
/// Accepts `YYYY-MM-DD` (midnight local time) or a full RFC 3339 date-time.
pub fn parse_due_input(input: &str) -> Result<String, TaskError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(format_due(dt.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| TaskError::InvalidDueDate(input.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TaskError::InvalidDueDate(input.to_string()))?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| TaskError::InvalidDueDate(input.to_string()))?;
    Ok(format_due(local.with_timezone(&Utc)))
}

fn format_due(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Task> {
        vec![
            Task {
                id: "300".into(),
                text: "Walk dog".into(),
                completed: true,
                created_at: 300,
                priority: None,
                due_date: None,
            },
            Task {
                id: "200".into(),
                text: "Buy milk".into(),
                completed: false,
                created_at: 200,
                priority: Some(Priority::High),
                due_date: None,
            },
            Task {
                id: "100".into(),
                text: "Call mom".into(),
                completed: true,
                created_at: 100,
                priority: None,
                due_date: Some("2025-03-01T00:00:00.000Z".into()),
            },
        ]
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.text.as_str()).collect()
    }

    // --- add ---

    #[test]
    fn add_prepends_open_task() {
        let tasks = sample();
        let (next, created) = add(&tasks, "  Read book ", None, None, 1_000).unwrap();
        assert_eq!(next.len(), tasks.len() + 1);
        assert_eq!(next[0], created);
        assert_eq!(created.text, "Read book");
        assert!(!created.completed);
        assert_eq!(created.created_at, 1_000);
        assert_eq!(&next[1..], &tasks[..]);
    }

    #[test]
    fn add_rejects_blank_text() {
        let tasks = sample();
        assert!(add(&tasks, "", None, None, 1_000).is_none());
        assert!(add(&tasks, "   ", None, None, 1_000).is_none());
        assert!(add(&tasks, "\t\n", None, None, 1_000).is_none());
    }

    #[test]
    fn add_keeps_priority_and_due_date() {
        let (_, created) = add(
            &[],
            "Taxes",
            Some(Priority::Low),
            Some("2025-04-15T00:00:00.000Z".into()),
            5,
        )
        .unwrap();
        assert_eq!(created.priority, Some(Priority::Low));
        assert_eq!(created.due_date.as_deref(), Some("2025-04-15T00:00:00.000Z"));
    }

    #[test]
    fn rapid_adds_get_distinct_increasing_ids() {
        let mut tasks = Vec::new();
        for text in ["a", "b", "c"] {
            let (next, _) = add(&tasks, text, None, None, 42).unwrap();
            tasks = next;
        }
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["44", "43", "42"]);
    }

    #[test]
    fn ids_never_go_backwards_after_clock_skew() {
        let tasks = sample();
        let (_, created) = add(&tasks, "Late", None, None, 50).unwrap();
        assert_eq!(created.id, "301");
    }

    #[test]
    fn largest_possible_id_does_not_overflow() {
        let mut tasks = sample();
        tasks[0].id = i64::MAX.to_string();
        let (_, created) = add(&tasks, "After max", None, None, 50).unwrap();
        assert_eq!(created.id, "50");

        let (_, created) = add(&tasks, "At max", None, None, i64::MAX).unwrap();
        assert_ne!(created.id, i64::MAX.to_string());
    }

    // --- toggle ---

    #[test]
    fn toggle_flips_only_the_match() {
        let tasks = sample();
        let next = toggle(&tasks, "200");
        assert!(next[1].completed);
        assert_eq!(next[0], tasks[0]);
        assert_eq!(next[2], tasks[2]);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let tasks = sample();
        for id in ["100", "200", "300"] {
            assert_eq!(toggle(&toggle(&tasks, id), id), tasks);
        }
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let tasks = sample();
        assert_eq!(toggle(&tasks, "999"), tasks);
        assert_eq!(toggle_transition(&tasks, "999"), None);
    }

    #[test]
    fn toggle_transition_reports_new_state() {
        let tasks = sample();
        assert_eq!(toggle_transition(&tasks, "200"), Some(true));
        assert_eq!(toggle_transition(&tasks, "300"), Some(false));
    }

    // --- edit ---

    #[test]
    fn edit_trims_and_replaces_text() {
        let tasks = sample();
        let next = edit(&tasks, "200", "  Buy oat milk  ");
        assert_eq!(next[1].text, "Buy oat milk");
        assert_eq!(next[1].priority, Some(Priority::High));
        assert_eq!(next[1].created_at, 200);
    }

    #[test]
    fn edit_with_blank_text_is_noop() {
        let tasks = sample();
        assert_eq!(edit(&tasks, "200", "   "), tasks);
    }

    // --- delete ---

    #[test]
    fn delete_removes_match() {
        let tasks = sample();
        let next = delete(&tasks, "200");
        assert_eq!(texts(&next), vec!["Walk dog", "Call mom"]);
    }

    #[test]
    fn delete_is_idempotent() {
        let tasks = sample();
        let once = delete(&tasks, "200");
        let twice = delete(&once, "200");
        assert_eq!(once, twice);
    }

    // --- clear completed ---

    #[test]
    fn clear_completed_reports_count() {
        let (next, removed) = clear_completed(&sample());
        assert_eq!(removed, 2);
        assert_eq!(texts(&next), vec!["Buy milk"]);
    }

    #[test]
    fn clear_completed_without_completed_is_noop() {
        let tasks = toggle(&toggle(&sample(), "100"), "300");
        let (next, removed) = clear_completed(&tasks);
        assert_eq!(removed, 0);
        assert_eq!(next, tasks);
    }

    // --- metadata ---

    #[test]
    fn set_priority_and_due_date() {
        let tasks = sample();
        let next = set_priority(&tasks, "300", Some(Priority::Medium));
        assert_eq!(next[0].priority, Some(Priority::Medium));
        let next = set_due_date(&next, "100", None);
        assert_eq!(next[2].due_date, None);
        assert_eq!(next[0].priority, Some(Priority::Medium));
    }

    // --- lookup ---

    #[test]
    fn resolve_full_prefix_and_suffix() {
        let mut tasks = sample();
        tasks[0].id = "1700000000300".into();
        tasks[1].id = "1700000000200".into();
        tasks[2].id = "1700000000100".into();

        assert_eq!(resolve_id(&tasks, "1700000000200").unwrap().text, "Buy milk");
        assert_eq!(resolve_id(&tasks, "300").unwrap().text, "Walk dog");
        assert!(matches!(
            resolve_id(&tasks, "17000"),
            Err(TaskError::Ambiguous { .. })
        ));
        assert!(matches!(
            resolve_id(&tasks, "555"),
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(resolve_id(&tasks, ""), Err(TaskError::NotFound(_))));
    }

    // --- due dates ---

    #[test]
    fn due_input_accepts_rfc3339() {
        assert_eq!(
            parse_due_input("2025-03-01T09:30:00+01:00").unwrap(),
            "2025-03-01T08:30:00.000Z"
        );
    }

    #[test]
    fn due_input_accepts_plain_date() {
        let stored = parse_due_input("2025-03-01").unwrap();
        let parsed = DateTime::parse_from_rfc3339(&stored).unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn due_input_rejects_garbage() {
        assert!(matches!(
            parse_due_input("tomorrow"),
            Err(TaskError::InvalidDueDate(_))
        ));
        assert!(parse_due_input("2025-13-40").is_err());
    }
}
