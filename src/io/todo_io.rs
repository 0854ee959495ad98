use std::collections::HashSet;

use chrono::Utc;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::store::{KeyValueStore, StoreError};
use crate::model::task::Task;

/// Storage slot holding the serialized task collection
pub const TODOS_SLOT: &str = "todos";

/// Load the task collection. Never fails: a missing slot is an empty list and
/// unreadable content is copied to the recovery log and replaced by an empty
/// list.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Task> {
    let Some(content) = store.get(TODOS_SLOT) else {
        return Vec::new();
    };
    if content.trim().is_empty() {
        return Vec::new();
    }

    match parse_tasks(&content) {
        Ok((tasks, dropped)) => {
            if !dropped.is_empty() {
                report(store, "dropped unreadable records", dropped.join("\n"));
            }
            tasks
        }
        Err(e) => {
            if report(store, &format!("{} unreadable: {}", TODOS_SLOT, e), content) {
                eprintln!("warning: stored tasks are unreadable, starting empty: {}", e);
            }
            Vec::new()
        }
    }
}

/// Serialize the whole collection and overwrite the slot.
pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, tasks: &[Task]) -> Result<(), StoreError> {
    let content = serde_json::to_string(tasks)?;
    store.set(TODOS_SLOT, &content)
}

/// Parse a serialized collection.
///
/// The outer array must be valid JSON. Individual records that do not fit the
/// task shape, have blank text, or repeat an earlier ID are dropped and
/// returned (re-serialized) as the second element.
pub fn parse_tasks(content: &str) -> Result<(Vec<Task>, Vec<String>), serde_json::Error> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(content)?;
    let mut tasks = Vec::with_capacity(raw.len());
    let mut dropped = Vec::new();
    let mut seen = HashSet::new();

    for value in raw {
        match serde_json::from_value::<Task>(value.clone()) {
            Ok(task) if !task.text.trim().is_empty() && seen.insert(task.id.clone()) => {
                tasks.push(task);
            }
            _ => dropped.push(value.to_string()),
        }
    }

    Ok((tasks, dropped))
}

/// Copy unreadable content to the recovery log. Content identical to the
/// newest parser entry is not logged again. Returns false in that case.
fn report<S: KeyValueStore + ?Sized>(store: &S, description: &str, body: String) -> bool {
    let Some(dir) = store.recovery_dir() else {
        return true;
    };
    let repeated = recovery::read_recovery_entries(dir, None, None)
        .into_iter()
        .find(|e| e.category == RecoveryCategory::Parser)
        .is_some_and(|e| e.body.trim_end() == body.trim_end());
    if repeated {
        return false;
    }
    recovery::log_recovery(
        dir,
        RecoveryEntry {
            timestamp: Utc::now(),
            category: RecoveryCategory::Parser,
            description: description.to_string(),
            fields: vec![("Source".to_string(), format!("{}.json", TODOS_SLOT))],
            body,
        },
    );
    true
}
